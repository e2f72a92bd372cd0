//! Canonical forms that feed the signature.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use std::collections::BTreeMap;
use std::fmt::Write;

use http::Method;
use percent_encoding::utf8_percent_encode;

use crate::constants::{ALGORITHM, AWS_QUERY_ENCODE_SET};
use crate::SigningContext;
use ec2sign_core::hash::hex_sha256;

/// Build the canonical query string.
///
/// Keys and values are percent encoded first and the pairs are sorted by
/// encoded key in byte order. If a key shows up twice, the later value wins.
pub fn canonical_query_string<I, K, V>(attributes: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted = BTreeMap::new();
    for (k, v) in attributes {
        sorted.insert(
            utf8_percent_encode(k.as_ref(), &AWS_QUERY_ENCODE_SET).to_string(),
            utf8_percent_encode(v.as_ref(), &AWS_QUERY_ENCODE_SET).to_string(),
        );
    }

    sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical header block together with the list of signed header names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    block: String,
    signed_headers: String,
}

impl CanonicalHeaders {
    /// `name:value\n` for every header, sorted by name.
    pub fn block(&self) -> &str {
        &self.block
    }

    /// Sorted lowercase header names joined by `;`.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }
}

/// Build the canonical headers.
///
/// Names are lowercased and values trimmed. Names that only differ in case
/// collapse into one entry and the later entry wins. `host` is always set to
/// `endpoint`, whatever the caller passed.
pub fn canonical_headers<I, K, V>(headers: I, endpoint: &str) -> CanonicalHeaders
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted = BTreeMap::new();
    for (k, v) in headers {
        sorted.insert(k.as_ref().to_ascii_lowercase(), v.as_ref().trim().to_string());
    }
    sorted.insert("host".to_string(), endpoint.trim().to_string());

    let mut block = String::with_capacity(64);
    for (k, v) in sorted.iter() {
        block.push_str(k);
        block.push(':');
        block.push_str(v);
        block.push('\n');
    }
    let signed_headers = sorted.keys().map(String::as_str).collect::<Vec<_>>().join(";");

    CanonicalHeaders {
        block,
        signed_headers,
    }
}

/// Build the canonical request.
///
/// ```text
/// GET
/// /
/// Action=DescribeInstances&Version=2016-11-15
/// host:ec2.us-east-1.amazonaws.com
/// x-amz-date:20220313T072004Z
///
/// host;x-amz-date
/// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
/// ```
///
/// Every call targets the api root so the canonical uri is always `/`.
pub fn canonical_request_string(
    method: &Method,
    query: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> ec2sign_core::Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", method.as_str())?;
    writeln!(f, "/")?;
    writeln!(f, "{query}")?;
    writeln!(f, "{}", headers.block())?;
    writeln!(f, "{}", headers.signed_headers())?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(
    ctx: &SigningContext,
    canonical_request: &str,
) -> ec2sign_core::Result<String> {
    let mut f = String::with_capacity(128);

    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{}", ctx.timestamp())?;
    writeln!(f, "{}", ctx.credential_scope())?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;

    Ok(f)
}

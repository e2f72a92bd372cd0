use std::collections::HashSet;
use std::sync::Arc;

use http::request::Parts;
use http::{header, HeaderMap, HeaderValue, Method};
use log::debug;
use percent_encoding::utf8_percent_encode;

use ec2sign_core::hash::{hex_hmac_sha256, hex_sha256};
use ec2sign_core::{Error, SignRequest, SigningCredential, SigningMethod, SigningRequest};

use crate::canonical::{
    canonical_headers, canonical_query_string, canonical_request_string, string_to_sign,
};
use crate::constants::*;
use crate::key::{derive_signing_key, SigningKey, SigningKeyCache};
use crate::{Credential, SigningContext};

/// Compute the final signature: `hex(HMAC(kSigning, string_to_sign))`.
pub fn compute_signature(key: &SigningKey, string_to_sign: &str) -> ec2sign_core::Result<String> {
    hex_hmac_sha256(key.as_bytes(), string_to_sign.as_bytes()).map_err(|e| {
        Error::key_invalid("failed to compute signature at signature stage").with_source(e)
    })
}

/// Format the `Authorization` header value.
///
/// `credential` is the formatted credential `accessKey/dateStamp/region/service/aws4_request`.
pub fn authorization_header(credential: &str, signed_headers: &str, signature: &str) -> String {
    format!("{ALGORITHM} Credential={credential}, SignedHeaders={signed_headers}, Signature={signature}")
}

/// Outcome of one signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResult {
    signature: String,
    signed_headers: String,
    credential: String,
    authorization: String,
}

impl SigningResult {
    /// Lowercase hex signature, 64 characters.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Sorted lowercase names of the signed headers joined by `;`.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// `accessKey/dateStamp/region/service/aws4_request`
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Ready to send `Authorization` header value.
    pub fn authorization_header(&self) -> &str {
        &self.authorization
    }
}

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer never changes after construction and can be shared between
/// threads. Each call returns its own [`SigningResult`].
#[derive(Debug, Clone)]
pub struct RequestSigner {
    ctx: SigningContext,
    key_cache: Option<Arc<SigningKeyCache>>,
}

impl RequestSigner {
    /// Create a new signer for the given context.
    pub fn new(ctx: SigningContext) -> Self {
        Self {
            ctx,
            key_cache: None,
        }
    }

    /// Reuse derived signing keys through `cache`.
    ///
    /// Without a cache the key is derived again on every call.
    pub fn with_key_cache(mut self, cache: Arc<SigningKeyCache>) -> Self {
        self.key_cache = Some(cache);
        self
    }

    /// The context this signer signs with.
    pub fn context(&self) -> &SigningContext {
        &self.ctx
    }

    /// `accessKey/dateStamp/region/service/aws4_request`
    pub fn formatted_credential(&self, cred: &Credential) -> String {
        self.ctx.formatted_credential(cred)
    }

    /// Sign a `GET` request with an empty body.
    pub fn sign(
        &self,
        cred: &Credential,
        attributes: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
        headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    ) -> ec2sign_core::Result<SigningResult> {
        self.sign_with_body(cred, attributes, headers, b"", &Method::GET)
    }

    /// Sign a request.
    ///
    /// Attributes are the query parameters and headers the http headers that
    /// will be sent. A `host` header carrying the endpoint of the context is
    /// always signed.
    pub fn sign_with_body(
        &self,
        cred: &Credential,
        attributes: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
        headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
        body: &[u8],
        method: &Method,
    ) -> ec2sign_core::Result<SigningResult> {
        cred.check()?;

        let query = canonical_query_string(attributes);
        let headers = canonical_headers(headers, self.ctx.endpoint());
        let payload_hash = hex_sha256(body);

        // build canonical request and string to sign.
        let creq = canonical_request_string(method, &query, &headers, &payload_hash)?;
        debug!("calculated canonical request: {creq}");

        let scope = self.ctx.credential_scope();
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&self.ctx, &creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signature = {
            let signing_key = self.signing_key(cred)?;
            compute_signature(&signing_key, &string_to_sign)?
        };

        let credential = format!("{}/{}", cred.access_key_id, scope);
        let authorization = authorization_header(&credential, headers.signed_headers(), &signature);

        Ok(SigningResult {
            signature,
            signed_headers: headers.signed_headers().to_string(),
            credential,
            authorization,
        })
    }

    fn signing_key(&self, cred: &Credential) -> ec2sign_core::Result<SigningKey> {
        match &self.key_cache {
            Some(cache) => cache.get_or_derive(cred, &self.ctx),
            None => derive_signing_key(&cred.secret_access_key, &self.ctx),
        }
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &mut Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
        method: SigningMethod,
    ) -> ec2sign_core::Result<()> {
        let Some(cred) = credential else {
            return Ok(());
        };
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential is incomplete or expired",
            ));
        }

        // Validate before taking the request apart so that a failure leaves it intact.
        if req.uri.authority().is_none() {
            return Err(Error::request_invalid(
                "request without authority is invalid for signing",
            ));
        }
        if req.uri.path() != "/" {
            return Err(Error::request_invalid(format!(
                "only the api root can be signed, got path {}",
                req.uri.path()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(query) = req.uri.query() {
            for (k, _) in form_urlencoded::parse(query.as_bytes()) {
                if !seen.insert(k.clone()) {
                    return Err(Error::request_invalid(format!(
                        "query parameter {k} is repeated"
                    )));
                }
            }
        }

        let mut signed_req = SigningRequest::build(req)?;
        canonicalize_header(&mut signed_req, cred, method, &self.ctx)?;
        canonicalize_query(&mut signed_req, cred, method, &self.ctx)?;

        let headers = header_pairs(&signed_req.headers)?;
        let result = self.sign_with_body(
            cred,
            signed_req.query.clone(),
            headers,
            body,
            &signed_req.method,
        )?;

        match method {
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(result.authorization_header())?;
                authorization.set_sensitive(true);

                signed_req
                    .headers
                    .insert(header::AUTHORIZATION, authorization);
            }
            SigningMethod::Query(_) => {
                signed_req.query_push(X_AMZ_SIGNATURE_QUERY, result.signature());
            }
        }

        signed_req.query = signed_req
            .query
            .iter()
            .map(|(k, v)| {
                (
                    utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                    utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
                )
            })
            .collect();

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// Flatten headers into pairs, joining repeated values with `,`.
fn header_pairs(headers: &HeaderMap) -> ec2sign_core::Result<Vec<(String, String)>> {
    headers
        .keys()
        .map(|k| {
            let values = headers
                .get_all(k)
                .iter()
                .map(|v| Ok(v.to_str()?.trim()))
                .collect::<ec2sign_core::Result<Vec<_>>>()?;
            Ok((k.as_str().to_string(), values.join(",")))
        })
        .collect()
}

fn canonicalize_header(
    ctx: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    signing_ctx: &SigningContext,
) -> ec2sign_core::Result<()> {
    // Drop any previous signature.
    ctx.headers.remove(header::AUTHORIZATION);
    // The signed host is always the configured endpoint.
    ctx.headers
        .insert(header::HOST, HeaderValue::from_str(signing_ctx.endpoint())?);

    if method == SigningMethod::Header {
        // The date header must match the timestamp in the string to sign.
        ctx.headers.insert(
            X_AMZ_DATE,
            HeaderValue::from_str(&signing_ctx.timestamp())?,
        );

        // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to valid leaking.
            value.set_sensitive(true);

            ctx.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    }

    Ok(())
}

fn canonicalize_query(
    ctx: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    signing_ctx: &SigningContext,
) -> ec2sign_core::Result<()> {
    let SigningMethod::Query(expire) = method else {
        return Ok(());
    };

    let signed_headers = canonical_headers(header_pairs(&ctx.headers)?, signing_ctx.endpoint())
    .signed_headers()
    .to_string();

    ctx.query_push(X_AMZ_ALGORITHM_QUERY, ALGORITHM);
    ctx.query_push(
        X_AMZ_CREDENTIAL_QUERY,
        signing_ctx.formatted_credential(cred),
    );
    ctx.query_push(X_AMZ_DATE_QUERY, signing_ctx.timestamp());
    ctx.query_push(X_AMZ_EXPIRES_QUERY, expire.as_secs().to_string());
    ctx.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);

    if let Some(token) = &cred.session_token {
        ctx.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token);
    }

    Ok(())
}

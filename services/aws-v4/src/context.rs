use chrono::Timelike;
use ec2sign_core::time::{format_date, format_iso8601, parse_iso8601, DateTime};
use ec2sign_core::Error;

use crate::constants::TERMINATOR;
use crate::Credential;

/// Everything besides the credential that scopes a signature.
///
/// A context is immutable. Callers must build a fresh one for every request
/// since the provider rejects stale timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    region: String,
    service: String,
    endpoint: String,
    time: DateTime,
}

impl SigningContext {
    /// Create a context signing at `time`.
    pub fn new(
        region: &str,
        service: &str,
        endpoint: &str,
        time: DateTime,
    ) -> ec2sign_core::Result<Self> {
        if region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        if service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        if endpoint.is_empty() {
            return Err(Error::config_invalid("endpoint must not be empty"));
        }

        Ok(Self {
            region: region.to_string(),
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            // Signatures carry second precision only.
            time: time
                .with_nanosecond(0)
                .ok_or_else(|| Error::request_invalid("signing time is out of range"))?,
        })
    }

    /// Create a context from a basic ISO 8601 timestamp like `20141106T111126Z`.
    ///
    /// The timestamp is validated before anything else happens.
    pub fn from_timestamp(
        region: &str,
        service: &str,
        endpoint: &str,
        timestamp: &str,
    ) -> ec2sign_core::Result<Self> {
        let time = parse_iso8601(timestamp)?;
        Self::new(region, service, endpoint, time)
    }

    /// Region of the target api.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service name of the target api, for example `ec2`.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Host the request is sent to, also signed as the `host` header.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Signing time.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// Timestamp in `YYYYMMDDTHHMMSSZ` form.
    pub fn timestamp(&self) -> String {
        format_iso8601(self.time)
    }

    /// First 8 characters of the timestamp.
    pub fn date_stamp(&self) -> String {
        format_date(self.time)
    }

    /// Scope: "20220313/<region>/<service>/aws4_request"
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date_stamp(),
            self.region,
            self.service,
            TERMINATOR
        )
    }

    /// `accessKey/dateStamp/region/service/aws4_request`
    pub fn formatted_credential(&self, cred: &Credential) -> String {
        format!("{}/{}", cred.access_key_id, self.credential_scope())
    }
}

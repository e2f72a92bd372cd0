use std::env;

use ec2sign_core::time::DateTime;
use ec2sign_core::Error;
use log::debug;

use crate::constants::*;
use crate::SigningContext;

/// Config for aws services.
///
/// Credentials are not part of the config, callers pass them with every
/// signing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `service` defaults to `ec2`.
    pub service: String,
    /// `host_header` overrides the endpoint derived from service and region.
    pub host_header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            service: "ec2".to_string(),
            host_header: None,
        }
    }
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set service
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set host_header
    pub fn with_host_header(mut self, host_header: impl Into<String>) -> Self {
        self.host_header = Some(host_header.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self) -> Self {
        if self.region.is_none() {
            self.region = [AWS_REGION, AWS_DEFAULT_REGION]
                .into_iter()
                .filter_map(|key| env::var(key).ok())
                .find(|v| !v.is_empty());
        }

        self
    }

    /// Host the signed requests are sent to.
    pub fn endpoint(&self) -> ec2sign_core::Result<String> {
        if let Some(host) = &self.host_header {
            return Ok(host.clone());
        }

        let region = self.region()?;
        Ok(format!("{}.{region}.amazonaws.com", self.service))
    }

    /// Build the signing context for a request signed at `time`.
    pub fn signing_context(&self, time: DateTime) -> ec2sign_core::Result<SigningContext> {
        let region = self.region()?;
        let endpoint = self.endpoint()?;
        debug!(
            "signing for service {} in region {region} at {endpoint}",
            self.service
        );

        SigningContext::new(region, &self.service, &endpoint, time)
    }

    fn region(&self) -> ec2sign_core::Result<&str> {
        match self.region.as_deref() {
            Some(region) if !region.is_empty() => Ok(region),
            _ => Err(Error::config_invalid(
                "region is required, set it in config or through AWS_REGION",
            )),
        }
    }
}

//! AWS SigV4 signer for EC2/ECS query APIs
//!
//! ```text
//! attributes ─► canonical query ─┐
//! headers    ─► canonical headers┼─► canonical request ─► string to sign ─┐
//! body       ─► payload hash  ───┘                                        ├─► signature ─► Authorization
//! secret     ─► kDate ─► kRegion ─► kService ─► kSigning ─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use ec2sign_aws_v4::{Credential, RequestSigner, SigningContext};
//!
//! # fn main() -> ec2sign_core::Result<()> {
//! let ctx = SigningContext::from_timestamp(
//!     "us-east-1",
//!     "ec2",
//!     "ec2.us-east-1.amazonaws.com",
//!     "20150830T123600Z",
//! )?;
//! let cred = Credential::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
//!
//! let result = RequestSigner::new(ctx).sign(
//!     &cred,
//!     [("Action", "DescribeInstances"), ("Version", "2016-11-15")],
//!     [("X-Amz-Date", "20150830T123600Z")],
//! )?;
//! assert!(result
//!     .authorization_header()
//!     .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/ec2/aws4_request"));
//! # Ok(())
//! # }
//! ```

pub mod canonical;

mod config;
pub use config::Config;

mod constants;

mod context;
pub use context::SigningContext;

mod credential;
pub use credential::Credential;

mod key;
pub use key::{derive_signing_key, SigningKey, SigningKeyCache};

mod sign_request;
pub use sign_request::{authorization_header, compute_signature, RequestSigner, SigningResult};

use crate::SigningMethod;
use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials used to sign requests.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// SignRequest is the trait used to sign an outgoing http request in place.
///
/// Signing is synchronous and side effect free apart from the mutation of
/// `req`. Implementations must be safe to share between threads.
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request.
    ///
    /// ## Credential
    ///
    /// `None` means anonymous access: the request must be left untouched.
    ///
    /// ## Body
    ///
    /// The complete payload of the request. Signing covers its digest, so the
    /// whole body has to be available before signing.
    ///
    /// ## Method
    ///
    /// [`SigningMethod::Header`] attaches the signature as the `Authorization`
    /// header, [`SigningMethod::Query`] attaches it to the query string.
    fn sign_request(
        &self,
        req: &mut http::request::Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
        method: SigningMethod,
    ) -> crate::Result<()>;
}

use modkit::api::problem::{unauthorized, ProblemResponse};

use crate::contract::error::CredentialExchangeError;

/// Map the contract error to its RFC 9457 response.
///
/// The body is constant: no stage, provider detail or request id reaches
/// the client.
pub fn map_exchange_error(e: &CredentialExchangeError) -> ProblemResponse {
    match e {
        CredentialExchangeError::Unauthorized => {
            unauthorized("Not Authorized").with_code("NOT_AUTHORIZED").into()
        }
    }
}

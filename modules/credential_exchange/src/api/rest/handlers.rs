use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
    Extension,
};
use modkit::api::problem::ProblemResponse;
use tracing::{info, warn};

use crate::api::rest::dto::ExchangeResponseDto;
use crate::api::rest::error::map_exchange_error;
use crate::contract::error::CredentialExchangeError;
use crate::contract::model::IdentityToken;
use crate::domain::service::Service;

/// Exchange the caller's bearer token for scoped Chime credentials.
///
/// Bound to every method; the request body is ignored.
pub async fn exchange_credentials(
    Extension(svc): Extension<Arc<Service>>,
    headers: HeaderMap,
) -> Result<Json<ExchangeResponseDto>, ProblemResponse> {
    // A missing or non-UTF-8 header is a blank token; the service rejects it.
    let token = IdentityToken::new(
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
    );

    match svc.exchange(&token).await {
        Ok(grant) => {
            info!(user_uuid = %grant.user.uuid, "Issued Chime credentials");
            Ok(Json(ExchangeResponseDto::from(grant)))
        }
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "Credential exchange rejected");
            Err(map_exchange_error(&CredentialExchangeError::from(e)))
        }
    }
}

use std::sync::Arc;

use axum::{routing::any, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the exchange handler on `route` for every HTTP method.
pub fn register_routes(router: Router, route: &str, service: Arc<Service>) -> Router {
    router
        .route(route, any(handlers::exchange_credentials))
        .layer(Extension(service))
}

// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

pub use contract::{error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::CredentialExchange;

// === INTERNAL MODULES ===
// Exposed for tests and for wiring in the server binary; only `contract`
// is a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

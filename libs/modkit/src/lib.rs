//! # ModKit - module plumbing for the credex gateway
//!
//! Small set of contracts and helpers shared by every module:
//!
//! - **Contracts**: `Module` (DI/wiring) and `RestfulModule` (route registration)
//! - **Context**: `ModuleCtx` scoped to a module name, carrying its config section
//!   and the process-wide cancellation token
//! - **HTTP**: a traced outgoing client and RFC 9457 problem responses
//! - **Runtime**: shutdown wiring (OS signals, external token or future)
//!
//! Modules are wired explicitly by the binary; there is no global registry.

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod contracts;
pub use contracts::{Module, RestfulModule};

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod api;
pub use api::problem::{unauthorized, Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};

pub mod http;
pub use http::client::TracedClient;

pub mod runtime;
pub use runtime::{shutdown_token, ShutdownOptions};

pub mod error;
pub mod normalize;
pub mod ports;
pub mod service;

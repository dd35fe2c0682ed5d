//! HTTP client for the bank registry REST API, plus a demonstration run
//! that walks through every operation.

pub mod api;
pub mod demo;

pub use api::{BankApiClient, ClientError, ClientResult, DEFAULT_BASE_URL};
pub use demo::{DemoError, DemoReport, DemoStep};

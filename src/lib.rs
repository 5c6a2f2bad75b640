pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;

pub use api::{ApiResult, ConnectionStatus, QueryParams, SheetsApi};
pub use config::ClientConfig;
pub use error::ApiError;
pub use executor::RequestExecutor;
pub use http::RetryPolicy;

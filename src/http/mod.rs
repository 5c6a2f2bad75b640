//! HTTP transport and retry primitives.

mod client;
mod retry;

pub use client::{HttpTransport, Transport, TransportOutcome, TransportRequest};
pub use retry::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy, Scheduler, TokioScheduler,
};

#[cfg(test)]
pub use client::MockTransport;
#[cfg(test)]
pub use retry::MockScheduler;

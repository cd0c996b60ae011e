//! Injectable latency for the mock gateway.
//!
//! The simulated network delay is bounded and side-effect-free, so a
//! caller that gives up never needs to cancel the in-flight mock call.

use std::time::Duration;

use async_trait::async_trait;

/// Simulated gateway latency.
#[async_trait]
pub trait Latency: Send + Sync {
    /// Pauses for the given bounded duration.
    async fn pause(&self, duration: Duration);
}

/// Production latency backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLatency;

#[async_trait]
impl Latency for TokioLatency {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test latency that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn pause(&self, _duration: Duration) {}
}

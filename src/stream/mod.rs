//! Stream module - creation events over a persistent connection
//!
//! The trade cycle only sees the [`Transport`] / [`Connection`] traits.
//! [`pumpportal`] is the websocket implementation used by the binary.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

pub mod event;
pub mod pumpportal;

pub use event::CreationEvent;
pub use pumpportal::PumpPortalTransport;

/// Opens streaming connections
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A live, subscribed connection
#[async_trait]
pub trait Connection: Send {
    /// Wait for the next creation event.
    ///
    /// Non-event traffic is consumed internally. Returns `Ok(None)` once the
    /// stream has closed.
    async fn next_event(&mut self) -> Result<Option<CreationEvent>>;

    /// Ping handle for the keep-alive task. It shares the connection but
    /// never reads from it.
    fn keepalive(&self) -> Arc<dyn KeepAlive>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait KeepAlive: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

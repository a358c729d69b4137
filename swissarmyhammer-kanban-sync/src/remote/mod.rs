//! Remote synchronization gateway
//!
//! The engine only needs an asynchronous `call(method, args)` that either
//! returns a JSON reply or fails. Transport, authentication and retries
//! belong to the implementor.

pub mod method;
mod payload;

pub use payload::*;

use crate::error::{RemoteError, Result, SyncError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Request/response channel to the system of record
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Invoke `method` with `args`, returning the reply message
    async fn call(&self, method: &str, args: Value) -> std::result::Result<Value, RemoteError>;
}

/// Serialize `args`, call `method` and decode the reply into `R`.
pub async fn submit<A, R>(gateway: &dyn RemoteGateway, method: &str, args: &A) -> Result<R>
where
    A: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let reply = call(gateway, method, args).await?;
    serde_json::from_value(reply).map_err(|e| {
        warn!(method, error = %e, "remote reply did not decode");
        SyncError::decode(method, e)
    })
}

/// Like [`submit`] but keeps the raw reply
pub async fn call<A>(gateway: &dyn RemoteGateway, method: &str, args: &A) -> Result<Value>
where
    A: Serialize + ?Sized,
{
    let args = serde_json::to_value(args)?;
    debug!(method, "submitting remote call");
    Ok(gateway.call(method, args).await?)
}

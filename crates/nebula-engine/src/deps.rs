use async_trait::async_trait;
use nebula_protocol::{Action, AppContext, BackendMethod};
use serde_json::Value;

use crate::Result;

// ---- State store ----

/// In-memory state store: read-only context plus an action sink.
pub trait Store: Send + Sync {
    /// Snapshot the ambient application state.
    fn context(&self) -> AppContext;
    /// Apply a non-persisted state transition.
    fn dispatch(&self, action: Action);
}

// ---- Persistence backend ----

/// Opaque RPC boundary to the notebook backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Invoke `method` with JSON `args`. A rejection is returned as
    /// [`Error::Backend`](crate::Error::Backend).
    async fn invoke(&self, method: BackendMethod, args: Value) -> Result<Value>;
}

//! In-memory collaborators for engine tests and the replay tool.
//!
//! [`MemoryStore`] records every dispatched action against a mutable context;
//! [`RecordingBackend`] records every invocation and can be told to reject
//! methods or to take time before answering.

use std::{collections::HashSet, mem, time::Duration};

use async_trait::async_trait;
use nebula_protocol::{Action, AppContext, BackendMethod, PageRef};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time;

use crate::{Backend, Error, Result, Store};

/// State store backed by a context value and an action log.
#[derive(Default)]
pub struct MemoryStore {
    /// Current context.
    ctx: Mutex<AppContext>,
    /// Dispatched actions, oldest first.
    actions: Mutex<Vec<Action>>,
}

impl MemoryStore {
    /// A store starting at `ctx`.
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx: Mutex::new(ctx),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Replace the context.
    pub fn set_context(&self, ctx: AppContext) {
        *self.ctx.lock() = ctx;
    }

    /// Navigate to `route`, keeping the open page.
    pub fn set_route(&self, route: &str) {
        self.ctx.lock().route = route.to_string();
    }

    /// Open `page`, or close the current one with `None`.
    pub fn set_page(&self, page: Option<PageRef>) {
        self.ctx.lock().current_page = page;
    }

    /// Replace the open document text.
    pub fn set_doc(&self, doc: &str) {
        self.ctx.lock().current_doc = doc.to_string();
    }

    /// Snapshot of dispatched actions.
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().clone()
    }

    /// Drain dispatched actions.
    pub fn take_actions(&self) -> Vec<Action> {
        mem::take(&mut *self.actions.lock())
    }

    /// Count of `ShowModal` actions whose modal has wire tag `kind`.
    pub fn shown_modals(&self, kind: &str) -> usize {
        self.actions
            .lock()
            .iter()
            .filter(|a| matches!(a, Action::ShowModal(spec) if spec.kind() == kind))
            .count()
    }
}

impl Store for MemoryStore {
    fn context(&self) -> AppContext {
        self.ctx.lock().clone()
    }

    fn dispatch(&self, action: Action) {
        self.actions.lock().push(action);
    }
}

/// A recorded backend invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Method invoked.
    pub method: BackendMethod,
    /// Arguments as sent.
    pub args: Value,
}

/// Backend that records calls and answers from a script.
#[derive(Default)]
pub struct RecordingBackend {
    /// Completed and in-flight calls, in start order.
    calls: Mutex<Vec<Call>>,
    /// `start:<method>` / `end:<method>` markers, in occurrence order.
    journal: Mutex<Vec<String>>,
    /// Methods that reject.
    failing: Mutex<HashSet<BackendMethod>>,
    /// Time each call takes.
    latency: Mutex<Duration>,
}

impl RecordingBackend {
    /// A backend that accepts everything immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `method` reject from now on.
    pub fn fail_on(&self, method: BackendMethod) {
        self.failing.lock().insert(method);
    }

    /// Make `method` succeed again.
    pub fn recover(&self, method: BackendMethod) {
        self.failing.lock().remove(&method);
    }

    /// Make every call take `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Snapshot of recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Methods of recorded calls, in order.
    pub fn methods(&self) -> Vec<BackendMethod> {
        self.calls.lock().iter().map(|c| c.method).collect()
    }

    /// Start/end markers, in order.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn invoke(&self, method: BackendMethod, args: Value) -> Result<Value> {
        self.calls.lock().push(Call {
            method,
            args: args.clone(),
        });
        self.journal.lock().push(format!("start:{}", method.as_str()));
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            time::sleep(latency).await;
        }
        self.journal.lock().push(format!("end:{}", method.as_str()));
        if self.failing.lock().contains(&method) {
            return Err(Error::Backend {
                method: method.as_str(),
                message: "rejected".to_string(),
            });
        }
        Ok(json!({ "method": method.as_str(), "ok": true }))
    }
}

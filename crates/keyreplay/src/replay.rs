//! Drives an engine from parsed directives.

use std::{io::Write, sync::Arc};

use config::Settings;
use nebula_engine::{
    Engine,
    test_support::{MemoryStore, RecordingBackend},
};
use nebula_protocol::AppContext;
use serde_json::{Value, json};
use tokio::time;
use tracing::info;

use crate::{error::Result, script::Directive};

/// An engine over in-memory collaborators, plus output bookkeeping.
pub struct Session {
    /// Engine under replay.
    engine: Engine,
    /// Store the engine dispatches into.
    store: Arc<MemoryStore>,
    /// Backend the engine calls.
    backend: Arc<RecordingBackend>,
    /// Backend calls already reported.
    calls_seen: usize,
}

impl Session {
    /// A session starting at the root route with no page open.
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new(AppContext::at("/")));
        let backend = Arc::new(RecordingBackend::new());
        let engine = Engine::new(store.clone(), backend.clone(), settings);
        Self {
            engine,
            store,
            backend,
            calls_seen: 0,
        }
    }

    /// Apply one directive and describe what happened.
    pub async fn apply(&self, directive: &Directive) -> String {
        match directive {
            Directive::Binding(b) => format!("{:?}", self.engine.dispatch(b).await),
            Directive::Key(ev) => format!("{:?}", self.engine.handle_key(ev).await),
            Directive::Run(id) => format!("{:?}", self.engine.execute(id).await),
            Directive::Route(route) => {
                self.store.set_route(route);
                "route set".to_string()
            }
            Directive::Page(page) => {
                let label = page
                    .as_ref()
                    .map_or_else(|| "page closed".to_string(), |p| format!("page {}", p.id));
                self.store.set_page(page.clone());
                label
            }
            Directive::Doc(text) => {
                self.store.set_doc(text);
                format!("doc set ({} bytes)", text.len())
            }
            Directive::Confirm => format!("{:?}", self.engine.confirm().await),
            Directive::Cancel => {
                if self.engine.cancel() {
                    "modal closed".to_string()
                } else {
                    "no modal".to_string()
                }
            }
            Directive::Wait(d) => {
                time::sleep(*d).await;
                match self.engine.modals().countdown() {
                    Some(n) => format!("waited {}ms, countdown {n}", d.as_millis()),
                    None => format!("waited {}ms", d.as_millis()),
                }
            }
            Directive::Fail(method) => {
                self.backend.fail_on(*method);
                format!("{} now fails", method.as_str())
            }
        }
    }

    /// Report records produced since the last drain: backend calls first,
    /// then store actions, each as one JSON value.
    pub fn drain(&mut self) -> Result<Vec<Value>> {
        let calls = self.backend.calls();
        let mut out: Vec<Value> = calls
            .iter()
            .skip(self.calls_seen)
            .map(|c| json!({ "call": c.method.as_str(), "args": c.args }))
            .collect();
        self.calls_seen = calls.len();
        for action in self.store.take_actions() {
            out.push(json!({ "dispatch": serde_json::to_value(&action)? }));
        }
        Ok(out)
    }
}

/// Replay `script` against `session`, writing one JSON line per record to `out`.
pub async fn run<W: Write>(
    session: &mut Session,
    script: &[(usize, Directive)],
    out: &mut W,
) -> Result<()> {
    for (line, directive) in script {
        let outcome = session.apply(directive).await;
        info!(line, ?directive, %outcome, "directive");
        for record in session.drain()? {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }
    out.flush()?;
    Ok(())
}

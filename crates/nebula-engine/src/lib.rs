//! Nebula Engine
//!
//! The engine turns key presses into application commands:
//! - normalizes raw key events into canonical binding strings
//! - resolves bindings through the built-in binding table and command registry
//! - runs each command behind its context guard, one command at a time
//! - owns the active modal and gates destructive actions behind a timed
//!   confirmation
//!
//! Collaborators are reached through two seams: [`Store`] for in-memory state
//! and [`Backend`] for persistence.
use std::sync::Arc;

mod bindings;
pub mod commands;
mod deps;
mod error;
mod gate;
mod guard;
mod modal;
pub mod test_support;
mod ticker;

use config::Settings;
use keybind::{KeyEvent, KeyInput, normalize};
use nebula_protocol::{Action, ModalSpec, PageArgs};
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info, trace};

pub use bindings::BindingTable;
pub use commands::{Command, CommandRegistry, Guarded, Handler, Scope, guarded};
pub use deps::{Backend, Store};
pub use error::{Error, Result};
pub use gate::{ConfirmationGate, GateState, NOT_COUNTING};
pub use guard::{Guard, is_in_editor};
pub use modal::{ConfirmOutcome, DestructiveOp, ModalHost};
pub use ticker::Ticker;

/// Result of feeding one input to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The key press was a bare modifier and produced no binding.
    NoBinding,
    /// No command is bound to the binding.
    Unbound(String),
    /// The command id has no registered handler.
    Unhandled(String),
    /// The command's guard did not hold; nothing ran.
    Blocked(&'static str),
    /// The command ran.
    Ran(&'static str),
    /// The command ran and failed; the failure was logged.
    Failed(&'static str),
}

/// Engine coordinates key dispatch, command execution and the modal host.
///
/// Construct via [`Engine::new`], then feed key events with
/// [`Engine::handle_key`] (or run [`Engine::run`] over a channel), trigger
/// commands from other sources with [`Engine::execute`], and drive
/// confirmations with [`Engine::confirm`] and [`Engine::cancel`].
#[derive(Clone)]
pub struct Engine {
    /// State store.
    store: Arc<dyn Store>,
    /// Persistence backend.
    backend: Arc<dyn Backend>,
    /// Active modal owner.
    modals: ModalHost,
    /// Engine settings.
    settings: Arc<Settings>,
    /// Binding string → command id.
    bindings: &'static BindingTable,
    /// Command id → command.
    registry: &'static CommandRegistry,
    /// Held for the duration of every command so executions never interleave.
    exec: Arc<Mutex<()>>,
}

impl Engine {
    /// Create an engine over the given collaborators.
    pub fn new(store: Arc<dyn Store>, backend: Arc<dyn Backend>, settings: Settings) -> Self {
        Self {
            store,
            backend,
            modals: ModalHost::new(settings.confirmation),
            settings: Arc::new(settings),
            bindings: BindingTable::global(),
            registry: CommandRegistry::global(),
            exec: Arc::new(Mutex::new(())),
        }
    }

    /// The modal host.
    pub fn modals(&self) -> &ModalHost {
        &self.modals
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Normalize a key press and dispatch its binding.
    pub async fn handle_key<E>(&self, ev: &E) -> Outcome
    where
        E: KeyInput + Sync + ?Sized,
    {
        match normalize(ev) {
            Some(binding) => self.dispatch(&binding.to_string()).await,
            None => {
                trace!(key = ev.key(), "bare_modifier");
                Outcome::NoBinding
            }
        }
    }

    /// Dispatch a canonical binding string.
    ///
    /// Unbound bindings and unknown commands are no-ops. The command's own
    /// guard decides whether it runs; dispatch does no context filtering.
    pub async fn dispatch(&self, binding: &str) -> Outcome {
        let Some(command) = self.bindings.command_for(binding) else {
            trace!(binding, "unbound");
            return Outcome::Unbound(binding.to_string());
        };
        trace!(binding, command, "binding_resolved");
        self.execute(command).await
    }

    /// Run a command by id, as a menu or command palette would.
    pub async fn execute(&self, command_id: &str) -> Outcome {
        let Some(command) = self.registry.lookup(command_id) else {
            trace!(command = command_id, "unhandled");
            return Outcome::Unhandled(command_id.to_string());
        };
        let _serial = self.exec.lock().await;
        let scope = Scope::new(
            self.store.context(),
            self.store.clone(),
            self.backend.clone(),
            self.modals.clone(),
            self.settings.clone(),
        );
        command.run(scope).await
    }

    /// Mount a modal directly (e.g. a confirmation requested from a menu).
    pub fn show_modal(&self, spec: ModalSpec) {
        commands::mount(&self.modals, self.store.as_ref(), spec);
    }

    /// Confirm the active confirmation.
    ///
    /// Runs only when the gate is ready and the payload matches the modal id.
    /// While the backend call runs the modal cannot be cancelled. On success
    /// the modal closes; on a backend failure it becomes confirmable again so
    /// the user can retry or cancel.
    pub async fn confirm(&self) -> ConfirmOutcome {
        let _serial = self.exec.lock().await;
        let (generation, op) = match self.modals.begin_confirm() {
            Ok(found) => found,
            Err(outcome) => {
                trace!(?outcome, "confirm_ignored");
                return outcome;
            }
        };
        let method = op.method();
        let args = PageArgs {
            page_id: op.page_id().to_string(),
        };
        match commands::call(self.backend.as_ref(), method, &args).await {
            Ok(_) => {
                if self.modals.finish_confirm(generation) {
                    self.store.dispatch(Action::UnloadModal);
                }
                info!(method = method.as_str(), page = %args.page_id, "confirmed");
                ConfirmOutcome::Confirmed(method)
            }
            Err(e) => {
                self.modals.reopen(generation);
                error!(method = method.as_str(), error = %e, "confirm_failed");
                ConfirmOutcome::Failed(method)
            }
        }
    }

    /// Cancel the active modal without side effects. Returns false when no
    /// modal was mounted or its confirmation is already running.
    pub fn cancel(&self) -> bool {
        let closed = self.modals.unload();
        if closed {
            self.store.dispatch(Action::UnloadModal);
        }
        closed
    }

    /// Process key events in delivery order until the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<KeyEvent>) {
        while let Some(ev) = rx.recv().await {
            let outcome = self.handle_key(&ev).await;
            trace!(?outcome, "key_processed");
        }
        debug!("key input closed");
    }

    /// Spawn [`Engine::run`] on the current runtime, returning the input side.
    pub fn spawn_input(&self, capacity: usize) -> (InputTx, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.run(rx).await });
        (InputTx { tx }, handle)
    }
}

/// Sending half of the engine's key input channel.
#[derive(Clone)]
pub struct InputTx {
    /// Channel into [`Engine::run`].
    tx: mpsc::Sender<KeyEvent>,
}

impl InputTx {
    /// Queue a key event.
    pub async fn send(&self, ev: KeyEvent) -> Result<()> {
        self.tx.send(ev).await.map_err(|_| Error::ChannelClosed)
    }
}

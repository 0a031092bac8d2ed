//! Modal host: single owner of the active modal and its confirmation gate.
//!
//! At most one modal is active. Showing a modal replaces the previous one,
//! which drops its countdown ticker. A confirmation's ticker runs only while
//! its gate is awaiting the timeout.

use std::{
    ops::ControlFlow,
    sync::{Arc, Weak},
};

use config::ConfirmationSettings;
use nebula_protocol::{
    BackendMethod, ConfirmKind, ConfirmProps, ConfirmationModal, ModalSpec, PageCreateModal,
    Severity,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    gate::{ConfirmationGate, GateState},
    ticker::Ticker,
};

/// Destructive operation authorized by a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveOp {
    /// Move a page to the trash.
    MoveToTrash {
        /// Page to move.
        page_id: String,
    },
    /// Delete a page permanently.
    DeletePermanent {
        /// Page to delete.
        page_id: String,
    },
}

impl DestructiveOp {
    /// Resolve the operation for a confirmation.
    ///
    /// The modal id selects the expected kind and the payload must declare the
    /// same kind. Unknown ids and mismatched payloads resolve to `None`.
    pub fn resolve(modal: &ConfirmationModal) -> Option<Self> {
        let kind = ConfirmKind::from_id(&modal.id)?;
        match (kind, &modal.props) {
            (ConfirmKind::RemovePage, ConfirmProps::RemovePage { page_id }) => {
                Some(Self::MoveToTrash {
                    page_id: page_id.clone(),
                })
            }
            (ConfirmKind::RemovePagePermanent, ConfirmProps::RemovePagePermanent { page_id }) => {
                Some(Self::DeletePermanent {
                    page_id: page_id.clone(),
                })
            }
            (ConfirmKind::RemovePage, ConfirmProps::RemovePagePermanent { .. })
            | (ConfirmKind::RemovePagePermanent, ConfirmProps::RemovePage { .. }) => None,
        }
    }

    /// Backend method performing this operation.
    pub fn method(&self) -> BackendMethod {
        match self {
            Self::MoveToTrash { .. } => BackendMethod::MovePageToTrash,
            Self::DeletePermanent { .. } => BackendMethod::DeletePagePermanent,
        }
    }

    /// Target page.
    pub fn page_id(&self) -> &str {
        match self {
            Self::MoveToTrash { page_id } | Self::DeletePermanent { page_id } => page_id,
        }
    }
}

/// Why a confirmation could not proceed, or how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// No confirmation modal is active.
    NoConfirmation,
    /// The countdown has not finished.
    NotReady {
        /// Seconds left.
        remaining: u32,
    },
    /// Unknown id or payload kind mismatch; nothing ran.
    Mismatch,
    /// The confirmation was already accepted and its operation is running.
    InProgress,
    /// The operation ran and the modal closed.
    Confirmed(BackendMethod),
    /// The backend rejected the operation; the modal stays open.
    Failed(BackendMethod),
}

/// A mounted confirmation.
struct Session {
    /// The request being confirmed.
    modal: ConfirmationModal,
    /// Countdown state.
    gate: ConfirmationGate,
    /// Countdown driver; present exactly while the gate is awaiting.
    ticker: Option<Ticker>,
}

/// The active modal.
enum Active {
    /// Page creation prompt.
    Page(PageCreateModal),
    /// Confirmation with its gate.
    Confirm(Session),
}

impl Active {
    /// The spec this modal was mounted from.
    fn spec(&self) -> ModalSpec {
        match self {
            Self::Page(m) => ModalSpec::PageCreate(m.clone()),
            Self::Confirm(s) => ModalSpec::Confirmation(s.modal.clone()),
        }
    }
}

/// Modal slot shared by host clones and countdown tasks.
#[derive(Default)]
struct Slot {
    /// Bumped on every mount; lets stale tickers and confirmations detect
    /// that their modal was replaced.
    generation: u64,
    /// Mounted modal, if any.
    active: Option<Active>,
}

impl Slot {
    /// The mounted confirmation, if any.
    fn session(&self) -> Option<&Session> {
        match &self.active {
            Some(Active::Confirm(s)) => Some(s),
            _ => None,
        }
    }
}

/// Owner of the active modal.
#[derive(Clone)]
pub struct ModalHost {
    /// Shared slot.
    inner: Arc<Mutex<Slot>>,
    /// Countdown timing.
    settings: ConfirmationSettings,
}

impl ModalHost {
    /// Create an empty host.
    pub fn new(settings: ConfirmationSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slot::default())),
            settings,
        }
    }

    /// Mount `spec`, replacing (and stopping the ticker of) any active modal.
    ///
    /// A confirmation that requires a countdown starts ticking immediately.
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, spec: ModalSpec) {
        let mut slot = self.inner.lock();
        slot.generation += 1;
        let generation = slot.generation;
        let next = match spec {
            ModalSpec::PageCreate(m) => Active::Page(m),
            ModalSpec::Confirmation(modal) => {
                let gate = ConfirmationGate::opened(modal.danger_level, self.settings.countdown_secs);
                let ticker = gate
                    .is_awaiting()
                    .then(|| self.start_countdown(generation, &modal.id));
                debug!(
                    id = %modal.id,
                    danger = u8::from(modal.danger_level),
                    countdown = gate.countdown(),
                    "confirmation_opened"
                );
                Active::Confirm(Session {
                    modal,
                    gate,
                    ticker,
                })
            }
        };
        // Replaced modal (and its ticker) drops here.
        slot.active = Some(next);
    }

    /// Spawn the ticker driving the gate mounted at `generation`.
    fn start_countdown(&self, generation: u64, id: &str) -> Ticker {
        let weak: Weak<Mutex<Slot>> = Arc::downgrade(&self.inner);
        Ticker::start(id, self.settings.tick(), move || {
            let Some(inner) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut slot = inner.lock();
            if slot.generation != generation {
                return ControlFlow::Break(());
            }
            let Some(Active::Confirm(session)) = slot.active.as_mut() else {
                return ControlFlow::Break(());
            };
            let state = session.gate.tick();
            trace!(countdown = session.gate.countdown(), "confirmation_tick");
            if state == GateState::Ready {
                session.ticker = None;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Close the active modal without side effects.
    ///
    /// Returns false when no modal is mounted, or when the mounted
    /// confirmation was already accepted and its operation is running; such a
    /// modal closes when the operation settles.
    pub fn unload(&self) -> bool {
        let mut slot = self.inner.lock();
        match slot.active.as_mut() {
            None => return false,
            Some(Active::Confirm(session)) => {
                if session.gate.state() == GateState::Idle {
                    debug!(id = %session.modal.id, "cancel_ignored_confirming");
                    return false;
                }
                session.gate.cancel();
                session.ticker = None;
            }
            Some(Active::Page(_)) => {}
        }
        slot.active = None;
        trace!(generation = slot.generation, "modal_unloaded");
        true
    }

    /// Accept the active confirmation and hand out its operation, with the
    /// generation it was mounted at.
    ///
    /// Fails unless a confirmation is mounted, its gate is ready and its
    /// payload resolves. On success the gate leaves `Ready`, so the operation
    /// is handed out once and the modal can no longer be cancelled; settle it
    /// with [`ModalHost::finish_confirm`] or [`ModalHost::reopen`].
    pub(crate) fn begin_confirm(&self) -> Result<(u64, DestructiveOp), ConfirmOutcome> {
        let mut slot = self.inner.lock();
        let generation = slot.generation;
        let Some(Active::Confirm(session)) = slot.active.as_mut() else {
            return Err(ConfirmOutcome::NoConfirmation);
        };
        match session.gate.state() {
            GateState::Ready => {}
            GateState::AwaitingTimeout { remaining } => {
                return Err(ConfirmOutcome::NotReady { remaining });
            }
            GateState::Idle => return Err(ConfirmOutcome::InProgress),
        }
        let Some(op) = DestructiveOp::resolve(&session.modal) else {
            debug!(
                id = %session.modal.id,
                kind = session.modal.props.kind().as_str(),
                "confirmation_payload_mismatch"
            );
            return Err(ConfirmOutcome::Mismatch);
        };
        session.gate.confirm();
        Ok((generation, op))
    }

    /// Close the confirmation mounted at `generation` after its operation
    /// succeeded. Returns false when it was replaced in the meantime.
    pub(crate) fn finish_confirm(&self, generation: u64) -> bool {
        let mut slot = self.inner.lock();
        if slot.generation == generation && slot.session().is_some() {
            slot.active = None;
            true
        } else {
            false
        }
    }

    /// Make the confirmation mounted at `generation` confirmable again after
    /// its operation failed.
    pub(crate) fn reopen(&self, generation: u64) {
        let mut slot = self.inner.lock();
        if slot.generation != generation {
            return;
        }
        if let Some(Active::Confirm(session)) = slot.active.as_mut() {
            session.gate.reopen();
        }
    }

    /// True while an accepted confirmation's operation is running.
    pub fn is_confirming(&self) -> bool {
        self.inner
            .lock()
            .session()
            .is_some_and(|s| s.gate.state() == GateState::Idle)
    }

    /// Spec of the mounted modal.
    pub fn active(&self) -> Option<ModalSpec> {
        self.inner.lock().active.as_ref().map(Active::spec)
    }

    /// Gate state of the mounted confirmation.
    pub fn gate_state(&self) -> Option<GateState> {
        self.inner.lock().session().map(|s| s.gate.state())
    }

    /// Countdown of the mounted confirmation (`-1` once unlocked).
    pub fn countdown(&self) -> Option<i32> {
        self.inner.lock().session().map(|s| s.gate.countdown())
    }

    /// True when a mounted confirmation accepts a confirm.
    pub fn can_confirm(&self) -> bool {
        self.inner
            .lock()
            .session()
            .is_some_and(|s| s.gate.can_confirm())
    }

    /// Label of the confirm control.
    pub fn confirm_label(&self) -> Option<String> {
        self.inner.lock().session().map(|s| s.gate.confirm_label())
    }

    /// Visual severity of the mounted confirmation.
    pub fn severity(&self) -> Option<Severity> {
        self.inner
            .lock()
            .session()
            .map(|s| s.modal.danger_level.severity())
    }

    /// True while a countdown ticker is attached.
    pub fn is_ticking(&self) -> bool {
        self.inner
            .lock()
            .session()
            .and_then(|s| s.ticker.as_ref())
            .is_some_and(|t| !t.is_finished())
    }
}

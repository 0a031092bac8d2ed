//! Confirmation gate state machine.
//!
//! The gate holds back a destructive action until the user may confirm it.
//! Low danger levels unlock immediately; higher levels count down one step per
//! tick first. The gate only tracks state; ticking is driven from outside (see
//! the modal host).

use nebula_protocol::DangerLevel;

/// Countdown value reported once the gate no longer counts.
pub const NOT_COUNTING: i32 = -1;

/// States of the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No confirmation pending. A gate that was confirmed stays here while
    /// its operation runs.
    Idle,
    /// Counting down; confirm is disabled.
    AwaitingTimeout {
        /// Seconds left before confirm unlocks. Always positive.
        remaining: u32,
    },
    /// Confirm is enabled.
    Ready,
}

/// Per-invocation confirmation gate.
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    /// Current state.
    state: GateState,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationGate {
    /// An idle gate.
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
        }
    }

    /// A gate opened for `level` with a countdown of `countdown_secs`.
    pub fn opened(level: DangerLevel, countdown_secs: u32) -> Self {
        let mut g = Self::new();
        g.open(level, countdown_secs);
        g
    }

    /// Open the gate for a new request, replacing any previous one.
    ///
    /// Levels that do not require a countdown (or a zero countdown) enter
    /// `Ready` directly.
    pub fn open(&mut self, level: DangerLevel, countdown_secs: u32) {
        self.state = if level.requires_countdown() && countdown_secs > 0 {
            GateState::AwaitingTimeout {
                remaining: countdown_secs,
            }
        } else {
            GateState::Ready
        };
    }

    /// Advance the countdown by one tick and return the new state.
    ///
    /// Only `AwaitingTimeout` changes: the remaining time decreases by one and
    /// the gate becomes `Ready` once nothing remains.
    pub fn tick(&mut self) -> GateState {
        if let GateState::AwaitingTimeout { remaining } = self.state {
            self.state = match remaining.saturating_sub(1) {
                0 => GateState::Ready,
                left => GateState::AwaitingTimeout { remaining: left },
            };
        }
        self.state
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Seconds remaining, or [`NOT_COUNTING`] when not counting down.
    pub fn countdown(&self) -> i32 {
        match self.state {
            GateState::AwaitingTimeout { remaining } => i32::try_from(remaining).unwrap_or(i32::MAX),
            GateState::Idle | GateState::Ready => NOT_COUNTING,
        }
    }

    /// True while the countdown is running.
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, GateState::AwaitingTimeout { .. })
    }

    /// True when confirm is enabled.
    pub fn can_confirm(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Accept a confirmation. Returns false, leaving the state unchanged,
    /// unless the gate is `Ready`.
    pub fn confirm(&mut self) -> bool {
        if self.can_confirm() {
            self.state = GateState::Idle;
            true
        } else {
            false
        }
    }

    /// Return a confirmed gate to `Ready` after its operation failed, so the
    /// user can retry. Other states are left alone.
    pub fn reopen(&mut self) {
        if self.state == GateState::Idle {
            self.state = GateState::Ready;
        }
    }

    /// Cancel from any state.
    pub fn cancel(&mut self) {
        self.state = GateState::Idle;
    }

    /// Label for the confirm control.
    pub fn confirm_label(&self) -> String {
        match self.state {
            GateState::AwaitingTimeout { remaining } => format!("Wait {remaining} (s)"),
            GateState::Idle | GateState::Ready => "Remove".to_string(),
        }
    }
}

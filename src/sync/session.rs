//! Effect session lifecycle and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::fanout::FanOutReport;
use crate::error::{FleetError, FleetResult};

/// Cooperative stop request shared between a running effect and its controller.
///
/// A cancel raised while no session is running applies to the next session
/// started with the same handle. The engine clears the flag once a session
/// has stopped because of it.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running session to stop at its next tick boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(FleetError::Cancelled)` once a cancel has been requested.
    pub fn check(&self) -> FleetResult<()> {
        if self.is_cancelled() {
            Err(FleetError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Where an effect session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl SessionState {
    /// Idle -> Running -> Completed | Cancelled. Terminal states are final.
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Summary of a finished effect session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub effect: &'static str,
    pub state: SessionState,
    /// Ticks whose fan-out went out.
    pub ticks: u64,
    pub frames_sent: u64,
    pub failed_sends: u64,
    pub elapsed: Duration,
}

/// One run of a timed effect.
#[derive(Debug)]
pub(crate) struct EffectSession {
    effect: &'static str,
    state: SessionState,
    ticks: u64,
    frames_sent: u64,
    failed_sends: u64,
    started: Option<Instant>,
}

impl EffectSession {
    pub(crate) fn new(effect: &'static str) -> Self {
        Self {
            effect,
            state: SessionState::Idle,
            ticks: 0,
            frames_sent: 0,
            failed_sends: 0,
            started: None,
        }
    }

    fn transition(&mut self, to: SessionState) {
        debug_assert!(
            self.state.can_transition(to),
            "invalid session transition {:?} -> {:?}",
            self.state,
            to
        );
        if self.state.can_transition(to) {
            self.state = to;
        }
    }

    pub(crate) fn start(&mut self) {
        self.transition(SessionState::Running);
        self.started = Some(Instant::now());
        log::info!("{} started", self.effect);
    }

    /// Account for one tick's fan-out.
    pub(crate) fn record_tick(&mut self, report: &FanOutReport) {
        self.ticks += 1;
        self.frames_sent += report.succeeded.len() as u64;
        self.failed_sends += report.failed.len() as u64;
    }

    pub(crate) fn complete(&mut self) {
        self.transition(SessionState::Completed);
        log::info!(
            "{} completed after {} ticks ({} failed sends)",
            self.effect,
            self.ticks,
            self.failed_sends
        );
    }

    pub(crate) fn cancel(&mut self) {
        self.transition(SessionState::Cancelled);
        log::info!("{} cancelled after {} ticks", self.effect, self.ticks);
    }

    pub(crate) fn report(&self) -> SessionReport {
        SessionReport {
            effect: self.effect,
            state: self.state,
            ticks: self.ticks,
            frames_sent: self.frames_sent,
            failed_sends: self.failed_sends,
            elapsed: self.started.map(|t| t.elapsed()).unwrap_or_default(),
        }
    }
}

//! Fleet-wide synchronization engine.

use std::sync::{RwLock, RwLockReadGuard};
use std::time::Duration;

use super::convergence::{ConvergencePlan, Markers, changed_frames, markers_at};
use super::fanout::{self, FanOutReport};
use super::session::{CancelHandle, EffectSession, SessionReport};
use crate::device::{Device, Fleet, Mode};
use crate::error::{FleetError, FleetResult};
use crate::pattern::{brightness_frame, brightness_levels};
use crate::schema::{
    BrightnessParams, ConfigError, ConvergenceParams, EngineConfig, Frame, LoopPolicy, Movie,
    PatternSpec,
};
use crate::topology::Topology;
use crate::transmit::{Pacer, Transmitter, pause};

/// How a frame maps onto the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// One pixel per global index, split along the topology.
    Global,
    /// Device-sized frame, copied to every device.
    PerDevice,
}

impl Layout {
    fn for_frame_len(fleet: &Fleet, len: usize) -> FleetResult<Self> {
        let total = fleet.topology().total_led_count();
        if len == total {
            Ok(Self::Global)
        } else if fleet.devices().iter().all(|d| d.led_count() == len) {
            Ok(Self::PerDevice)
        } else {
            Err(FleetError::FrameShape { found: len, total })
        }
    }

    fn jobs<'f>(self, fleet: &'f Fleet, frame: &Frame) -> FleetResult<Vec<(&'f Device, Frame)>> {
        match self {
            Self::Global => {
                let parts = fleet.topology().split_frame(frame)?;
                Ok(fleet.devices().iter().zip(parts).collect())
            }
            Self::PerDevice => Ok(fleet
                .devices()
                .iter()
                .map(|device| (device, frame.clone()))
                .collect()),
        }
    }
}

fn reset_devices(devices: &[Device]) -> FanOutReport {
    fanout::lifecycle(devices, "reset", |device| {
        device.turn_off()?;
        device.turn_on()?;
        device.set_mode(Mode::Color)
    })
}

/// Drives timed effects across every device of a fleet.
///
/// Effects hold a read lock on the fleet for their whole run, so
/// [`rebuild`](Self::rebuild) waits until the running effect has finished
/// or been cancelled. Every effect assumes the fleet is already in
/// real-time mode (see [`turn_on_all`](Self::turn_on_all)).
///
/// A cancelled effect, or one aborted by an error, leaves the fleet reset
/// to its neutral colour mode.
#[derive(Debug)]
pub struct SyncEngine {
    fleet: RwLock<Fleet>,
    config: EngineConfig,
    transmitter: Transmitter,
    cancel: CancelHandle,
}

impl SyncEngine {
    pub fn new(fleet: Fleet, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Sync engine over {} devices ({} LEDs), protocol v{}",
            fleet.len(),
            fleet.topology().total_led_count(),
            config.protocol_version
        );
        Ok(Self {
            transmitter: Transmitter::new(config.protocol_version),
            fleet: RwLock::new(fleet),
            config,
            cancel: CancelHandle::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle for stopping the running effect from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn fleet(&self) -> FleetResult<RwLockReadGuard<'_, Fleet>> {
        self.fleet.read().map_err(|_| FleetError::LockPoisoned)
    }

    /// Snapshot of the current topology.
    pub fn topology(&self) -> FleetResult<Topology> {
        Ok(self.fleet()?.topology().clone())
    }

    pub fn device_count(&self) -> FleetResult<usize> {
        Ok(self.fleet()?.len())
    }

    /// Replace the fleet after a device joined or left.
    ///
    /// Blocks until no effect is running.
    pub fn rebuild(&self, devices: Vec<Device>) -> FleetResult<()> {
        let fleet = Fleet::new(devices)?;
        let mut guard = self.fleet.write().map_err(|_| FleetError::LockPoisoned)?;
        log::info!(
            "Fleet rebuilt: {} devices, {} LEDs",
            fleet.len(),
            fleet.topology().total_led_count()
        );
        *guard = fleet;
        Ok(())
    }

    /// Power every device on and switch it to real-time mode.
    pub fn turn_on_all(&self) -> FleetResult<FanOutReport> {
        let fleet = self.fleet()?;
        Ok(fanout::lifecycle(fleet.devices(), "turn on", |device| {
            device.turn_on()?;
            device.set_mode(Mode::Realtime)
        }))
    }

    pub fn turn_off_all(&self) -> FleetResult<FanOutReport> {
        let fleet = self.fleet()?;
        Ok(fanout::lifecycle(fleet.devices(), "turn off", |device| {
            device.turn_off()
        }))
    }

    /// Off, on, then colour mode on every device.
    pub fn reset_all(&self) -> FleetResult<FanOutReport> {
        let fleet = self.fleet()?;
        Ok(reset_devices(fleet.devices()))
    }

    /// Show one frame across the fleet.
    ///
    /// A frame covering the global index space is split along the topology;
    /// a frame matching every device's LED count is sent to each of them.
    pub fn broadcast_frame(&self, frame: &Frame) -> FleetResult<FanOutReport> {
        let fleet = self.fleet()?;
        let jobs = Layout::for_frame_len(&fleet, frame.len())?.jobs(&fleet, frame)?;
        Ok(fanout::frames(&self.transmitter, &jobs))
    }

    /// Play a movie on every device in lockstep.
    ///
    /// Frames are laid out as in [`broadcast_frame`](Self::broadcast_frame).
    /// Failed sends are counted and skipped. The last frame stays up on
    /// completion.
    pub fn play_movie(
        &self,
        movie: &Movie,
        frame_delay: Duration,
        policy: LoopPolicy,
    ) -> FleetResult<SessionReport> {
        let fleet = self.fleet()?;
        let layout = match movie.frame_len() {
            Some(len) => Some(Layout::for_frame_len(&fleet, len)?),
            None => None,
        };

        let mut session = EffectSession::new("movie");
        session.start();
        let outcome = match layout {
            Some(layout) => {
                self.drive_movie(&fleet, &mut session, movie, layout, frame_delay, policy)
            }
            None => Ok(()),
        };
        self.finish(&fleet, session, outcome)
    }

    /// Generate a pattern over the global index space and play it.
    pub fn play_pattern(
        &self,
        pattern: &PatternSpec,
        frame_delay: Duration,
        policy: LoopPolicy,
    ) -> FleetResult<SessionReport> {
        let total = self.fleet()?.topology().total_led_count();
        let movie = pattern.generate(total)?;
        self.play_movie(&movie, frame_delay, policy)
    }

    fn drive_movie(
        &self,
        fleet: &Fleet,
        session: &mut EffectSession,
        movie: &Movie,
        layout: Layout,
        frame_delay: Duration,
        policy: LoopPolicy,
    ) -> FleetResult<()> {
        let mut pacer = Pacer::new(frame_delay);
        let mut passes = 0;
        while policy.allows_pass(passes) {
            for frame in movie {
                self.cancel.check()?;
                let jobs = layout.jobs(fleet, frame)?;
                session.record_tick(&fanout::frames(&self.transmitter, &jobs));
                pacer.wait(&self.cancel)?;
            }
            passes += 1;
        }
        Ok(())
    }

    /// Run the two-front convergence effect.
    ///
    /// The fronts meet on `params.target` after half the duration. The
    /// meeting point is held for the configured hold time, then the fleet
    /// is reset.
    pub fn run_convergence(&self, params: &ConvergenceParams) -> FleetResult<SessionReport> {
        let fleet = self.fleet()?;
        let plan = ConvergencePlan::new(fleet.topology().total_led_count(), params)?;
        log::debug!(
            "Convergence on {} in {} steps of {:?}",
            plan.target(),
            plan.steps(),
            plan.tick_period()
        );

        let mut session = EffectSession::new("convergence");
        session.start();
        let outcome = self.drive_convergence(&fleet, &mut session, &plan);
        self.finish(&fleet, session, outcome)
    }

    fn drive_convergence(
        &self,
        fleet: &Fleet,
        session: &mut EffectSession,
        plan: &ConvergencePlan,
    ) -> FleetResult<()> {
        let topology = fleet.topology();
        let mut pacer = Pacer::new(plan.tick_period());
        let mut previous = Markers::new();

        for tick in 0..=plan.steps() {
            self.cancel.check()?;
            let current = markers_at(
                plan,
                topology,
                tick,
                self.config.lower_marker,
                self.config.upper_marker,
            )?;
            let jobs: Vec<(&Device, Frame)> =
                changed_frames(topology, &previous, &current, self.config.off)
                    .into_iter()
                    .filter_map(|(index, frame)| fleet.device(index).map(|d| (d, frame)))
                    .collect();
            log::trace!(
                "tick {tick}: fronts at {} and {}, {} devices updated",
                plan.lower(tick),
                plan.upper(tick),
                jobs.len()
            );
            session.record_tick(&fanout::frames(&self.transmitter, &jobs));
            previous = current;

            if tick < plan.steps() {
                pacer.wait(&self.cancel)?;
            }
        }

        pause(self.config.hold()?, &self.cancel)?;
        let sweep = reset_devices(fleet.devices());
        if !sweep.is_complete() {
            log::warn!("Reset after convergence missed {} devices", sweep.failed.len());
        }
        Ok(())
    }

    /// Run the converging-brightness effect.
    ///
    /// The target device stays at full brightness while the others start
    /// at the base level and ramp up in order of their distance from it.
    pub fn run_converging_brightness(
        &self,
        params: &BrightnessParams,
    ) -> FleetResult<SessionReport> {
        let fleet = self.fleet()?;
        params.validate(fleet.len())?;

        let mut session = EffectSession::new("converging brightness");
        session.start();
        let outcome = self.drive_brightness(&fleet, &mut session, params);
        self.finish(&fleet, session, outcome)
    }

    fn drive_brightness(
        &self,
        fleet: &Fleet,
        session: &mut EffectSession,
        params: &BrightnessParams,
    ) -> FleetResult<()> {
        let total_steps = params.total_steps();
        let mut pacer = Pacer::new(params.step_period()?);

        for step in 0..total_steps {
            self.cancel.check()?;
            let levels = brightness_levels(
                fleet.len(),
                params.target_device,
                params.base_brightness,
                step,
                total_steps,
            );
            let jobs: Vec<(&Device, Frame)> = fleet
                .devices()
                .iter()
                .zip(levels)
                .map(|(device, level)| {
                    let frame =
                        brightness_frame(device.led_count(), self.config.brightness_hue, level);
                    (device, frame)
                })
                .collect();
            session.record_tick(&fanout::frames(&self.transmitter, &jobs));
            pacer.wait(&self.cancel)?;
        }
        Ok(())
    }

    /// Close a session. Cancellation and errors both end in a reset sweep.
    fn finish(
        &self,
        fleet: &Fleet,
        mut session: EffectSession,
        outcome: FleetResult<()>,
    ) -> FleetResult<SessionReport> {
        match outcome {
            Ok(()) => {
                session.complete();
                Ok(session.report())
            }
            Err(err) if err.is_cancellation() => {
                self.cancel.clear();
                let sweep = reset_devices(fleet.devices());
                if !sweep.is_complete() {
                    log::warn!("Reset after cancel missed {} devices", sweep.failed.len());
                }
                session.cancel();
                Ok(session.report())
            }
            Err(err) => {
                log::error!("Effect aborted: {err}");
                let sweep = reset_devices(fleet.devices());
                if !sweep.is_complete() {
                    log::warn!("Reset after abort missed {} devices", sweep.failed.len());
                }
                Err(err)
            }
        }
    }
}

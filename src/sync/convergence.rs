//! Tick schedule of the two-front convergence effect.
//!
//! The lower front starts at global index 0, the upper at the last index.
//! Over `n` ticks both move towards the target, each covering its own
//! distance, so they land on it at the same tick:
//!
//! ```text
//! lower(k) = floor(target * k / n)
//! upper(k) = last - floor((last - target) * k / n)      k = 0..=n
//! ```
//!
//! `n` is the longer of the two distances, capped by the tick rate over
//! half the duration, and never below 1. A front with zero distance sits
//! on the target from tick 0.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::FleetResult;
use crate::schema::{ConfigError, ConvergenceParams, Frame, Pixel};
use crate::topology::{Location, Topology};

/// Pure description of where both fronts are at every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergencePlan {
    target: usize,
    last: usize,
    steps: u64,
    tick_period: Duration,
}

impl ConvergencePlan {
    pub fn new(total_leds: usize, params: &ConvergenceParams) -> Result<Self, ConfigError> {
        params.validate(total_leds)?;
        let target = params.target;
        let last = total_leds - 1;
        let distance = target.max(last - target) as u64;

        let half = params.duration_secs / 2.0;
        let by_rate = (half * params.tick_rate).round() as u64;
        let steps = distance.min(by_rate).max(1);
        let tick_period = params.half_duration()?.div_f64(steps as f64);

        Ok(Self {
            target,
            last,
            steps,
            tick_period,
        })
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of moves; the plan has `steps() + 1` ticks including tick 0.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    fn advance(&self, distance: usize, tick: u64) -> usize {
        let tick = tick.min(self.steps);
        (distance as u128 * u128::from(tick) / u128::from(self.steps)) as usize
    }

    /// Global index of the lower front at `tick`.
    pub fn lower(&self, tick: u64) -> usize {
        self.advance(self.target, tick)
    }

    /// Global index of the upper front at `tick`.
    pub fn upper(&self, tick: u64) -> usize {
        self.last - self.advance(self.last - self.target, tick)
    }

    /// True once both fronts stand on the target.
    pub fn converged(&self, tick: u64) -> bool {
        self.lower(tick) == self.target && self.upper(tick) == self.target
    }
}

/// Lit markers per device for one tick, keyed by device index.
pub(crate) type Markers = BTreeMap<usize, Vec<(usize, Pixel)>>;

/// Place both fronts of `tick` on the devices that hold them.
///
/// When both fronts share an LED the upper marker wins.
pub(crate) fn markers_at(
    plan: &ConvergencePlan,
    topology: &Topology,
    tick: u64,
    lower: Pixel,
    upper: Pixel,
) -> FleetResult<Markers> {
    let mut markers = Markers::new();
    for (global, pixel) in [(plan.lower(tick), lower), (plan.upper(tick), upper)] {
        let Location {
            device_index,
            local_index,
        } = topology.resolve(global)?;
        markers
            .entry(device_index)
            .or_default()
            .push((local_index, pixel));
    }
    Ok(markers)
}

/// Frames for the devices whose content changed between two ticks.
///
/// A device that lost its markers gets an all-off frame.
pub(crate) fn changed_frames(
    topology: &Topology,
    previous: &Markers,
    current: &Markers,
    off: Pixel,
) -> Vec<(usize, Frame)> {
    let touched: std::collections::BTreeSet<usize> =
        previous.keys().chain(current.keys()).copied().collect();

    touched
        .into_iter()
        .filter(|device| previous.get(device) != current.get(device))
        .filter_map(|device| {
            let len = topology.led_count(device)?;
            let mut frame = Frame::solid(len, off);
            for &(local, pixel) in current.get(&device).into_iter().flatten() {
                frame[local] = pixel;
            }
            Some((device, frame))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DeviceSpec;
    use proptest::prelude::*;

    fn params(target: usize, duration_secs: f32, tick_rate: f32) -> ConvergenceParams {
        ConvergenceParams {
            target,
            duration_secs,
            tick_rate,
        }
    }

    fn topology(counts: &[usize]) -> Topology {
        let specs: Vec<DeviceSpec> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| DeviceSpec::new(format!("d{i}"), n))
            .collect();
        Topology::build(&specs).unwrap()
    }

    #[test]
    fn test_one_led_per_tick_when_rate_allows() {
        let plan = ConvergencePlan::new(23, &params(11, 2.0, 1000.0)).unwrap();
        assert_eq!(plan.steps(), 11);
        assert_eq!(plan.lower(0), 0);
        assert_eq!(plan.upper(0), 22);
        assert_eq!(plan.lower(5), 5);
        assert_eq!(plan.upper(5), 17);
        assert!(plan.converged(11));
        assert!(!plan.converged(10));
    }

    #[test]
    fn test_rate_caps_steps() {
        let plan = ConvergencePlan::new(1000, &params(500, 2.0, 10.0)).unwrap();
        assert_eq!(plan.steps(), 10);
        assert!((plan.tick_period().as_secs_f64() - 0.1).abs() < 1e-6);
        assert_eq!(plan.lower(1), 50);
        assert_eq!(plan.upper(1), 999 - 49);
    }

    #[test]
    fn test_target_at_edge_has_one_static_front() {
        let plan = ConvergencePlan::new(10, &params(0, 1.0, 100.0)).unwrap();
        assert_eq!(plan.lower(0), 0);
        assert_eq!(plan.lower(plan.steps()), 0);
        assert_eq!(plan.upper(plan.steps()), 0);

        let plan = ConvergencePlan::new(1, &params(0, 0.0, 1.0)).unwrap();
        assert_eq!(plan.steps(), 1);
        assert!(plan.converged(0));
    }

    #[test]
    fn test_unrepresentable_duration_rejected() {
        assert_eq!(
            ConvergencePlan::new(23, &params(5, 1e30, 1e-28)),
            Err(ConfigError::InvalidDuration)
        );
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(matches!(
            ConvergencePlan::new(23, &params(23, 1.0, 10.0)),
            Err(ConfigError::TargetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_markers_share_device() {
        let topo = topology(&[10, 5, 8]);
        let plan = ConvergencePlan::new(23, &params(12, 2.0, 1000.0)).unwrap();
        let lower = Pixel::new(255, 150, 85, 0);
        let upper = Pixel::new(0, 0, 0, 255);

        let at_end = markers_at(&plan, &topo, plan.steps(), lower, upper).unwrap();
        assert_eq!(at_end.len(), 1);
        assert_eq!(at_end[&1], vec![(2, lower), (2, upper)]);
    }

    #[test]
    fn test_changed_frames_blank_vacated_device() {
        let topo = topology(&[10, 5, 8]);
        let on = Pixel::new(0, 255, 0, 0);
        let previous = Markers::from([(0, vec![(9, on)]), (2, vec![(0, on)])]);
        let current = Markers::from([(1, vec![(0, on)]), (2, vec![(0, on)])]);

        let frames = changed_frames(&topo, &previous, &current, Pixel::OFF);
        let devices: Vec<usize> = frames.iter().map(|(d, _)| *d).collect();
        assert_eq!(devices, vec![0, 1]);
        assert!(frames[0].1.lit_indices().is_empty());
        assert_eq!(frames[1].1.lit_indices(), vec![0]);
    }

    proptest! {
        #[test]
        fn prop_fronts_meet_at_same_tick(
            total in 1usize..500,
            target_frac in 0.0f64..1.0,
            rate in 1.0f32..500.0,
        ) {
            let target = ((total as f64 * target_frac) as usize).min(total - 1);
            let plan = ConvergencePlan::new(total, &params(target, 2.0, rate)).unwrap();
            let n = plan.steps();

            prop_assert_eq!(plan.lower(n), target);
            prop_assert_eq!(plan.upper(n), target);
            for k in 0..n {
                prop_assert!(plan.lower(k) <= plan.lower(k + 1));
                prop_assert!(plan.upper(k) >= plan.upper(k + 1));
                prop_assert!(plan.lower(k) <= target && plan.upper(k) >= target);
                if target > 0 {
                    prop_assert!(plan.lower(k) < target);
                }
                if target < total - 1 {
                    prop_assert!(plan.upper(k) > target);
                }
            }
        }
    }
}

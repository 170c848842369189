//! Brightness convergence towards a target device.

use crate::schema::{Frame, Pixel, Rgb};

/// Relative position of `device` on its side of `target`, in (0, 1].
///
/// The nearest neighbour of the target has the smallest value; the device
/// at the far end of a side has 1.
fn relative_position(device: usize, target: usize, device_count: usize) -> f32 {
    if device < target {
        (target - device) as f32 / target as f32
    } else {
        let side = device_count - 1 - target;
        (device - target) as f32 / side as f32
    }
}

/// Brightness of every device at `step` of `total_steps`.
///
/// The target is pinned at 1.0. Every other device sits at `base` until
/// overall progress passes its relative position, then ramps linearly
/// towards 1.0.
pub fn brightness_levels(
    device_count: usize,
    target: usize,
    base: f32,
    step: usize,
    total_steps: usize,
) -> Vec<f32> {
    let progress = if total_steps == 0 {
        0.0
    } else {
        step as f32 / total_steps as f32
    };

    (0..device_count)
        .map(|device| {
            if device == target {
                return 1.0;
            }
            let position = relative_position(device, target, device_count);
            if progress < position || position >= 1.0 {
                return base;
            }
            let ramp = (progress - position) / (1.0 - position);
            (base + (1.0 - base) * ramp).clamp(0.0, 1.0)
        })
        .collect()
}

/// Solid frame of `hue` scaled by `brightness`, white channel off.
pub fn brightness_frame(num_leds: usize, hue: Rgb, brightness: f32) -> Frame {
    Frame::solid(num_leds, Pixel::from_rgb(hue.scaled(brightness), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_target_pinned() {
        for step in 0..10 {
            let levels = brightness_levels(5, 2, 0.3, step, 10);
            assert_eq!(levels[2], 1.0);
            assert_eq!(levels.len(), 5);
        }
    }

    #[test]
    fn test_initial_step_is_base() {
        let levels = brightness_levels(5, 2, 0.5, 0, 10);
        assert_eq!(levels, vec![0.5, 0.5, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_near_devices_ramp_first() {
        // Five devices, target 2: neighbours sit at 0.5, far ends at 1.0.
        let levels = brightness_levels(5, 2, 0.5, 3, 4);
        assert!(approx(levels[1], 0.75));
        assert!(approx(levels[3], 0.75));
        assert_eq!(levels[0], 0.5);
        assert_eq!(levels[4], 0.5);
    }

    #[test]
    fn test_uneven_sides() {
        // Target 1 of 5: left side has one device, right side three.
        let levels = brightness_levels(5, 1, 0.0, 2, 3);
        let progress = 2.0 / 3.0;
        assert_eq!(levels[0], 0.0);
        assert!(approx(levels[2], (progress - 1.0 / 3.0) / (2.0 / 3.0)));
        assert_eq!(levels[3], 0.0);
    }

    #[test]
    fn test_single_device_and_zero_steps() {
        assert_eq!(brightness_levels(1, 0, 0.2, 0, 0), vec![1.0]);
        assert_eq!(brightness_levels(3, 0, 0.2, 0, 0), vec![1.0, 0.2, 0.2]);
    }

    #[test]
    fn test_brightness_frame_channels() {
        let frame = brightness_frame(3, Rgb::new(255, 223, 191), 0.5);
        assert_eq!(frame.as_slice(), &[Pixel::new(0, 127, 111, 95); 3]);
        assert_eq!(brightness_frame(2, Rgb::new(255, 223, 191), 1.0)[0], Pixel::new(0, 255, 223, 191));
    }
}

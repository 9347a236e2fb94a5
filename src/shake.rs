//! Shake detection over raw accelerometer samples
//!
//! A shake is a sample whose magnitude, minus gravity, goes over the
//! threshold. Emissions are debounced: after a shake, nothing is emitted
//! until the cooldown has passed.

use anyhow::Result;
use std::time::{Duration, Instant};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Net acceleration (m/s²) a sample must exceed to count as a shake
pub const DEFAULT_THRESHOLD: f32 = 12.0;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeConfig {
    pub threshold: f32,
    pub cooldown: Duration,
    pub gravity: f32,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl ShakeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(anyhow::anyhow!(
                "Shake threshold must be a positive number, got: {}",
                self.threshold
            ));
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(anyhow::anyhow!(
                "Gravity must be a non-negative number, got: {}",
                self.gravity
            ));
        }
        Ok(())
    }
}

/// One accelerometer reading, device axes, m/s²
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Build from a raw axis slice; `None` when fewer than three axes
    pub fn from_values(values: &[f32]) -> Option<Self> {
        match values {
            [x, y, z, ..] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn magnitude(&self) -> f32 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt() as f32
    }
}

/// A debounced shake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeEvent {
    /// Time of the sample that triggered the shake, on the detector's clock
    pub at: Duration,
    /// Acceleration with gravity removed
    pub net_acceleration: f32,
}

pub struct ShakeDetector {
    config: ShakeConfig,
    last_shake: Option<Duration>,
    epoch: Instant,
}

impl ShakeDetector {
    pub fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            last_shake: None,
            epoch: Instant::now(),
        }
    }

    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    /// Feed a sample stamped with the detector's own monotonic clock
    pub fn on_sample(&mut self, x: f32, y: f32, z: f32) -> Option<ShakeEvent> {
        let now = self.epoch.elapsed();
        self.on_sample_at(x, y, z, now)
    }

    /// Feed a raw axis slice as delivered by sensor callbacks
    pub fn on_values(&mut self, values: &[f32]) -> Option<ShakeEvent> {
        let sample = AccelSample::from_values(values)?;
        self.on_sample(sample.x, sample.y, sample.z)
    }

    /// Feed a sample with an explicit timestamp. Timestamps must come from a
    /// single monotonic clock.
    pub fn on_sample_at(&mut self, x: f32, y: f32, z: f32, at: Duration) -> Option<ShakeEvent> {
        let sample = AccelSample::new(x, y, z);
        if !sample.is_finite() {
            return None;
        }

        let net_acceleration = sample.magnitude() - self.config.gravity;
        if net_acceleration <= self.config.threshold {
            return None;
        }

        if let Some(last) = self.last_shake {
            // A timestamp older than the last shake is still inside the window
            if at.saturating_sub(last) < self.config.cooldown || at < last {
                return None;
            }
        }

        self.last_shake = Some(at);
        Some(ShakeEvent {
            at,
            net_acceleration,
        })
    }

    pub fn reset(&mut self) {
        self.last_shake = None;
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(ShakeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_resting_device_does_not_shake() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_sample_at(0.0, 0.0, 9.81, ms(0)).is_none());
        assert!(detector.on_sample_at(0.3, -0.2, 9.7, ms(50)).is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut detector = ShakeDetector::default();
        let edge = STANDARD_GRAVITY + DEFAULT_THRESHOLD;
        assert!(detector.on_sample_at(edge - 0.05, 0.0, 0.0, ms(0)).is_none());

        let event = detector.on_sample_at(edge + 0.5, 0.0, 0.0, ms(10)).unwrap();
        assert_eq!(event.at, ms(10));
        assert!((event.net_acceleration - 12.5).abs() < 0.01);
    }

    #[test]
    fn test_sub_threshold_grid_never_emits() {
        let mut detector = ShakeDetector::default();
        let mut t = 0;
        for x in [-12.0f32, -6.0, 0.0, 6.0, 12.0] {
            for y in [-12.0f32, 0.0, 12.0] {
                for z in [-9.8f32, 0.0, 9.8] {
                    let sample = AccelSample::new(x, y, z);
                    t += 2000;
                    if sample.magnitude() - STANDARD_GRAVITY <= DEFAULT_THRESHOLD {
                        assert!(detector.on_sample_at(x, y, z, ms(t)).is_none());
                    }
                }
            }
        }
    }

    #[test]
    fn test_cooldown_debounces() {
        let mut detector = ShakeDetector::default();
        let mut emitted = Vec::new();

        // A continuous violent shake sampled every 60ms for 5 seconds
        for i in 0..84u64 {
            let at = ms(i * 60);
            if let Some(event) = detector.on_sample_at(30.0, 5.0, 0.0, at) {
                emitted.push(event.at);
            }
        }

        assert_eq!(emitted.first(), Some(&ms(0)));
        for pair in emitted.windows(2) {
            assert!(pair[1] - pair[0] >= DEFAULT_COOLDOWN);
        }
        assert_eq!(emitted.len(), 5);
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_sample_at(25.0, 0.0, 0.0, ms(500)).is_some());
        assert!(detector.on_sample_at(25.0, 0.0, 0.0, ms(1499)).is_none());
        assert!(detector.on_sample_at(25.0, 0.0, 0.0, ms(1500)).is_some());
    }

    #[test]
    fn test_out_of_order_timestamp_ignored() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_sample_at(25.0, 0.0, 0.0, ms(5000)).is_some());
        assert!(detector.on_sample_at(25.0, 0.0, 0.0, ms(100)).is_none());
    }

    #[test]
    fn test_malformed_samples_ignored() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_sample_at(f32::NAN, 0.0, 0.0, ms(0)).is_none());
        assert!(detector.on_sample_at(f32::INFINITY, 0.0, 0.0, ms(0)).is_none());
        assert!(detector.on_values(&[30.0, 30.0]).is_none());
        assert!(detector.on_values(&[]).is_none());

        // Malformed input did not arm the cooldown
        assert!(detector.on_sample_at(30.0, 0.0, 0.0, ms(1)).is_some());
    }

    #[test]
    fn test_on_values_reads_first_three_axes() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_values(&[30.0, 0.0, 0.0, 99.0]).is_some());
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut detector = ShakeDetector::default();
        assert!(detector.on_sample_at(30.0, 0.0, 0.0, ms(0)).is_some());
        detector.reset();
        assert!(detector.on_sample_at(30.0, 0.0, 0.0, ms(10)).is_some());
    }

    #[test]
    fn test_config_validation() {
        assert!(ShakeConfig::default().validate().is_ok());

        let bad = ShakeConfig {
            threshold: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = ShakeConfig {
            threshold: f32::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}

//! Accelerometer feed
//!
//! Samples are produced on a background thread and run through a
//! [`ShakeDetector`] there; only the resulting shake events cross over to the
//! game thread, through the callback given at registration. The registration
//! is a guard: dropping it stops the feed and joins the thread.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::shake::{ShakeConfig, ShakeDetector, ShakeEvent};

/// Interval between replayed samples, close to a UI-rate sensor
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(60);

/// Parse one replay line into raw axis values.
///
/// Returns `None` for blank lines and `#` comments. A line that does not parse
/// as numbers yields an empty sample, which the detector ignores.
pub fn parse_sample_line(line: &str) -> Option<Vec<f32>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let values: Result<Vec<f32>, _> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse::<f32>)
        .collect();

    Some(values.unwrap_or_default())
}

pub fn parse_replay(contents: &str) -> Vec<Vec<f32>> {
    contents.lines().filter_map(parse_sample_line).collect()
}

pub fn load_replay(path: &Path) -> Result<Vec<Vec<f32>>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sensor replay: {}", path.display()))?;
    Ok(parse_replay(&contents))
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub interval: Duration,
    /// Start over at the end of the samples instead of going quiet
    pub repeat: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SAMPLE_INTERVAL,
            repeat: false,
        }
    }
}

/// Live listener registration; unregisters on drop
pub struct SensorSubscription {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SensorSubscription {
    /// Replay recorded samples at a fixed rate, reporting shakes to `on_shake`
    pub fn replay<F>(
        samples: Vec<Vec<f32>>,
        options: ReplayOptions,
        config: ShakeConfig,
        mut on_shake: F,
    ) -> Result<Self>
    where
        F: FnMut(ShakeEvent) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("sensor-replay".to_string())
            .spawn(move || {
                let mut detector = ShakeDetector::new(config);
                loop {
                    for values in &samples {
                        if thread_stop.load(Ordering::Relaxed) {
                            return;
                        }
                        if let Some(event) = detector.on_values(values) {
                            on_shake(event);
                        }
                        thread::sleep(options.interval);
                    }
                    if !options.repeat || samples.is_empty() {
                        return;
                    }
                }
            })
            .context("Failed to start sensor thread")?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the feed and wait for the sensor thread
    pub fn unregister(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const SHAKE: [f32; 3] = [30.0, 4.0, 0.0];
    const REST: [f32; 3] = [0.0, 0.0, 9.8];

    #[test]
    fn test_parse_sample_line() {
        assert_eq!(parse_sample_line("1.5,2,-3"), Some(vec![1.5, 2.0, -3.0]));
        assert_eq!(parse_sample_line("  1.5  2\t-3 "), Some(vec![1.5, 2.0, -3.0]));
        assert_eq!(parse_sample_line("1, 2, 3"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse_sample_line("# x,y,z"), None);
        assert_eq!(parse_sample_line("   "), None);
        assert_eq!(parse_sample_line("1,two,3"), Some(vec![]));
    }

    #[test]
    fn test_parse_replay_keeps_malformed_lines() {
        let contents = "# header\n0,0,9.8\n\nbad line\n30,0,0\n";
        let samples = parse_replay(contents);
        assert_eq!(samples.len(), 3);
        assert!(samples[1].is_empty());
    }

    #[test]
    fn test_replay_reports_debounced_shakes() {
        let (tx, rx) = mpsc::channel();
        let samples = vec![SHAKE.to_vec(), SHAKE.to_vec(), vec![], REST.to_vec()];
        let options = ReplayOptions {
            interval: Duration::from_millis(1),
            repeat: false,
        };

        let subscription =
            SensorSubscription::replay(samples, options, ShakeConfig::default(), move |event| {
                let _ = tx.send(event);
            })
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(first.net_acceleration > 12.0);

        subscription.unregister();
        // Second shake fell inside the cooldown; the sender is gone now
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_drop_stops_repeating_feed() {
        let (tx, rx) = mpsc::channel();
        let options = ReplayOptions {
            interval: Duration::from_millis(1),
            repeat: true,
        };
        let config = ShakeConfig {
            cooldown: Duration::ZERO,
            ..Default::default()
        };

        let subscription =
            SensorSubscription::replay(vec![SHAKE.to_vec()], options, config, move |event| {
                let _ = tx.send(event);
            })
            .unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(subscription.is_active());

        drop(subscription);
        while rx.try_recv().is_ok() {}
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_load_replay_missing_file() {
        assert!(load_replay(Path::new("/nonexistent/replay.csv")).is_err());
    }
}

//! JSON output for frontend integration
//!
//! When --json is enabled, every game event is emitted as a JSON line on
//! stdout and the styled terminal output is suppressed.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::photos::{PhotoEntry, Provenance, Relationship};
use crate::session::{GuessOutcome, SessionState};
use crate::shake::ShakeEvent;

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling import progress to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Photo now on display
    Photo {
        index: usize,
        photos: usize,
        id: u32,
        label: String,
        image: Option<String>,
        uploaded: bool,
    },
    /// Nothing to show until something is uploaded
    Empty,
    /// A guess was scored
    Guess {
        id: u32,
        guess: Relationship,
        actual: Relationship,
        correct: bool,
        score: u32,
        total: u32,
    },
    /// Photo skipped by a shake or the skip key
    Skipped { index: usize },
    /// Shake detected on the sensor feed
    Shake { at_ms: u64, net_acceleration: f32 },
    /// Photo added to the session
    Uploaded {
        id: u32,
        label: String,
        relationship: Relationship,
    },
    /// Upload dropped without adding a photo
    UploadFailed { path: String },
    /// Input that had no effect
    Ignored { input: String },
    /// Import progress
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// End of session
    Summary {
        score: u32,
        total: u32,
        skipped: usize,
        uploaded: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn photo(entry: &PhotoEntry, state: &SessionState, photos: usize) -> Self {
        Self::Photo {
            index: state.index,
            photos,
            id: entry.id,
            label: entry.label.clone(),
            image: entry.image.as_ref().map(|image| image.to_string()),
            uploaded: entry.provenance == Provenance::Uploaded,
        }
    }

    pub fn guess(outcome: &GuessOutcome, state: &SessionState) -> Self {
        Self::Guess {
            id: outcome.entry_id,
            guess: outcome.guess,
            actual: outcome.actual,
            correct: outcome.correct,
            score: state.score,
            total: state.total,
        }
    }

    pub fn shake(event: &ShakeEvent) -> Self {
        Self::Shake {
            at_ms: event.at.as_millis() as u64,
            net_acceleration: event.net_acceleration,
        }
    }

    pub fn uploaded(entry: &PhotoEntry) -> Self {
        Self::Uploaded {
            id: entry.id,
            label: entry.label.clone(),
            relationship: entry.relationship,
        }
    }

    /// Create and emit progress message (throttled to ~25 FPS)
    ///
    /// The final progress (current == total) is always emitted.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::ImageRef;
    use crate::session::Phase;
    use serde_json::Value;

    #[test]
    fn test_guess_message_shape() {
        let outcome = GuessOutcome {
            entry_id: 4,
            guess: Relationship::Dating,
            actual: Relationship::Siblings,
            correct: false,
        };
        let state = SessionState {
            index: 2,
            score: 3,
            total: 5,
            phase: Phase::Revealed { correct: false },
        };

        let value: Value = serde_json::to_value(JsonMessage::guess(&outcome, &state)).unwrap();
        assert_eq!(value["type"], "guess");
        assert_eq!(value["guess"], "dating");
        assert_eq!(value["actual"], "siblings");
        assert_eq!(value["correct"], false);
        assert_eq!(value["score"], 3);
        assert_eq!(value["total"], 5);
    }

    #[test]
    fn test_photo_message_for_upload() {
        let entry = PhotoEntry {
            id: 100,
            label: "Uploaded Couple".to_string(),
            relationship: Relationship::Dating,
            image: Some(ImageRef::new("upload_1_0.jpg")),
            provenance: Provenance::Uploaded,
        };

        let value =
            serde_json::to_value(JsonMessage::photo(&entry, &SessionState::new(), 11)).unwrap();
        assert_eq!(value["type"], "photo");
        assert_eq!(value["image"], "upload_1_0.jpg");
        assert_eq!(value["uploaded"], true);
        assert_eq!(value["photos"], 11);
    }

    #[test]
    fn test_shake_message_in_millis() {
        let event = ShakeEvent {
            at: std::time::Duration::from_millis(1500),
            net_acceleration: 20.5,
        };
        let value = serde_json::to_value(JsonMessage::shake(&event)).unwrap();
        assert_eq!(value["type"], "shake");
        assert_eq!(value["at_ms"], 1500);
        assert_eq!(value["net_acceleration"], 20.5);
    }

    #[test]
    fn test_unit_variant_tag() {
        let json = serde_json::to_string(&JsonMessage::Empty).unwrap();
        assert_eq!(json, r#"{"type":"empty"}"#);

        let json = serde_json::to_string(&JsonMessage::UploadFailed {
            path: "x.jpg".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"upload_failed""#));
    }
}

// Library exports for reuse by other frontends
pub mod cli;
pub mod config_file;
pub mod display;
pub mod haptics;
pub mod import;
pub mod json_output;
pub mod photos;
pub mod report;
pub mod sensor;
pub mod session;
pub mod shake;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use haptics::{Haptics, NoHaptics, TerminalBell};
pub use json_output::JsonMessage;
pub use photos::{ImageRef, PhotoEntry, PhotoRepository, Provenance, Relationship, Shuffler};
pub use sensor::{ReplayOptions, SensorSubscription};
pub use session::{GameEvent, GuessOutcome, Outcome, Phase, SessionController, SessionState};
pub use shake::{AccelSample, ShakeConfig, ShakeDetector, ShakeEvent};
pub use storage::{FsPhotoStore, PhotoStore};

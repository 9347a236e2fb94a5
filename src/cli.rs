use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::photos::Relationship;
use crate::session::GameEvent;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Tag {
    /// The people in the photo are a couple
    #[value(name = "dating")]
    Dating,
    /// The people in the photo are siblings
    #[value(name = "siblings")]
    Siblings,
}

impl From<Tag> for Relationship {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Dating => Relationship::Dating,
            Tag::Siblings => Relationship::Siblings,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sibling-or-dating",
    about = "Guess whether the people in a photo are dating or siblings",
    long_about = "
Sibling or Dating?

Each round shows a photo. Guess whether the people in it are a couple or
siblings, see the answer, then move on. Shaking the device skips a photo
without guessing; here the accelerometer is fed from a recorded sample file.

Keys (type and press Enter):
  s           guess siblings
  d           guess dating
  n           next photo (after a guess)
  k           skip photo (same as a shake)
  u TAG FILE  upload FILE tagged dating or siblings
  h           help
  q           quit

Example Usage:
  # Play with the built-in photos
  sibling-or-dating

  # Add your own photos, tagged as siblings
  sibling-or-dating --upload ~/Photos/us.jpg --upload ~/Photos/them.jpg --tag siblings

  # Import a whole folder of couples and replay recorded accelerometer data
  sibling-or-dating --import ~/Photos/couples --tag dating --sensor-replay shake.csv

  # Machine-readable output for a frontend
  sibling-or-dating --json --seed 42"
)]
pub struct Args {
    /// Image files to upload before the game starts (can be specified multiple times)
    #[arg(short = 'u', long = "upload", value_name = "FILE")]
    pub uploads: Vec<PathBuf>,

    /// Directory to import images from, recursively
    #[arg(long = "import", value_name = "DIR")]
    pub import_dir: Option<PathBuf>,

    /// Relationship tag for --upload and --import
    #[arg(short = 't', long = "tag", default_value = "dating")]
    pub tag: Tag,

    /// Comma-separated list of image extensions accepted by --import
    #[arg(long = "extensions", default_value = "jpg,jpeg,png,webp")]
    pub extensions_str: String,

    /// Directory where uploaded photos are stored
    #[arg(long = "storage-dir", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Start without the built-in placeholder photos
    #[arg(long = "no-built-ins")]
    pub no_built_ins: bool,

    /// Accelerometer samples to replay, one "x,y,z" line per sample
    #[arg(long = "sensor-replay", value_name = "FILE")]
    pub sensor_replay: Option<PathBuf>,

    /// Milliseconds between replayed samples
    #[arg(long = "sample-interval-ms", default_value = "60", value_name = "MS")]
    pub sample_interval_ms: u64,

    /// Loop the sensor replay until the game ends
    #[arg(long = "replay-loop")]
    pub replay_loop: bool,

    /// Net acceleration in m/s² above which a sample counts as a shake
    #[arg(long = "shake-threshold", default_value = "12.0", value_name = "M/S2")]
    pub shake_threshold: f32,

    /// Minimum milliseconds between two shakes
    #[arg(long = "shake-cooldown-ms", default_value = "1000", value_name = "MS")]
    pub shake_cooldown_ms: u64,

    /// Seed for the photo order (random when omitted)
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// JSON configuration file; command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Emit JSON lines instead of styled text
    #[arg(long = "json")]
    pub json: bool,

    /// Print a table of every round when the game ends
    #[arg(long = "report")]
    pub report: bool,

    /// Do not ring the terminal bell on guesses
    #[arg(long = "quiet-haptics")]
    pub quiet_haptics: bool,

    /// Number of parallel jobs for validating imports (0 = auto-detect)
    #[arg(short = 'j', long = "jobs", default_value = "0", value_name = "N")]
    pub jobs: usize,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Parse the extensions string into a vector
    pub fn parse_extensions(&self) -> Vec<String> {
        self.extensions_str
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn relationship(&self) -> Relationship {
        self.tag.into()
    }
}

/// A line typed by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Game(GameEvent),
    UploadFile {
        path: PathBuf,
        relationship: Relationship,
    },
    Help,
    Quit,
    Unknown(String),
}

/// Parse a line of player input
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match keyword.to_lowercase().as_str() {
        "s" | "siblings" => Command::Game(GameEvent::Guess(Relationship::Siblings)),
        "d" | "dating" => Command::Game(GameEvent::Guess(Relationship::Dating)),
        "n" | "next" => Command::Game(GameEvent::Next),
        "k" | "skip" => Command::Game(GameEvent::Shake),
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "u" | "upload" => {
            // Runs of whitespace between the tag and the path are allowed
            let rest = rest.trim_start();
            let (tag, path) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let path = path.trim();
            match tag.parse::<Relationship>() {
                Ok(relationship) if !path.is_empty() => Command::UploadFile {
                    path: PathBuf::from(path),
                    relationship,
                },
                _ => Command::Unknown(line.to_string()),
            }
        }
        _ => Command::Unknown(line.to_string()),
    }
}


// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            uploads: vec![],
            import_dir: None,
            tag: Tag::Dating,
            extensions_str: "jpg,jpeg,png,webp".to_string(),
            storage_dir: None,
            no_built_ins: false,
            sensor_replay: None,
            sample_interval_ms: 60,
            replay_loop: false,
            shake_threshold: 12.0,
            shake_cooldown_ms: 1000,
            seed: None,
            config_file: None,
            json: false,
            report: false,
            quiet_haptics: false,
            jobs: 0,
            verbose: false,
        }
    }
}

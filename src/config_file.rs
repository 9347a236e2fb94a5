use crate::cli::{Args, Tag};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Saved game settings
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: GameConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigJson {
    pub storage_dir: Option<String>,
    pub uploads: Option<Vec<String>>,
    pub import_dir: Option<String>,
    pub tag: Option<String>,
    pub extensions: Option<String>,
    pub no_built_ins: Option<bool>,
    pub sensor_replay: Option<String>,
    pub sample_interval_ms: Option<u64>,
    pub replay_loop: Option<bool>,
    pub shake_threshold: Option<f32>,
    pub shake_cooldown_ms: Option<u64>,
    pub seed: Option<u64>,
    pub json: Option<bool>,
    pub report: Option<bool>,
    pub quiet_haptics: Option<bool>,
    pub jobs: Option<usize>,
    pub verbose: Option<bool>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            let args_from_cli = std::env::args().collect::<Vec<_>>();
            self.merge_from_config(config.config, &args_from_cli)?;

            if self.verbose && !self.json {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    pub(crate) fn merge_from_config(
        &mut self,
        config: GameConfigJson,
        args_from_cli: &[String],
    ) -> Result<()> {
        let given = |flags: &[&str]| args_from_cli.iter().any(|a| flags.contains(&a.as_str()));

        // Paths - only apply if not specified on CLI
        if self.storage_dir.is_none() {
            self.storage_dir = config.storage_dir.map(PathBuf::from);
        }

        if self.uploads.is_empty() {
            if let Some(uploads) = config.uploads {
                self.uploads = uploads.into_iter().map(PathBuf::from).collect();
            }
        }

        if self.import_dir.is_none() {
            self.import_dir = config.import_dir.map(PathBuf::from);
        }

        if self.sensor_replay.is_none() {
            self.sensor_replay = config.sensor_replay.map(PathBuf::from);
        }

        if !given(&["-t", "--tag"]) {
            if let Some(tag) = config.tag {
                self.tag = match tag.to_lowercase().as_str() {
                    "dating" => Tag::Dating,
                    "siblings" => Tag::Siblings,
                    _ => {
                        return Err(anyhow::anyhow!(
                            "Invalid tag '{}' in config file. Valid tags: dating, siblings",
                            tag
                        ))
                    }
                };
            }
        }

        if self.extensions_str == "jpg,jpeg,png,webp" {
            if let Some(ext) = config.extensions {
                self.extensions_str = ext;
            }
        }

        // Numeric parameters - only apply if not specified on CLI
        if !given(&["--sample-interval-ms"]) {
            if let Some(interval) = config.sample_interval_ms {
                self.sample_interval_ms = interval;
            }
        }

        if !given(&["--shake-threshold"]) {
            if let Some(threshold) = config.shake_threshold {
                self.shake_threshold = threshold;
            }
        }

        if !given(&["--shake-cooldown-ms"]) {
            if let Some(cooldown) = config.shake_cooldown_ms {
                self.shake_cooldown_ms = cooldown;
            }
        }

        if self.seed.is_none() {
            self.seed = config.seed;
        }

        if self.jobs == 0 {
            if let Some(jobs) = config.jobs {
                self.jobs = jobs;
            }
        }

        // Boolean flags - only apply if currently false (default)
        if !self.no_built_ins {
            self.no_built_ins = config.no_built_ins.unwrap_or(false);
        }

        if !self.replay_loop {
            self.replay_loop = config.replay_loop.unwrap_or(false);
        }

        if !self.json {
            self.json = config.json.unwrap_or(false);
        }

        if !self.report {
            self.report = config.report.unwrap_or(false);
        }

        if !self.quiet_haptics {
            self.quiet_haptics = config.quiet_haptics.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        Ok(())
    }
}

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    for upload in &args.uploads {
        if !upload.is_file() {
            return Err(anyhow::anyhow!(
                "Upload is not a file: {}",
                upload.display()
            ));
        }
    }

    if let Some(dir) = &args.import_dir {
        if !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Import path is not a directory: {}",
                dir.display()
            ));
        }
        if args.parse_extensions().is_empty() {
            return Err(anyhow::anyhow!("No valid extensions specified"));
        }
    }

    if let Some(replay) = &args.sensor_replay {
        if !replay.is_file() {
            return Err(anyhow::anyhow!(
                "Sensor replay file does not exist: {}",
                replay.display()
            ));
        }
    }

    if args.sample_interval_ms == 0 || args.sample_interval_ms > 10_000 {
        return Err(anyhow::anyhow!(
            "Sample interval must be between 1 and 10000 ms, got: {}",
            args.sample_interval_ms
        ));
    }

    // Validate job count
    if args.jobs > 32 {
        return Err(anyhow::anyhow!(
            "Job count too high (max 32), got: {}",
            args.jobs
        ));
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified extensions
pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    if let Some(ext) = get_file_extension(path) {
        extensions.contains(&ext)
    } else {
        false
    }
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_has_valid_extension() {
        let extensions = vec!["jpg".to_string(), "png".to_string()];
        assert!(has_valid_extension(Path::new("a/b/photo.JPG"), &extensions));
        assert!(has_valid_extension(Path::new("photo.png"), &extensions));
        assert!(!has_valid_extension(Path::new("photo.gif"), &extensions));
        assert!(!has_valid_extension(Path::new("README"), &extensions));
    }

    #[test]
    fn test_validate_inputs() {
        assert!(validate_inputs(&Args::default()).is_ok());

        let args = Args {
            uploads: vec![PathBuf::from("/nonexistent/photo.jpg")],
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());

        let args = Args {
            sample_interval_ms: 0,
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());

        let args = Args {
            jobs: 64,
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());
    }
}

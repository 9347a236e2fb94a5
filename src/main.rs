use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use sibling_or_dating::cli::{parse_command, Args, Command};
use sibling_or_dating::display::{show_help, show_screen};
use sibling_or_dating::import::import_directory;
use sibling_or_dating::report::SessionReport;
use sibling_or_dating::sensor::load_replay;
use sibling_or_dating::shake::STANDARD_GRAVITY;
use sibling_or_dating::storage::default_storage_dir;
use sibling_or_dating::utils::{
    create_progress_bar, error_println, format_duration, validate_inputs, verbose_println,
    warn_println,
};
use sibling_or_dating::{
    FsPhotoStore, GameEvent, Haptics, JsonMessage, NoHaptics, Outcome, PhotoRepository,
    Relationship, ReplayOptions, SensorSubscription, SessionController, ShakeConfig, ShakeEvent,
    Shuffler, TerminalBell,
};

/// Everything the game thread reacts to
enum Input {
    Line(String),
    Shake(ShakeEvent),
    Eof,
}

/// Print the current screen, or the matching JSON message
fn show(session: &SessionController, json: bool) {
    if json {
        match session.current() {
            Some(photo) => JsonMessage::photo(photo, session.state(), session.len()).emit(),
            None => JsonMessage::Empty.emit(),
        }
    } else {
        show_screen(session);
    }
}

fn handle_upload(
    session: &mut SessionController,
    report: &mut SessionReport,
    path: &Path,
    relationship: Relationship,
    json: bool,
) {
    match session.upload_file(path, relationship) {
        Some(entry) => {
            report.uploaded += 1;
            if json {
                JsonMessage::uploaded(&entry).emit();
            } else {
                println!(
                    "{} {} as {}",
                    style("✓ Uploaded").green(),
                    path.display(),
                    style(relationship).bold()
                );
            }
        }
        None => {
            // Upload failures are not surfaced as errors
            report.failed_uploads += 1;
            if json {
                JsonMessage::UploadFailed {
                    path: path.display().to_string(),
                }
                .emit();
            }
        }
    }
}

fn handle_game_event(
    session: &mut SessionController,
    report: &mut SessionReport,
    event: GameEvent,
    from_sensor: bool,
    json: bool,
) {
    let shown = session.current().cloned();

    match session.dispatch(event) {
        Outcome::Guessed(outcome) => {
            if let Some(entry) = &shown {
                report.add_round(entry, &outcome);
            }
            if json {
                JsonMessage::guess(&outcome, session.state()).emit();
            }
        }
        Outcome::Skipped => {
            report.skipped += 1;
            if from_sensor {
                report.shakes += 1;
            }
            if json {
                JsonMessage::Skipped {
                    index: session.state().index,
                }
                .emit();
            }
        }
        Outcome::Advanced | Outcome::Uploaded(_) => {}
        Outcome::Ignored => return,
    }

    show(session, json);
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;
    validate_inputs(&args)?;

    let json = args.json;
    let verbose = args.verbose && !json;

    let shake_config = ShakeConfig {
        threshold: args.shake_threshold,
        cooldown: Duration::from_millis(args.shake_cooldown_ms),
        gravity: STANDARD_GRAVITY,
    };
    shake_config.validate()?;

    let storage_dir = args.storage_dir.clone().unwrap_or_else(default_storage_dir);

    if !json {
        println!("{}", style("Sibling or Dating?").bold().blue());
        println!("{}", style("Guess who's a couple and who's family").dim());
        println!();
    }

    if verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Storage: {}", storage_dir.display());
        println!("  Built-in photos: {}", !args.no_built_ins);
        println!("  Upload tag: {}", args.relationship());
        println!(
            "  Shake: > {} m/s², cooldown {}ms",
            shake_config.threshold, args.shake_cooldown_ms
        );
        match &args.sensor_replay {
            Some(path) => println!(
                "  Sensor replay: {} every {}ms{}",
                path.display(),
                args.sample_interval_ms,
                if args.replay_loop { " (looping)" } else { "" }
            ),
            None => println!("  Sensor replay: none"),
        }
        match args.seed {
            Some(seed) => println!("  Seed: {}", seed),
            None => println!("  Seed: random"),
        }
        println!();
    }

    let store = FsPhotoStore::open(&storage_dir)?;
    let repository = if args.no_built_ins {
        PhotoRepository::empty()
    } else {
        PhotoRepository::new()
    };
    let haptics: Box<dyn Haptics> = if args.quiet_haptics || json {
        Box::new(NoHaptics)
    } else {
        Box::new(TerminalBell)
    };

    let mut session =
        SessionController::new(repository, Box::new(store), haptics, Shuffler::new(args.seed))
            .with_verbose(verbose);
    let mut report = SessionReport::new();

    for path in &args.uploads {
        handle_upload(&mut session, &mut report, path, args.relationship(), json);
    }

    if let Some(dir) = &args.import_dir {
        let pb = if json {
            ProgressBar::hidden()
        } else {
            create_progress_bar(0)
        };
        pb.set_message("Importing photos");

        let summary = import_directory(
            &mut session,
            dir,
            args.relationship(),
            &args.parse_extensions(),
            args.jobs,
            verbose,
            |done, total| {
                if json {
                    JsonMessage::progress(done, total, "Importing photos");
                } else {
                    pb.set_length(total as u64);
                    pb.set_position(done as u64);
                }
            },
        )?;

        report.uploaded += summary.imported.len();
        report.failed_uploads += summary.rejected.len();
        if json {
            for entry in &summary.imported {
                JsonMessage::uploaded(entry).emit();
            }
        } else {
            pb.finish_with_message(format!(
                "✓ Imported {} of {} images",
                summary.imported.len(),
                summary.found
            ));
            for (path, reason) in &summary.rejected {
                verbose_println(verbose, &format!("Skipped {}: {}", path.display(), reason));
            }
            if !summary.rejected.is_empty() {
                warn_println(&format!(
                    "{} files could not be imported",
                    summary.rejected.len()
                ));
            }
        }
    }

    let (tx, rx) = mpsc::channel::<Input>();

    // Keyboard input; the thread is left blocked on stdin when the game ends
    let input_tx = tx.clone();
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(Input::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = input_tx.send(Input::Eof);
        })?;

    // Shakes are detected on the sensor thread and handed to the game thread
    let subscription = match &args.sensor_replay {
        Some(path) => {
            let samples = load_replay(path)?;
            verbose_println(verbose, &format!("Loaded {} sensor samples", samples.len()));
            let options = ReplayOptions {
                interval: Duration::from_millis(args.sample_interval_ms),
                repeat: args.replay_loop,
            };
            let shake_tx = tx.clone();
            Some(SensorSubscription::replay(
                samples,
                options,
                shake_config,
                move |event| {
                    let _ = shake_tx.send(Input::Shake(event));
                },
            )?)
        }
        None => None,
    };
    drop(tx);

    show(&session, json);

    while let Ok(input) = rx.recv() {
        match input {
            Input::Line(line) => match parse_command(&line) {
                Command::Game(event) => {
                    handle_game_event(&mut session, &mut report, event, false, json)
                }
                Command::UploadFile { path, relationship } => {
                    handle_upload(&mut session, &mut report, &path, relationship, json);
                    show(&session, json);
                }
                Command::Help => {
                    if !json {
                        show_help();
                    }
                }
                Command::Quit => break,
                Command::Unknown(line) => {
                    if line.is_empty() {
                        continue;
                    }
                    if json {
                        JsonMessage::Ignored { input: line }.emit();
                    } else {
                        error_println(&format!("Unknown command '{}' (h for help)", line));
                    }
                }
            },
            Input::Shake(event) => {
                if json {
                    JsonMessage::shake(&event).emit();
                }
                verbose_println(
                    verbose,
                    &format!("Shake: {:.1} m/s²", event.net_acceleration),
                );
                handle_game_event(&mut session, &mut report, GameEvent::Shake, true, json);
            }
            Input::Eof => break,
        }
    }

    if let Some(subscription) = subscription {
        subscription.unregister();
    }

    let duration = start_time.elapsed();
    let state = session.state();

    if json {
        JsonMessage::Summary {
            score: state.score,
            total: state.total,
            skipped: report.skipped,
            uploaded: report.uploaded,
            duration_secs: duration.as_secs_f64(),
        }
        .emit();
        return Ok(());
    }

    if args.report {
        report.print(duration);
    } else {
        println!();
        println!(
            "{} {} / {} in {}",
            style("Final score:").bold(),
            state.score,
            state.total,
            format_duration(duration)
        );
    }

    Ok(())
}

//! Terminal rendering of the game screen

use console::style;

use crate::photos::{PhotoEntry, Relationship};
use crate::session::{SessionController, SessionState};

pub const EMPTY_PLACEHOLDER: &str = "No photos yet! Add some with --upload or `u TAG FILE`.";

/// Score line, shown once at least one guess was made
pub fn score_line(state: &SessionState) -> Option<String> {
    (state.total > 0).then(|| format!("Score: {} / {}", state.score, state.total))
}

/// Headline and detail for a revealed result
pub fn result_banner(correct: bool, actual: Relationship) -> (&'static str, String) {
    let headline = if correct { "✅ Correct!" } else { "❌ Wrong!" };
    (headline, format!("They are {}!", actual))
}

fn placeholder_icon(relationship: Relationship) -> &'static str {
    match relationship {
        Relationship::Dating => "💑",
        Relationship::Siblings => "👫",
    }
}

fn show_photo(session: &SessionController, photo: &PhotoEntry) {
    match session.image_path(photo) {
        Some(path) => {
            println!("  🖼  {}", style(&photo.label).bold());
            println!("     {}", style(path.display()).dim());
        }
        None => {
            println!(
                "  {}  {}",
                placeholder_icon(photo.relationship),
                style(&photo.label).bold()
            );
            println!("     {}", style("📷 Photo placeholder").dim());
        }
    }
}

pub fn show_screen(session: &SessionController) {
    let state = session.state();

    println!();
    println!("{}", style("Siblings or Dating?").bold().magenta());
    if let Some(score) = score_line(state) {
        println!("{}", style(score).dim());
    }
    println!();

    let Some(photo) = session.current() else {
        println!("  {}", EMPTY_PLACEHOLDER);
        println!();
        return;
    };

    show_photo(session, photo);
    println!();

    match state.last_correct() {
        Some(correct) => {
            let (headline, detail) = result_banner(correct, photo.relationship);
            if correct {
                println!("  {}", style(headline).green().bold());
                println!("  {}", style(detail).green());
            } else {
                println!("  {}", style(headline).red().bold());
                println!("  {}", style(detail).red());
            }
            println!();
            println!("  {}", style("[n] Next →").bold());
        }
        None => {
            println!(
                "  {}   {}",
                style("[s] Siblings").green().bold(),
                style("[d] Dating").magenta().bold()
            );
        }
    }
    println!("  {}", style("📳 Shake to skip! ([k])").dim());
}

pub fn show_help() {
    println!("{}", style("Keys:").bold());
    println!("  s           guess siblings");
    println!("  d           guess dating");
    println!("  n           next photo (after a guess)");
    println!("  k           skip photo (same as a shake)");
    println!("  u TAG FILE  upload FILE tagged dating or siblings");
    println!("  q           quit");
}

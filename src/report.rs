//! End-of-session report
//!
//! Collects every scored round plus skip/upload counts and prints them as a
//! table when the game ends.

use prettytable::{format, Cell, Row, Table};
use std::time::Duration;
use strum::IntoEnumIterator;

use crate::photos::{PhotoEntry, Relationship};
use crate::session::GuessOutcome;
use crate::utils::format_duration;

#[derive(Debug, Clone)]
pub struct RoundEntry {
    pub label: String,
    pub uploaded: bool,
    pub guess: Relationship,
    pub actual: Relationship,
    pub correct: bool,
}

#[derive(Debug, Default)]
pub struct SessionReport {
    pub rounds: Vec<RoundEntry>,
    pub skipped: usize,
    pub shakes: usize,
    pub uploaded: usize,
    pub failed_uploads: usize,
}

impl SessionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_round(&mut self, entry: &PhotoEntry, outcome: &GuessOutcome) {
        self.rounds.push(RoundEntry {
            label: entry.label.clone(),
            uploaded: !entry.is_built_in(),
            guess: outcome.guess,
            actual: outcome.actual,
            correct: outcome.correct,
        });
    }

    pub fn score(&self) -> usize {
        self.rounds.iter().filter(|r| r.correct).count()
    }

    /// Percentage of correct guesses, 0 when nothing was guessed
    pub fn accuracy(&self) -> f64 {
        if self.rounds.is_empty() {
            0.0
        } else {
            (self.score() as f64 / self.rounds.len() as f64) * 100.0
        }
    }

    /// Correct/total for rounds whose answer was `relationship`
    pub fn breakdown(&self, relationship: Relationship) -> (usize, usize) {
        let rounds = self.rounds.iter().filter(|r| r.actual == relationship);
        let (correct, total) = rounds.fold((0, 0), |(c, t), r| (c + usize::from(r.correct), t + 1));
        (correct, total)
    }

    /// Print the complete report as a formatted table
    pub fn print(&self, duration: Duration) {
        println!("\n╔══════════════════════════════════════════════════════════╗");
        println!("║                      SESSION REPORT                      ║");
        println!("╚══════════════════════════════════════════════════════════╝\n");

        if !self.rounds.is_empty() {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BOX_CHARS);

            table.add_row(Row::new(vec![
                Cell::new("#"),
                Cell::new("Photo"),
                Cell::new("Source"),
                Cell::new("Guess"),
                Cell::new("Answer"),
                Cell::new("Result"),
            ]));

            for (i, round) in self.rounds.iter().enumerate() {
                table.add_row(Row::new(vec![
                    Cell::new(&(i + 1).to_string()),
                    Cell::new(&round.label),
                    Cell::new(if round.uploaded { "upload" } else { "built-in" }),
                    Cell::new(round.guess.as_ref()),
                    Cell::new(round.actual.as_ref()),
                    Cell::new(if round.correct { "✓" } else { "✗" }),
                ]));
            }

            table.printstd();
            println!();
        }

        let mut summary = Table::new();
        summary.set_format(*format::consts::FORMAT_CLEAN);
        summary.add_row(Row::new(vec![
            Cell::new("Score"),
            Cell::new(&format!(
                "{} / {} ({:.0}%)",
                self.score(),
                self.rounds.len(),
                self.accuracy()
            )),
        ]));
        for relationship in Relationship::iter() {
            let (correct, total) = self.breakdown(relationship);
            summary.add_row(Row::new(vec![
                Cell::new(&format!("  {}", relationship)),
                Cell::new(&format!("{} / {}", correct, total)),
            ]));
        }
        summary.add_row(Row::new(vec![
            Cell::new("Skipped"),
            Cell::new(&format!("{} ({} by shake)", self.skipped, self.shakes)),
        ]));
        summary.add_row(Row::new(vec![
            Cell::new("Uploads"),
            Cell::new(&format!(
                "{} added, {} failed",
                self.uploaded, self.failed_uploads
            )),
        ]));
        summary.add_row(Row::new(vec![
            Cell::new("Duration"),
            Cell::new(&format_duration(duration)),
        ]));
        summary.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::Provenance;

    fn round(actual: Relationship, guess: Relationship) -> (PhotoEntry, GuessOutcome) {
        let entry = PhotoEntry {
            id: 1,
            label: "Couple 1".to_string(),
            relationship: actual,
            image: None,
            provenance: Provenance::BuiltIn,
        };
        let outcome = GuessOutcome {
            entry_id: 1,
            guess,
            actual,
            correct: guess == actual,
        };
        (entry, outcome)
    }

    #[test]
    fn test_empty_report() {
        let report = SessionReport::new();
        assert_eq!(report.score(), 0);
        assert_eq!(report.accuracy(), 0.0);
        assert_eq!(report.breakdown(Relationship::Dating), (0, 0));
    }

    #[test]
    fn test_accuracy_and_breakdown() {
        let mut report = SessionReport::new();
        for (actual, guess) in [
            (Relationship::Dating, Relationship::Dating),
            (Relationship::Dating, Relationship::Siblings),
            (Relationship::Siblings, Relationship::Siblings),
        ] {
            let (entry, outcome) = round(actual, guess);
            report.add_round(&entry, &outcome);
        }

        assert_eq!(report.score(), 2);
        assert!((report.accuracy() - 66.67).abs() < 0.1);
        assert_eq!(report.breakdown(Relationship::Dating), (1, 2));
        assert_eq!(report.breakdown(Relationship::Siblings), (1, 1));
        assert!(!report.rounds[0].uploaded);
    }
}

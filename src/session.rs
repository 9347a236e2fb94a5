//! Game session: current photo, score and the guess/reveal cycle
//!
//! [`SessionState`] is a plain value with a pure transition function,
//! [`SessionState::apply`]. [`SessionController`] owns the state together with
//! the photo repository, its shuffled view, the photo store and the haptics,
//! and is the only thing that mutates them.

use std::path::{Path, PathBuf};

use crate::haptics::{Haptics, GUESS_PULSE};
use crate::photos::{ImageRef, PhotoEntry, PhotoRepository, Relationship, Shuffler};
use crate::storage::PhotoStore;
use crate::utils::verbose_println;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a guess, no result shown
    Guessing,
    /// Result shown, score already updated
    Revealed { correct: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub index: usize,
    pub score: u32,
    pub total: u32,
    pub phase: Phase,
}

/// Gameplay intents handled by the pure transition function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Guess(Relationship),
    Next,
    /// Shake to skip
    Skip,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            index: 0,
            score: 0,
            total: 0,
            phase: Phase::Guessing,
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, Phase::Revealed { .. })
    }

    /// Correctness of the last guess while its result is shown
    pub fn last_correct(&self) -> Option<bool> {
        match self.phase {
            Phase::Revealed { correct } => Some(correct),
            Phase::Guessing => None,
        }
    }

    /// Whether `intent` is valid in this state for a view of `len` photos.
    /// A skip over a single photo is accepted even though it lands on the
    /// same index.
    pub fn accepts(&self, intent: Intent, len: usize) -> bool {
        len > 0
            && matches!(
                (intent, self.phase),
                (Intent::Guess(_), Phase::Guessing)
                    | (Intent::Next, Phase::Revealed { .. })
                    | (Intent::Skip, Phase::Guessing)
            )
    }

    /// State after `intent`, given the entry on display and the view size.
    /// Intents that are not valid in the current state return it unchanged.
    pub fn apply(&self, intent: Intent, current: Option<&PhotoEntry>, len: usize) -> SessionState {
        if !self.accepts(intent, len) {
            return *self;
        }

        match (intent, self.phase) {
            (Intent::Guess(guess), Phase::Guessing) => {
                let Some(entry) = current else {
                    return *self;
                };
                let correct = guess == entry.relationship;
                SessionState {
                    score: self.score + u32::from(correct),
                    total: self.total + 1,
                    phase: Phase::Revealed { correct },
                    ..*self
                }
            }
            (Intent::Next, Phase::Revealed { .. }) => SessionState {
                index: (self.index + 1) % len,
                phase: Phase::Guessing,
                ..*self
            },
            (Intent::Skip, Phase::Guessing) => SessionState {
                index: (self.index + 1) % len,
                ..*self
            },
            _ => *self,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Guess(Relationship),
    Next,
    Shake,
    Upload {
        image: ImageRef,
        relationship: Relationship,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub entry_id: u32,
    pub guess: Relationship,
    pub actual: Relationship,
    pub correct: bool,
}

/// What a dispatched event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Guessed(GuessOutcome),
    Advanced,
    Skipped,
    Uploaded(PhotoEntry),
    Ignored,
}

pub struct SessionController {
    repository: PhotoRepository,
    view: Vec<PhotoEntry>,
    state: SessionState,
    shuffler: Shuffler,
    store: Box<dyn PhotoStore>,
    haptics: Box<dyn Haptics>,
    verbose: bool,
}

impl SessionController {
    /// Start a session: shuffle the repository and begin at the first photo
    pub fn new(
        repository: PhotoRepository,
        store: Box<dyn PhotoStore>,
        haptics: Box<dyn Haptics>,
        mut shuffler: Shuffler,
    ) -> Self {
        let view = repository.shuffled(&mut shuffler);
        Self {
            repository,
            view,
            state: SessionState::new(),
            shuffler,
            store,
            haptics,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Shuffled order in which photos are shown
    pub fn view(&self) -> &[PhotoEntry] {
        &self.view
    }

    pub fn repository(&self) -> &PhotoRepository {
        &self.repository
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Entry on display; `None` shows the empty-state placeholder
    pub fn current(&self) -> Option<&PhotoEntry> {
        if self.view.is_empty() {
            None
        } else {
            self.view.get(self.state.index % self.view.len())
        }
    }

    /// Stored image for an uploaded entry
    pub fn image_path(&self, entry: &PhotoEntry) -> Option<PathBuf> {
        entry
            .image
            .as_ref()
            .and_then(|image| self.store.resolve(image))
    }

    fn step(&mut self, intent: Intent) -> bool {
        let len = self.view.len();
        if !self.state.accepts(intent, len) {
            return false;
        }
        self.state = self.state.apply(intent, self.current(), len);
        true
    }

    /// Compare a guess with the current photo. Ignored while a result is
    /// shown or when there are no photos.
    pub fn guess(&mut self, guess: Relationship) -> Option<GuessOutcome> {
        let entry = self.current()?;
        let (entry_id, actual) = (entry.id, entry.relationship);

        if !self.step(Intent::Guess(guess)) {
            verbose_println(self.verbose, "Guess ignored: result already shown");
            return None;
        }

        self.haptics.pulse(GUESS_PULSE);
        Some(GuessOutcome {
            entry_id,
            guess,
            actual,
            correct: guess == actual,
        })
    }

    /// Hide the result and move to the next photo
    pub fn next(&mut self) -> bool {
        self.step(Intent::Next)
    }

    /// Move to the next photo without guessing; disabled while a result is shown
    pub fn skip(&mut self) -> bool {
        let skipped = self.step(Intent::Skip);
        if !skipped {
            verbose_println(self.verbose, "Skip ignored");
        }
        skipped
    }

    /// Add an already stored image to the session. Returns `None`, leaving
    /// the session untouched, when the reference does not resolve.
    pub fn upload(&mut self, image: ImageRef, relationship: Relationship) -> Option<PhotoEntry> {
        if self.store.resolve(&image).is_none() {
            verbose_println(
                self.verbose,
                &format!("Upload dropped: image '{}' is not in storage", image),
            );
            return None;
        }

        let entry = self.repository.add_photo(relationship, image);
        self.view = self.repository.shuffled(&mut self.shuffler);
        verbose_println(
            self.verbose,
            &format!(
                "Uploaded #{} as {} ({} photos)",
                entry.id,
                relationship,
                self.view.len()
            ),
        );
        Some(entry)
    }

    /// Store a file and upload it. Storage failures are swallowed.
    pub fn upload_file(&mut self, source: &Path, relationship: Relationship) -> Option<PhotoEntry> {
        match self.store.save(source) {
            Ok(image) => self.upload(image, relationship),
            Err(e) => {
                verbose_println(self.verbose, &format!("Upload failed: {:#}", e));
                None
            }
        }
    }

    pub fn dispatch(&mut self, event: GameEvent) -> Outcome {
        match event {
            GameEvent::Guess(guess) => self
                .guess(guess)
                .map(Outcome::Guessed)
                .unwrap_or(Outcome::Ignored),
            GameEvent::Next => {
                if self.next() {
                    Outcome::Advanced
                } else {
                    Outcome::Ignored
                }
            }
            GameEvent::Shake => {
                if self.skip() {
                    Outcome::Skipped
                } else {
                    Outcome::Ignored
                }
            }
            GameEvent::Upload {
                image,
                relationship,
            } => self
                .upload(image, relationship)
                .map(Outcome::Uploaded)
                .unwrap_or(Outcome::Ignored),
        }
    }
}

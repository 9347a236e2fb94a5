//! Photo entries and the repository that holds them
//!
//! The repository is a fixed built-in set followed by an append-only list of
//! uploads. Gameplay never reads it in order: it asks for a shuffled view.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// First identifier handed out to an uploaded entry. Built-ins stay below it.
pub const FIRST_UPLOAD_ID: u32 = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Relationship {
    Dating,
    Siblings,
}

impl Relationship {
    /// Label given to an uploaded photo with this tag
    pub fn upload_label(self) -> &'static str {
        match self {
            Relationship::Dating => "Uploaded Couple",
            Relationship::Siblings => "Uploaded Siblings",
        }
    }
}

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    BuiltIn,
    Uploaded,
}

/// Opaque reference to stored image bytes, as returned by a photo store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One guessable photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub id: u32,
    pub label: String,
    pub relationship: Relationship,
    /// `None` for built-in placeholders
    pub image: Option<ImageRef>,
    pub provenance: Provenance,
}

impl PhotoEntry {
    fn built_in(id: u32, label: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            id,
            label: label.into(),
            relationship,
            image: None,
            provenance: Provenance::BuiltIn,
        }
    }

    pub fn is_built_in(&self) -> bool {
        self.provenance == Provenance::BuiltIn
    }
}

/// Source of randomness for shuffled views
#[derive(Debug)]
pub struct Shuffler {
    rng: StdRng,
}

impl Shuffler {
    /// Deterministic order for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// OS-seeded order
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os(),
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Built-in entries plus uploads for the current session
#[derive(Debug, Clone)]
pub struct PhotoRepository {
    built_in: Vec<PhotoEntry>,
    uploaded: Vec<PhotoEntry>,
    next_id: u32,
}

impl PhotoRepository {
    /// Repository seeded with the ten built-in placeholder entries
    pub fn new() -> Self {
        Self::with_built_ins(default_built_ins())
    }

    /// Repository with no photos at all
    pub fn empty() -> Self {
        Self::with_built_ins(Vec::new())
    }

    pub fn with_built_ins(built_in: Vec<PhotoEntry>) -> Self {
        Self {
            built_in,
            uploaded: Vec::new(),
            next_id: FIRST_UPLOAD_ID,
        }
    }

    pub fn len(&self) -> usize {
        self.built_in.len() + self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Built-ins first, then uploads in upload order
    pub fn all(&self) -> Vec<PhotoEntry> {
        self.built_in
            .iter()
            .chain(self.uploaded.iter())
            .cloned()
            .collect()
    }

    pub fn uploaded(&self) -> &[PhotoEntry] {
        &self.uploaded
    }

    /// Append an uploaded entry and return it
    pub fn add_photo(&mut self, relationship: Relationship, image: ImageRef) -> PhotoEntry {
        let entry = PhotoEntry {
            id: self.next_id,
            label: relationship.upload_label().to_string(),
            relationship,
            image: Some(image),
            provenance: Provenance::Uploaded,
        };
        self.next_id += 1;
        self.uploaded.push(entry.clone());
        entry
    }

    pub fn shuffled(&self, shuffler: &mut Shuffler) -> Vec<PhotoEntry> {
        let mut photos = self.all();
        shuffler.shuffle(&mut photos);
        photos
    }
}

impl Default for PhotoRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn default_built_ins() -> Vec<PhotoEntry> {
    (1..=5)
        .flat_map(|n| {
            [
                PhotoEntry::built_in(n * 2 - 1, format!("Couple {}", n), Relationship::Dating),
                PhotoEntry::built_in(n * 2, format!("Siblings {}", n), Relationship::Siblings),
            ]
        })
        .collect()
}

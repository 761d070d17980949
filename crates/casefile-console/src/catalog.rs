#![forbid(unsafe_code)]

//! Subject catalog.
//!
//! The catalog is an ordered, immutable list of [`SubjectRecord`]s fixed at
//! boot. Construction enforces the two invariants the rest of the console
//! relies on: at least one subject, and unique subject ids (ids key the
//! persisted notes, so a duplicate would make two subjects share one note).

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One fictional case-file record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    /// Unique identifier, also the persisted-note key.
    pub subject_id: String,
    /// Display-only case number.
    pub case_id: String,
    /// Opaque reference to a portrait image.
    #[serde(alias = "portraitRef")]
    pub portrait: String,
    /// Ordered classification tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form risk rating.
    pub risk: String,
    /// Free-form case status.
    pub status: String,
    /// Summary paragraphs, in display order.
    #[serde(default)]
    pub summary: Vec<String>,
}

/// Errors raised while building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog has no subjects.
    Empty,
    /// Two records share a subject id.
    DuplicateSubject(String),
    /// The catalog file could not be read.
    Io(std::io::Error),
    /// The catalog file is not a valid JSON subject list.
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "catalog contains no subjects"),
            CatalogError::DuplicateSubject(id) => write!(f, "duplicate subject id: {id}"),
            CatalogError::Io(e) => write!(f, "failed to read catalog: {e}"),
            CatalogError::Parse(e) => write!(f, "failed to parse catalog: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Parse(e) => Some(e),
            CatalogError::Empty | CatalogError::DuplicateSubject(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

/// Ordered, non-empty list of subjects with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    subjects: Vec<SubjectRecord>,
}

impl Catalog {
    /// Validate and wrap a list of subjects.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Empty`] for an empty list,
    /// [`CatalogError::DuplicateSubject`] when an id repeats.
    pub fn new(subjects: Vec<SubjectRecord>) -> Result<Self, CatalogError> {
        if subjects.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(subjects.len());
        for subject in &subjects {
            if !seen.insert(subject.subject_id.as_str()) {
                return Err(CatalogError::DuplicateSubject(subject.subject_id.clone()));
            }
        }
        Ok(Self { subjects })
    }

    /// Parse a JSON array of subject records.
    ///
    /// # Errors
    ///
    /// Parse failures and the validation errors of [`Catalog::new`].
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let subjects: Vec<SubjectRecord> = serde_json::from_str(json)?;
        Self::new(subjects)
    }

    /// Load a JSON catalog file.
    ///
    /// # Errors
    ///
    /// I/O, parse, and validation errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The built-in demo catalog (two fictional subjects).
    #[must_use]
    pub fn demo() -> Self {
        Self {
            subjects: vec![
                SubjectRecord {
                    subject_id: "SUBJECT_001".into(),
                    case_id: "CF-0001".into(),
                    portrait: "img/rami.jpeg".into(),
                    tags: strings(&["INTRUSION", "MALWARE", "SOCIAL ENGINEERING"]),
                    risk: "HIGH".into(),
                    status: "CONTAINED".into(),
                    summary: strings(&[
                        "Unauthorized system access reported across multiple nodes.",
                        "Artifacts indicate credential stuffing + lateral movement.",
                        "Payload class: remote loader, staged execution, timed beacons.",
                        "Evidence preserved. Monitoring ongoing.",
                    ]),
                },
                SubjectRecord {
                    subject_id: "SUBJECT_002".into(),
                    case_id: "CF-0002".into(),
                    portrait: "img/bhav.jpeg".into(),
                    tags: strings(&["FRAUD", "DATA THEFT", "PHISHING"]),
                    risk: "MEDIUM".into(),
                    status: "UNDER REVIEW".into(),
                    summary: strings(&[
                        "Suspicious transactions correlated with compromised accounts.",
                        "Phishing infrastructure linked via repeated signature patterns.",
                        "Data exfil suspected from multiple endpoints.",
                        "Case escalated for deeper forensic review.",
                    ]),
                },
            ],
        }
    }

    /// Number of subjects (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Subject at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SubjectRecord> {
        self.subjects.get(index)
    }

    /// Subject at `index` modulo the catalog size.
    #[must_use]
    pub fn at_wrapped(&self, index: usize) -> &SubjectRecord {
        &self.subjects[index % self.subjects.len()]
    }

    /// Position of the subject with `subject_id`.
    #[must_use]
    pub fn position(&self, subject_id: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s.subject_id == subject_id)
    }

    /// Iterate subjects in order.
    pub fn iter(&self) -> impl Iterator<Item = &SubjectRecord> {
        self.subjects.iter()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#![forbid(unsafe_code)]

//! Default console text and small display helpers.
//!
//! [`render_default`] is pure: the same record always yields the same text,
//! which is what Reset restores and what tests compare against.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::SubjectRecord;

const SUMMARY_RULE: &str = "--- SUMMARY ----------------------------------------------------";
const NOTES_RULE: &str = "--- NOTES ------------------------------------------------------";

/// Default console text for a subject.
#[must_use]
pub fn render_default(subject: &SubjectRecord) -> String {
    let mut lines = vec![
        "> INIT CASEFILE_DB :: OK".to_string(),
        format!("> LOAD SUBJECT     :: {}", subject.subject_id),
        format!("> CASE ID          :: {}", subject.case_id),
        format!("> RISK             :: {}", subject.risk),
        format!("> STATUS           :: {}", subject.status),
        format!("> TAGS             :: {}", subject.tags.join(" | ")),
        String::new(),
        SUMMARY_RULE.to_string(),
    ];
    lines.extend(subject.summary.iter().map(|line| format!("- {line}")));
    lines.extend([
        String::new(),
        NOTES_RULE.to_string(),
        "* DEMO INTERFACE: fictional case content for UI/portfolio use.".to_string(),
        "* Use NEXT/PREV to cycle subjects.".to_string(),
        String::new(),
        "STATUS: READY".to_string(),
    ]);
    lines.join("\n")
}

/// 1-based position counter, e.g. `"01/02"`.
#[must_use]
pub fn subject_counter(index: usize, len: usize) -> String {
    format!("{:02}/{:02}", index + 1, len)
}

/// Cosmetic packet identifier shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketId(u16);

impl PacketId {
    /// Wrap a raw value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Draw a new id in `[0, 0xFFFF)`.
    #[must_use]
    pub fn roll(rng: &mut Lcg) -> Self {
        Self((rng.next_u64() % 0xFFFF) as u16)
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Small linear congruential generator for cosmetic randomness.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    /// Seeded generator.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Generator seeded from the wall clock.
    #[must_use]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED);
        Self(nanos)
    }

    /// Next pseudo-random value.
    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 16
    }
}

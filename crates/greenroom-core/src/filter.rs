//! Content safety filter.
//!
//! A pure whole-word membership test against an admin-managed denylist. An
//! empty denylist blocks nothing — fail-open is the deliberate policy, not
//! an accident. Matching is monotone: adding a word can only turn allowed
//! text into blocked text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// ─── Denylist entries ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Mild,
  Severe,
}

impl Severity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Mild => "mild",
      Self::Severe => "severe",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "mild" => Some(Self::Mild),
      "severe" => Some(Self::Severe),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFilterEntry {
  pub word:     String,
  pub severity: Severity,
  pub active:   bool,
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Return the first denylist word that appears as a whole word in `text`,
/// case-insensitively, or `None` if the text is clean.
///
/// Words are maximal runs of alphanumeric characters, so "class" never
/// matches a denylist entry "ass".
pub fn blocked_word<'a, I>(text: &str, denylist: I) -> Option<String>
where
  I: IntoIterator<Item = &'a str>,
{
  let words: HashSet<String> = text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(str::to_lowercase)
    .collect();

  denylist
    .into_iter()
    .map(str::trim)
    .filter(|entry| !entry.is_empty())
    .find(|entry| words.contains(&entry.to_lowercase()))
    .map(str::to_owned)
}

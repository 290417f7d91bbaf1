//! URL-safe slugs for public creator pages.
//!
//! The public URL shape `/creator/<slug>` is stable once issued, so slugs
//! are computed deterministically from the display name. Collision handling
//! (numeric suffix probing) lives with the approval flow, which has store
//! access; this module is pure.

use uuid::Uuid;

/// Lowercase the name, collapse every run of non-alphanumeric characters to
/// a single hyphen, and trim leading/trailing hyphens.
///
/// Returns `None` when nothing survives (empty or all-symbol input).
pub fn slugify(name: &str) -> Option<String> {
  let mut out = String::with_capacity(name.len());
  let mut gap = false;

  for c in name.chars() {
    if c.is_alphanumeric() {
      if gap && !out.is_empty() {
        out.push('-');
      }
      gap = false;
      out.extend(c.to_lowercase());
    } else {
      gap = true;
    }
  }

  if out.is_empty() { None } else { Some(out) }
}

/// Slug for a profile, falling back to the identity's id when the name
/// yields nothing.
pub fn slug_or_id(name: &str, id: Uuid) -> String {
  slugify(name).unwrap_or_else(|| id.hyphenated().to_string())
}

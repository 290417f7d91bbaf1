//! Login credentials.
//!
//! The login doubles as the identity's email address — it is the one place
//! the workflow resolves a recipient address from, and it is read *before*
//! any erasure so a rejection mail can still reach the candidate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
  /// Email address used to sign in and to receive transactional mail.
  pub login:         String,
  pub profile_id:    Uuid,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::CurationStore::add_credential`].
#[derive(Debug, Clone)]
pub struct NewCredential {
  pub login:         String,
  pub profile_id:    Uuid,
  pub password_hash: String,
}

//! Stored media artifacts and the storage abstraction.
//!
//! No binary data lives in the database; rows hold a [`MediaRef`] pointing
//! at an object in a bucket. The backing store is anything implementing
//! [`MediaStore`] — a filesystem directory in practice, an in-memory map in
//! tests.

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A stored artifact: where it lives and how to verify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
  pub bucket:       String,
  pub path:         String,
  /// Retrievable URL handed to clients; stable once issued.
  pub url:          String,
  /// SHA-256 hex digest of the stored bytes.
  pub content_hash: String,
  pub media_type:   String,
  pub byte_size:    u64,
}

/// Abstraction over object storage.
///
/// `store` persists bytes and returns a retrievable reference; `delete` is
/// idempotent — removing an object that is already gone is not an error.
pub trait MediaStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn store<'a>(
    &'a self,
    bucket: &'a str,
    path: &'a str,
    bytes: Bytes,
    media_type: &'a str,
  ) -> impl Future<Output = Result<MediaRef, Self::Error>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    bucket: &'a str,
    path: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

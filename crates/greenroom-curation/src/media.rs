//! Media store implementations.
//!
//! [`FsMediaStore`] keeps artifacts under a root directory, one subdirectory
//! per bucket; no binary data ever enters the database. [`MemMediaStore`] is
//! the in-memory fake the workflow tests run against.

use std::{
  collections::HashMap,
  io,
  path::PathBuf,
  sync::Mutex,
};

use bytes::Bytes;
use greenroom_core::media::{MediaRef, MediaStore};
use sha2::{Digest as _, Sha256};

fn media_ref(
  bucket: &str,
  path: &str,
  base_url: &str,
  bytes: &Bytes,
  media_type: &str,
) -> MediaRef {
  MediaRef {
    bucket:       bucket.to_owned(),
    path:         path.to_owned(),
    url:          format!("{}/{bucket}/{path}", base_url.trim_end_matches('/')),
    content_hash: hex::encode(Sha256::digest(bytes)),
    media_type:   media_type.to_owned(),
    byte_size:    bytes.len() as u64,
  }
}

// ─── Filesystem store ────────────────────────────────────────────────────────

/// Artifacts on local disk, served from `base_url`.
pub struct FsMediaStore {
  root:     PathBuf,
  base_url: String,
}

impl FsMediaStore {
  pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
    Self { root: root.into(), base_url: base_url.into() }
  }

  fn full_path(&self, bucket: &str, path: &str) -> PathBuf {
    self.root.join(bucket).join(path)
  }
}

impl MediaStore for FsMediaStore {
  type Error = io::Error;

  async fn store(
    &self,
    bucket: &str,
    path: &str,
    bytes: Bytes,
    media_type: &str,
  ) -> io::Result<MediaRef> {
    let full = self.full_path(bucket, path);
    if let Some(parent) = full.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&full, &bytes).await?;

    Ok(media_ref(bucket, path, &self.base_url, &bytes, media_type))
  }

  async fn delete(&self, bucket: &str, path: &str) -> io::Result<()> {
    match tokio::fs::remove_file(self.full_path(bucket, path)).await {
      Ok(()) => Ok(()),
      // idempotent: a repeated cleanup of the same artifact is not an error
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e),
    }
  }
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// Objects in a map — useful for testing.
#[derive(Default)]
pub struct MemMediaStore {
  objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemMediaStore {
  pub fn new() -> Self { Self::default() }

  pub fn contains(&self, bucket: &str, path: &str) -> bool {
    self
      .objects
      .lock()
      .expect("media lock")
      .contains_key(&(bucket.to_owned(), path.to_owned()))
  }

  pub fn object_count(&self) -> usize {
    self.objects.lock().expect("media lock").len()
  }
}

impl MediaStore for MemMediaStore {
  type Error = std::convert::Infallible;

  async fn store(
    &self,
    bucket: &str,
    path: &str,
    bytes: Bytes,
    media_type: &str,
  ) -> Result<MediaRef, Self::Error> {
    let reference =
      media_ref(bucket, path, "http://media.local", &bytes, media_type);
    self
      .objects
      .lock()
      .expect("media lock")
      .insert((bucket.to_owned(), path.to_owned()), bytes);
    Ok(reference)
  }

  async fn delete(&self, bucket: &str, path: &str) -> Result<(), Self::Error> {
    self
      .objects
      .lock()
      .expect("media lock")
      .remove(&(bucket.to_owned(), path.to_owned()));
    Ok(())
  }
}

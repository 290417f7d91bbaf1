//! [`SqliteStore`] — the SQLite implementation of [`CurationStore`].
//!
//! Every state transition is a single conditional `UPDATE … WHERE
//! onboarding_status = <expected>`; the affected-row count is the truth
//! about who won a race.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use greenroom_core::{
  credential::{Credential, NewCredential},
  filter::{ContentFilterEntry, Severity},
  media::MediaRef,
  message::{Message, NewMessage},
  profile::{NewProfile, OnboardingStatus, Profile, SubmissionDraft, Visibility},
  slot::TemplateSlot,
  song::{NewSong, Song},
  store::{CurationStore, ProfileQuery},
};

use crate::{
  Error, Result,
  encode::{
    RawCredential, RawMessage, RawProfile, RawSlot, RawSong, encode_dt,
    encode_media, encode_social, encode_strings, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const PROFILE_COLS: &str = "profile_id, display_name, bio, tech_stack, \
   social_links, avatar, visibility, onboarding_status, role, slug, \
   terms_accepted_at, created_at, updated_at";

fn raw_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    profile_id:        row.get(0)?,
    display_name:      row.get(1)?,
    bio:               row.get(2)?,
    tech_stack:        row.get(3)?,
    social_links:      row.get(4)?,
    avatar:            row.get(5)?,
    visibility:        row.get(6)?,
    onboarding_status: row.get(7)?,
    role:              row.get(8)?,
    slug:              row.get(9)?,
    terms_accepted_at: row.get(10)?,
    created_at:        row.get(11)?,
    updated_at:        row.get(12)?,
  })
}

const SONG_COLS: &str =
  "song_id, owner_id, title, genres, audio, is_probe, price_cents, created_at";

fn raw_song(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSong> {
  Ok(RawSong {
    song_id:     row.get(0)?,
    owner_id:    row.get(1)?,
    title:       row.get(2)?,
    genres:      row.get(3)?,
    audio:       row.get(4)?,
    is_probe:    row.get(5)?,
    price_cents: row.get(6)?,
    created_at:  row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A greenroom curation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CurationStore impl ──────────────────────────────────────────────────────

impl CurationStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile(&self, input: NewProfile) -> Result<Profile> {
    let now = Utc::now();
    let profile = Profile {
      profile_id:        Uuid::new_v4(),
      display_name:      input.display_name,
      bio:               None,
      tech_stack:        Vec::new(),
      social_links:      Default::default(),
      avatar:            None,
      visibility:        Visibility::Pending,
      onboarding_status: OnboardingStatus::Pending,
      role:              input.role,
      slug:              None,
      terms_accepted_at: None,
      created_at:        now,
      updated_at:        now,
    };

    let id_str   = encode_uuid(profile.profile_id);
    let name     = profile.display_name.clone();
    let role_str = profile.role.as_str().to_owned();
    let at_str   = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             profile_id, display_name, role, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, role_str, at_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PROFILE_COLS} FROM profiles WHERE profile_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_profile,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn get_profile_by_slug(&self, slug: &str) -> Result<Option<Profile>> {
    let slug = slug.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLS} FROM profiles WHERE slug = ?1"),
              rusqlite::params![slug],
              raw_profile,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self, query: &ProfileQuery) -> Result<Vec<Profile>> {
    let visibility = query.visibility.map(|v| v.as_str().to_owned());
    let status     = query.status.map(|s| s.as_str().to_owned());
    let role       = query.role.map(|r| r.as_str().to_owned());
    let limit_val  = query.limit.unwrap_or(100) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; parameter positions are fixed.
        let mut conds: Vec<&'static str> = vec![];
        if visibility.is_some() {
          conds.push("visibility = ?1");
        }
        if status.is_some() {
          conds.push("onboarding_status = ?2");
        }
        if role.is_some() {
          conds.push("role = ?3");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {PROFILE_COLS} FROM profiles
           {where_clause}
           ORDER BY created_at
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              visibility.as_deref(),
              status.as_deref(),
              role.as_deref(),
              limit_val,
              offset_val,
            ],
            raw_profile,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn slug_in_use(&self, slug: &str) -> Result<bool> {
    let slug = slug.to_owned();

    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM profiles WHERE slug = ?1 AND visibility = 'public'",
              rusqlite::params![slug],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(taken)
  }

  async fn apply_submission(
    &self,
    id: Uuid,
    draft: SubmissionDraft,
  ) -> Result<bool> {
    let id_str     = encode_uuid(id);
    let name       = draft.display_name;
    let bio        = draft.bio;
    let tech_str   = encode_strings(&draft.tech_stack)?;
    let social_str = encode_social(&draft.social_links)?;
    let avatar_str = draft.avatar.as_ref().map(encode_media).transpose()?;
    let slug       = draft.slug;
    let terms_str  = encode_dt(draft.terms_accepted_at);
    let now_str    = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             display_name = ?2, bio = ?3, tech_stack = ?4, social_links = ?5,
             avatar = ?6, slug = ?7, terms_accepted_at = ?8, updated_at = ?9
           WHERE profile_id = ?1
             AND onboarding_status IN ('pending', 'submitted')",
          rusqlite::params![
            id_str, name, bio, tech_str, social_str, avatar_str, slug,
            terms_str, now_str,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn mark_submitted(&self, id: Uuid) -> Result<bool> {
    let id_str  = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             onboarding_status = 'submitted', visibility = 'pending',
             updated_at = ?2
           WHERE profile_id = ?1
             AND onboarding_status IN ('pending', 'submitted')",
          rusqlite::params![id_str, now_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn approve_profile(&self, id: Uuid, slug: &str) -> Result<bool> {
    let id_str  = encode_uuid(id);
    let slug    = slug.to_owned();
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             role = 'creator', visibility = 'public',
             onboarding_status = 'approved', slug = ?2, updated_at = ?3
           WHERE profile_id = ?1 AND onboarding_status = 'submitted'",
          rusqlite::params![id_str, slug, now_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn reject_profile(&self, id: Uuid) -> Result<bool> {
    let id_str  = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             display_name = '', bio = NULL, tech_stack = '[]',
             social_links = '{}', avatar = NULL, slug = NULL,
             role = 'user', visibility = 'rejected',
             onboarding_status = 'rejected', updated_at = ?2
           WHERE profile_id = ?1 AND onboarding_status = 'submitted'",
          rusqlite::params![id_str, now_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn revert_to_pending(&self, id: Uuid) -> Result<bool> {
    let id_str  = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET onboarding_status = 'pending', updated_at = ?2
           WHERE profile_id = ?1 AND onboarding_status = 'submitted'",
          rusqlite::params![id_str, now_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Songs ─────────────────────────────────────────────────────────────────

  async fn add_song(&self, input: NewSong) -> Result<Song> {
    let song = Song {
      song_id:     Uuid::new_v4(),
      owner_id:    input.owner_id,
      title:       input.title,
      genres:      input.genres,
      audio:       input.audio,
      is_probe:    input.is_probe,
      price_cents: input.price_cents,
      created_at:  Utc::now(),
    };

    let song_id_str  = encode_uuid(song.song_id);
    let owner_id_str = encode_uuid(song.owner_id);
    let title        = song.title.clone();
    let genres_str   = encode_strings(&song.genres)?;
    let audio_str    = encode_media(&song.audio)?;
    let is_probe     = song.is_probe;
    let price_cents  = song.price_cents;
    let at_str       = encode_dt(song.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO songs (
             song_id, owner_id, title, genres, audio, is_probe, price_cents,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            song_id_str,
            owner_id_str,
            title,
            genres_str,
            audio_str,
            is_probe,
            price_cents,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(song)
  }

  async fn list_songs(
    &self,
    owner: Uuid,
    include_probes: bool,
  ) -> Result<Vec<Song>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawSong> = self
      .conn
      .call(move |conn| {
        let sql = if include_probes {
          format!(
            "SELECT {SONG_COLS} FROM songs WHERE owner_id = ?1
             ORDER BY created_at"
          )
        } else {
          format!(
            "SELECT {SONG_COLS} FROM songs
             WHERE owner_id = ?1 AND is_probe = 0
             ORDER BY created_at"
          )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], raw_song)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSong::into_song).collect()
  }

  async fn count_songs(&self, owner: Uuid) -> Result<usize> {
    let owner_str = encode_uuid(owner);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM songs WHERE owner_id = ?1",
          rusqlite::params![owner_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as usize)
  }

  async fn set_probe_flag(&self, owner: Uuid, is_probe: bool) -> Result<usize> {
    let owner_str = encode_uuid(owner);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE songs SET is_probe = ?2
           WHERE owner_id = ?1 AND is_probe != ?2",
          rusqlite::params![owner_str, is_probe],
        )?)
      })
      .await?;

    Ok(changed)
  }

  async fn delete_songs(&self, owner: Uuid) -> Result<Vec<Song>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawSong> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SONG_COLS} FROM songs WHERE owner_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], raw_song)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        conn.execute(
          "DELETE FROM songs WHERE owner_id = ?1",
          rusqlite::params![owner_str],
        )?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSong::into_song).collect()
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn insert_message(&self, input: NewMessage) -> Result<Message> {
    let message = Message {
      message_id:   Uuid::new_v4(),
      recipient_id: input.recipient_id,
      sender_id:    input.sender_id,
      kind:         input.kind,
      subject:      input.subject,
      body:         input.body,
      read:         false,
      related_slug: input.related_slug,
      created_at:   Utc::now(),
    };

    let message_id_str   = encode_uuid(message.message_id);
    let recipient_id_str = encode_uuid(message.recipient_id);
    let sender_id_str    = message.sender_id.map(encode_uuid);
    let kind_str         = message.kind.as_str().to_owned();
    let subject          = message.subject.clone();
    let body             = message.body.clone();
    let related_slug     = message.related_slug.clone();
    let at_str           = encode_dt(message.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (
             message_id, recipient_id, sender_id, kind, subject, body,
             related_slug, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            message_id_str,
            recipient_id_str,
            sender_id_str,
            kind_str,
            subject,
            body,
            related_slug,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn list_messages(&self, recipient: Uuid) -> Result<Vec<Message>> {
    let recipient_str = encode_uuid(recipient);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT message_id, recipient_id, sender_id, kind, subject, body,
                  read, related_slug, created_at
           FROM messages WHERE recipient_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![recipient_str], |row| {
            Ok(RawMessage {
              message_id:   row.get(0)?,
              recipient_id: row.get(1)?,
              sender_id:    row.get(2)?,
              kind:         row.get(3)?,
              subject:      row.get(4)?,
              body:         row.get(5)?,
              read:         row.get(6)?,
              related_slug: row.get(7)?,
              created_at:   row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn mark_read(&self, message_id: Uuid, recipient: Uuid) -> Result<bool> {
    let message_id_str = encode_uuid(message_id);
    let recipient_str  = encode_uuid(recipient);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE messages SET read = 1
           WHERE message_id = ?1 AND recipient_id = ?2",
          rusqlite::params![message_id_str, recipient_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Content filter ────────────────────────────────────────────────────────

  async fn active_filter_words(&self) -> Result<Vec<String>> {
    let words: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT word FROM content_filters WHERE active = 1")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(words)
  }

  async fn add_filter_word(
    &self,
    word: &str,
    severity: Severity,
  ) -> Result<ContentFilterEntry> {
    let entry = ContentFilterEntry {
      word: word.to_lowercase(),
      severity,
      active: true,
    };

    let word_str     = entry.word.clone();
    let severity_str = severity.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO content_filters (word, severity, active)
           VALUES (?1, ?2, 1)
           ON CONFLICT(word) DO UPDATE SET
             severity = excluded.severity, active = 1",
          rusqlite::params![word_str, severity_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  // ── Template slots ────────────────────────────────────────────────────────

  async fn get_slot(&self, slot_id: i64) -> Result<Option<TemplateSlot>> {
    let raw: Option<RawSlot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT slot_id, subject, body, media, updated_at
               FROM promo_slots WHERE slot_id = ?1",
              rusqlite::params![slot_id],
              |row| {
                Ok(RawSlot {
                  slot_id:    row.get(0)?,
                  subject:    row.get(1)?,
                  body:       row.get(2)?,
                  media:      row.get(3)?,
                  updated_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSlot::into_slot).transpose()
  }

  async fn upsert_slot(
    &self,
    slot_id: i64,
    subject: &str,
    body: &str,
    media: Option<MediaRef>,
  ) -> Result<TemplateSlot> {
    let slot = TemplateSlot {
      slot_id,
      subject: subject.to_owned(),
      body: body.to_owned(),
      media,
      updated_at: Utc::now(),
    };

    let subject_str = slot.subject.clone();
    let body_str    = slot.body.clone();
    let media_str   = slot.media.as_ref().map(encode_media).transpose()?;
    let at_str      = encode_dt(slot.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO promo_slots
             (slot_id, subject, body, media, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![slot_id, subject_str, body_str, media_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(slot)
  }

  // ── Credentials ───────────────────────────────────────────────────────────

  async fn add_credential(&self, input: NewCredential) -> Result<Credential> {
    let credential = Credential {
      login:         input.login,
      profile_id:    input.profile_id,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let login          = credential.login.clone();
    let profile_id_str = encode_uuid(credential.profile_id);
    let hash           = credential.password_hash.clone();
    let at_str         = encode_dt(credential.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO credentials (login, profile_id, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![login, profile_id_str, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(credential)
  }

  async fn get_credential(&self, login: &str) -> Result<Option<Credential>> {
    let login = login.to_owned();

    let raw: Option<RawCredential> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT login, profile_id, password_hash, created_at
               FROM credentials WHERE login = ?1",
              rusqlite::params![login],
              |row| {
                Ok(RawCredential {
                  login:         row.get(0)?,
                  profile_id:    row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCredential::into_credential).transpose()
  }

  async fn email_for(&self, profile_id: Uuid) -> Result<Option<String>> {
    let profile_id_str = encode_uuid(profile_id);

    let login: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT login FROM credentials WHERE profile_id = ?1",
              rusqlite::params![profile_id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(login)
  }
}

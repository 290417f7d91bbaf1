//! Integration tests for `SqliteStore` against an in-memory database.

use greenroom_core::{
  credential::NewCredential,
  filter::Severity,
  media::MediaRef,
  message::{MessageKind, NewMessage},
  profile::{NewProfile, OnboardingStatus, Role, SocialLinks, SubmissionDraft, Visibility},
  slot::APPROVAL_MAIL_SLOT,
  song::NewSong,
  store::{CurationStore, ProfileQuery},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn audio_ref(path: &str) -> MediaRef {
  MediaRef {
    bucket:       "songs".into(),
    path:         path.into(),
    url:          format!("http://media.local/songs/{path}"),
    content_hash: "deadbeef".into(),
    media_type:   "audio/mpeg".into(),
    byte_size:    1024,
  }
}

fn probe_song(owner: Uuid, title: &str) -> NewSong {
  NewSong {
    owner_id:    owner,
    title:       title.into(),
    genres:      vec!["techno".into()],
    audio:       audio_ref(&format!("{owner}/{title}")),
    is_probe:    true,
    price_cents: 199,
  }
}

fn draft(name: &str) -> SubmissionDraft {
  SubmissionDraft {
    display_name:      name.into(),
    bio:               Some("making noise since 2019".into()),
    tech_stack:        vec!["Ableton".into()],
    social_links:      SocialLinks {
      website: Some("https://example.com".into()),
      ..Default::default()
    },
    avatar:            None,
    slug:              greenroom_core::slug::slugify(name),
    terms_accepted_at: chrono::Utc::now(),
  }
}

async fn candidate(s: &SqliteStore, name: &str) -> Uuid {
  let profile = s
    .create_profile(NewProfile {
      display_name: name.into(),
      role:         Role::User,
    })
    .await
    .unwrap();
  profile.profile_id
}

/// Drive a profile to `submitted` with one probe song.
async fn submitted_candidate(s: &SqliteStore, name: &str) -> Uuid {
  let id = candidate(s, name).await;
  assert!(s.apply_submission(id, draft(name)).await.unwrap());
  s.add_song(probe_song(id, "first probe")).await.unwrap();
  assert!(s.mark_submitted(id).await.unwrap());
  id
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_profile() {
  let s = store().await;

  let id = candidate(&s, "Nova Drift").await;
  let fetched = s.get_profile(id).await.unwrap().unwrap();

  assert_eq!(fetched.profile_id, id);
  assert_eq!(fetched.display_name, "Nova Drift");
  assert_eq!(fetched.onboarding_status, OnboardingStatus::Pending);
  assert_eq!(fetched.visibility, Visibility::Pending);
  assert_eq!(fetched.role, Role::User);
  assert!(fetched.slug.is_none());
}

#[tokio::test]
async fn get_profile_missing_returns_none() {
  let s = store().await;
  assert!(s.get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_profiles_filtered_by_status() {
  let s = store().await;
  submitted_candidate(&s, "One").await;
  submitted_candidate(&s, "Two").await;
  candidate(&s, "Three").await;

  let submitted = s
    .list_profiles(&ProfileQuery {
      status: Some(OnboardingStatus::Submitted),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(submitted.len(), 2);

  let admins = s
    .list_profiles(&ProfileQuery {
      role: Some(Role::Admin),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(admins.is_empty());
}

#[tokio::test]
async fn apply_submission_persists_draft_fields() {
  let s = store().await;
  let id = candidate(&s, "Nova Drift").await;

  assert!(s.apply_submission(id, draft("Nova Drift")).await.unwrap());

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.display_name, "Nova Drift");
  assert_eq!(p.bio.as_deref(), Some("making noise since 2019"));
  assert_eq!(p.tech_stack, &["Ableton"]);
  assert_eq!(
    p.social_links.website.as_deref(),
    Some("https://example.com")
  );
  assert_eq!(p.slug.as_deref(), Some("nova-drift"));
  assert!(p.terms_accepted_at.is_some());
  // still pending until the commit point
  assert_eq!(p.onboarding_status, OnboardingStatus::Pending);
}

#[tokio::test]
async fn mark_submitted_transitions_and_is_repeatable_before_decision() {
  let s = store().await;
  let id = candidate(&s, "Nova").await;

  assert!(s.apply_submission(id, draft("Nova")).await.unwrap());
  assert!(s.mark_submitted(id).await.unwrap());
  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.onboarding_status, OnboardingStatus::Submitted);

  // resubmission before a decision is allowed
  assert!(s.apply_submission(id, draft("Nova v2")).await.unwrap());
  assert!(s.mark_submitted(id).await.unwrap());
}

#[tokio::test]
async fn approve_profile_sets_public_creator_state() {
  let s = store().await;
  let id = submitted_candidate(&s, "Nova Drift").await;

  assert!(s.approve_profile(id, "nova-drift").await.unwrap());

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.onboarding_status, OnboardingStatus::Approved);
  assert_eq!(p.visibility, Visibility::Public);
  assert_eq!(p.role, Role::Creator);
  assert_eq!(p.slug.as_deref(), Some("nova-drift"));
}

#[tokio::test]
async fn second_decision_loses_the_race() {
  let s = store().await;
  let id = submitted_candidate(&s, "Nova").await;

  // Two admins race: the conditional update lets exactly one win.
  assert!(s.approve_profile(id, "nova").await.unwrap());
  assert!(!s.approve_profile(id, "nova").await.unwrap());
  assert!(!s.reject_profile(id).await.unwrap());
}

#[tokio::test]
async fn reject_profile_clears_personal_fields() {
  let s = store().await;
  let id = submitted_candidate(&s, "Nova Drift").await;

  assert!(s.reject_profile(id).await.unwrap());

  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.onboarding_status, OnboardingStatus::Rejected);
  assert_eq!(p.visibility, Visibility::Rejected);
  assert_eq!(p.role, Role::User);
  assert!(p.display_name.is_empty());
  assert!(p.bio.is_none());
  assert!(p.tech_stack.is_empty());
  assert!(p.social_links.is_empty());
  assert!(p.avatar.is_none());
  assert!(p.slug.is_none());
}

#[tokio::test]
async fn revert_to_pending_only_from_submitted() {
  let s = store().await;
  let id = submitted_candidate(&s, "Nova").await;

  assert!(s.revert_to_pending(id).await.unwrap());
  let p = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(p.onboarding_status, OnboardingStatus::Pending);

  // already pending: the guard fails
  assert!(!s.revert_to_pending(id).await.unwrap());
}

#[tokio::test]
async fn slug_in_use_only_counts_public_profiles() {
  let s = store().await;
  let pending = submitted_candidate(&s, "Nova").await;

  // a submitted draft holding the slug candidate does not reserve it
  assert!(!s.slug_in_use("nova").await.unwrap());

  assert!(s.approve_profile(pending, "nova").await.unwrap());
  assert!(s.slug_in_use("nova").await.unwrap());
  assert!(!s.slug_in_use("nova-2").await.unwrap());

  let by_slug = s.get_profile_by_slug("nova").await.unwrap().unwrap();
  assert_eq!(by_slug.profile_id, pending);
}

// ─── Songs ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn probe_songs_are_hidden_from_public_listing() {
  let s = store().await;
  let id = candidate(&s, "Nova").await;

  s.add_song(probe_song(id, "one")).await.unwrap();
  s.add_song(probe_song(id, "two")).await.unwrap();

  assert_eq!(s.count_songs(id).await.unwrap(), 2);
  assert!(s.list_songs(id, false).await.unwrap().is_empty());
  assert_eq!(s.list_songs(id, true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn set_probe_flag_reports_changed_rows() {
  let s = store().await;
  let id = candidate(&s, "Nova").await;

  s.add_song(probe_song(id, "one")).await.unwrap();
  s.add_song(probe_song(id, "two")).await.unwrap();

  assert_eq!(s.set_probe_flag(id, false).await.unwrap(), 2);
  // already flipped: nothing changes
  assert_eq!(s.set_probe_flag(id, false).await.unwrap(), 0);
  assert_eq!(s.list_songs(id, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_songs_returns_deleted_rows() {
  let s = store().await;
  let id = candidate(&s, "Nova").await;

  s.add_song(probe_song(id, "one")).await.unwrap();
  s.add_song(probe_song(id, "two")).await.unwrap();

  let deleted = s.delete_songs(id).await.unwrap();
  assert_eq!(deleted.len(), 2);
  assert!(deleted.iter().all(|song| song.audio.bucket == "songs"));
  assert_eq!(s.count_songs(id).await.unwrap(), 0);
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_list_messages() {
  let s = store().await;
  let admin = candidate(&s, "Admin").await;
  let other = candidate(&s, "Other").await;

  s.insert_message(NewMessage {
    recipient_id: admin,
    sender_id:    Some(other),
    kind:         MessageKind::Application,
    subject:      "New creator application".into(),
    body:         "Nova submitted 2 probe songs.".into(),
    related_slug: Some("nova".into()),
  })
  .await
  .unwrap();
  s.insert_message(NewMessage::system(admin, "hello", "world"))
    .await
    .unwrap();

  let inbox = s.list_messages(admin).await.unwrap();
  assert_eq!(inbox.len(), 2);
  assert!(inbox.iter().all(|m| !m.read));
  assert!(s.list_messages(other).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_read_requires_the_recipient() {
  let s = store().await;
  let alice = candidate(&s, "Alice").await;
  let bob = candidate(&s, "Bob").await;

  let message = s
    .insert_message(NewMessage::system(alice, "subject", "body"))
    .await
    .unwrap();

  assert!(!s.mark_read(message.message_id, bob).await.unwrap());
  assert!(s.mark_read(message.message_id, alice).await.unwrap());

  let inbox = s.list_messages(alice).await.unwrap();
  assert!(inbox[0].read);
}

// ─── Content filter ──────────────────────────────────────────────────────────

#[tokio::test]
async fn filter_words_roundtrip_lowercased() {
  let s = store().await;

  s.add_filter_word("Kill", Severity::Severe).await.unwrap();
  s.add_filter_word("bomb", Severity::Mild).await.unwrap();

  let mut words = s.active_filter_words().await.unwrap();
  words.sort();
  assert_eq!(words, &["bomb", "kill"]);

  // upsert does not duplicate
  s.add_filter_word("kill", Severity::Mild).await.unwrap();
  assert_eq!(s.active_filter_words().await.unwrap().len(), 2);
}

// ─── Template slots ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_slot_is_none() {
  let s = store().await;
  assert!(s.get_slot(APPROVAL_MAIL_SLOT).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_slot_roundtrip() {
  let s = store().await;

  s.upsert_slot(APPROVAL_MAIL_SLOT, "Welcome {{name}}", "Body {{url}}", None)
    .await
    .unwrap();
  let slot = s.get_slot(APPROVAL_MAIL_SLOT).await.unwrap().unwrap();
  assert_eq!(slot.subject, "Welcome {{name}}");

  s.upsert_slot(APPROVAL_MAIL_SLOT, "Changed", "Body", None)
    .await
    .unwrap();
  let slot = s.get_slot(APPROVAL_MAIL_SLOT).await.unwrap().unwrap();
  assert_eq!(slot.subject, "Changed");
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn credential_lookup_and_email_resolution() {
  let s = store().await;
  let id = candidate(&s, "Nova").await;

  s.add_credential(NewCredential {
    login:         "nova@example.com".into(),
    profile_id:    id,
    password_hash: "$argon2id$v=19$fake".into(),
  })
  .await
  .unwrap();

  let cred = s.get_credential("nova@example.com").await.unwrap().unwrap();
  assert_eq!(cred.profile_id, id);

  assert_eq!(
    s.email_for(id).await.unwrap().as_deref(),
    Some("nova@example.com")
  );
  assert!(s.email_for(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_credential("unknown@example.com").await.unwrap().is_none());
}

//! Workflow tests: the full submit/decide/reconcile engine against an
//! in-memory SQLite store, the in-memory media store, and a recording mail
//! transport.

use std::sync::Arc;

use bytes::Bytes;
use greenroom_core::{
  Error as DomainError,
  credential::NewCredential,
  filter::Severity,
  message::MessageKind,
  profile::{NewProfile, OnboardingStatus, Role, SocialLinks, Visibility},
  slot::APPROVAL_MAIL_SLOT,
  store::CurationStore,
};
use greenroom_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{
  CurationConfig, CurationService, Error,
  decide::{Decision, DecisionOutcome},
  mailer::{EmailOutcome, RecordingMailer},
  media::MemMediaStore,
  submit::{MediaUpload, ProbeUpload, SubmitRequest},
};

// ─── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
  service: CurationService<SqliteStore, MemMediaStore, RecordingMailer>,
  store:   Arc<SqliteStore>,
  media:   Arc<MemMediaStore>,
  mailer:  Arc<RecordingMailer>,
}

async fn harness() -> Harness {
  harness_with(RecordingMailer::new()).await
}

async fn harness_with(mailer: RecordingMailer) -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let media = Arc::new(MemMediaStore::new());
  let mailer = Arc::new(mailer);
  let service = CurationService::new(
    store.clone(),
    media.clone(),
    mailer.clone(),
    CurationConfig {
      public_base_url: "https://shop.example.com".into(),
      max_probe_bytes: 1024,
    },
  );
  Harness { service, store, media, mailer }
}

impl Harness {
  async fn admin(&self) -> Uuid {
    let profile = self
      .store
      .create_profile(NewProfile {
        display_name: "Curator".into(),
        role:         Role::Admin,
      })
      .await
      .unwrap();
    profile.profile_id
  }

  async fn candidate(&self, name: &str, email: &str) -> Uuid {
    let profile = self
      .store
      .create_profile(NewProfile {
        display_name: name.into(),
        role:         Role::User,
      })
      .await
      .unwrap();
    self
      .store
      .add_credential(NewCredential {
        login:         email.into(),
        profile_id:    profile.profile_id,
        password_hash: "$argon2id$v=19$test".into(),
      })
      .await
      .unwrap();
    profile.profile_id
  }
}

fn probe(title: &str) -> ProbeUpload {
  ProbeUpload {
    title:       title.into(),
    genres:      vec!["techno".into()],
    price_cents: 299,
    media_type:  "audio/mpeg".into(),
    bytes:       Bytes::from_static(b"fake audio payload"),
  }
}

fn request(name: &str, probes: Vec<ProbeUpload>) -> SubmitRequest {
  SubmitRequest {
    artist_name:      name.into(),
    bio:              Some("Analog noise from the north".into()),
    tech_stack:       vec!["Ableton".into(), "modular".into()],
    social_links:     SocialLinks::default(),
    accepted_terms:   true,
    confirmed_rights: true,
    probes,
    avatar:           None,
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_with_one_probe_succeeds_and_notifies_admins() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova Drift", "nova@example.com").await;

  let outcome = h
    .service
    .submit(id, request("Nova Drift", vec![probe("First Light")]))
    .await
    .unwrap();

  assert_eq!(outcome.probe_count, 1);
  assert_eq!(outcome.admins_notified, 1);

  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Submitted);
  assert_eq!(profile.visibility, Visibility::Pending);
  assert_eq!(profile.slug.as_deref(), Some("nova-drift"));

  let songs = h.store.list_songs(id, true).await.unwrap();
  assert_eq!(songs.len(), 1);
  assert!(songs[0].is_probe);
  assert_eq!(h.media.object_count(), 1);

  let inbox = h.store.list_messages(admin).await.unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].kind, MessageKind::Application);
  assert_eq!(inbox[0].related_slug.as_deref(), Some("nova-drift"));
}

#[tokio::test]
async fn submit_with_two_probes_succeeds() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  let outcome = h
    .service
    .submit(id, request("Nova", vec![probe("One"), probe("Two")]))
    .await
    .unwrap();

  assert_eq!(outcome.probe_count, 2);
  assert_eq!(h.store.count_songs(id).await.unwrap(), 2);
}

#[tokio::test]
async fn submit_probe_count_out_of_range_is_rejected() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  let err = h.service.submit(id, request("Nova", vec![])).await.unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::ProbeCount(0))));

  let err = h
    .service
    .submit(id, request("Nova", vec![probe("a"), probe("b"), probe("c")]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::ProbeCount(3))));

  assert_eq!(h.store.count_songs(id).await.unwrap(), 0);
  assert_eq!(h.media.object_count(), 0);
}

#[tokio::test]
async fn submit_requires_all_legal_checks() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  let mut req = request("Nova", vec![probe("One")]);
  req.confirmed_rights = false;
  let err = h.service.submit(id, req).await.unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::LegalConsentMissing)));
}

#[tokio::test]
async fn submit_with_blocked_bio_writes_nothing() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova Drift", "nova@example.com").await;
  h.store.add_filter_word("kill", Severity::Severe).await.unwrap();

  let mut req = request("Nova Drift", vec![probe("First Light")]);
  req.bio = Some("Kill the noise".into());

  let err = h.service.submit(id, req).await.unwrap_err();
  assert!(
    matches!(err, Error::Domain(DomainError::BlockedContent(ref word)) if word == "kill")
  );

  // zero rows written, zero artifacts stored, no admin notified
  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Pending);
  assert!(profile.bio.is_none());
  assert_eq!(h.store.count_songs(id).await.unwrap(), 0);
  assert_eq!(h.media.object_count(), 0);
  assert!(h.store.list_messages(admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn submit_blocked_song_title_is_rejected() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;
  h.store.add_filter_word("bomb", Severity::Severe).await.unwrap();

  let err = h
    .service
    .submit(id, request("Nova", vec![probe("Drop the Bomb")]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::BlockedContent(_))));
}

#[tokio::test]
async fn submit_oversized_probe_is_rejected() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  let mut big = probe("Big");
  big.bytes = Bytes::from(vec![0u8; 4096]);

  let err = h
    .service
    .submit(id, request("Nova", vec![big]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::ProbeTooLarge { .. })));
  assert_eq!(h.media.object_count(), 0);
}

#[tokio::test]
async fn resubmission_replaces_the_previous_probe_set() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One"), probe("Two")]))
    .await
    .unwrap();
  assert_eq!(h.media.object_count(), 2);

  h.service
    .submit(id, request("Nova", vec![probe("Better One")]))
    .await
    .unwrap();

  let songs = h.store.list_songs(id, true).await.unwrap();
  assert_eq!(songs.len(), 1);
  assert_eq!(songs[0].title, "Better One");
  // the replaced artifacts are gone
  assert_eq!(h.media.object_count(), 1);
}

#[tokio::test]
async fn submit_after_a_decision_is_rejected() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();
  h.service.decide(admin, id, Decision::Approve).await.unwrap();

  let err = h
    .service
    .submit(id, request("Nova", vec![probe("Two")]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(DomainError::NotAwaitingReview { .. })
  ));
}

// ─── Approval ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_publishes_profile_and_songs() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova Drift", "nova@example.com").await;

  h.service
    .submit(id, request("Nova Drift", vec![probe("One"), probe("Two")]))
    .await
    .unwrap();

  let outcome = h.service.decide(admin, id, Decision::Approve).await.unwrap();
  let DecisionOutcome::Approved { slug, songs_published, email } = outcome
  else {
    panic!("expected approval outcome");
  };

  assert_eq!(slug, "nova-drift");
  assert_eq!(songs_published, 2);
  assert!(email.was_sent());

  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Approved);
  assert_eq!(profile.visibility, Visibility::Public);
  assert_eq!(profile.role, Role::Creator);
  assert_eq!(profile.slug.as_deref(), Some("nova-drift"));

  // every song is now public
  assert_eq!(h.store.list_songs(id, false).await.unwrap().len(), 2);

  // in-app notice for the candidate
  let inbox = h.store.list_messages(id).await.unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].kind, MessageKind::System);
  assert_eq!(inbox[0].related_slug.as_deref(), Some("nova-drift"));

  // approval mail went to the address on file with the public URL
  let sent = h.mailer.recorded();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, "nova@example.com");
  assert!(
    sent[0]
      .text
      .contains("https://shop.example.com/creator/nova-drift")
  );
}

#[tokio::test]
async fn decide_requires_the_admin_role() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;
  let outsider = h.candidate("Outsider", "out@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();

  let err = h
    .service
    .decide(outsider, id, Decision::Approve)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Domain(DomainError::AdminRequired)));

  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Submitted);
}

#[tokio::test]
async fn re_deciding_a_decided_profile_is_a_hard_error() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();
  h.service.decide(admin, id, Decision::Approve).await.unwrap();

  for decision in [Decision::Approve, Decision::Reject] {
    let err = h.service.decide(admin, id, decision).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Domain(DomainError::NotAwaitingReview { .. })
    ));
  }

  // exactly one approval mail, despite the retries
  assert_eq!(h.mailer.recorded().len(), 1);
}

#[tokio::test]
async fn slug_collision_gets_a_numeric_suffix() {
  let h = harness().await;
  let admin = h.admin().await;

  let first = h.candidate("Nova", "first@example.com").await;
  h.service
    .submit(first, request("Nova", vec![probe("One")]))
    .await
    .unwrap();
  h.service.decide(admin, first, Decision::Approve).await.unwrap();

  let second = h.candidate("Nova", "second@example.com").await;
  h.service
    .submit(second, request("Nova", vec![probe("Two")]))
    .await
    .unwrap();
  let outcome =
    h.service.decide(admin, second, Decision::Approve).await.unwrap();

  let DecisionOutcome::Approved { slug, .. } = outcome else {
    panic!("expected approval outcome");
  };
  assert_eq!(slug, "nova-2");

  // the first profile's mapping is untouched
  let original = h.store.get_profile_by_slug("nova").await.unwrap().unwrap();
  assert_eq!(original.profile_id, first);
}

#[tokio::test]
async fn email_failure_never_rolls_back_an_approval() {
  let h = harness_with(RecordingMailer::failing("provider_status_500")).await;
  let admin = h.admin().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();

  let outcome = h.service.decide(admin, id, Decision::Approve).await.unwrap();
  let DecisionOutcome::Approved { email, .. } = outcome else {
    panic!("expected approval outcome");
  };
  assert_eq!(email, EmailOutcome::not_sent("provider_status_500"));

  // decision committed regardless
  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.visibility, Visibility::Public);

  // operator-visible record of the failure
  let admin_inbox = h.store.list_messages(admin).await.unwrap();
  assert!(
    admin_inbox
      .iter()
      .any(|m| m.subject == "Decision email not sent")
  );
}

#[tokio::test]
async fn decision_without_an_address_reports_not_sent() {
  let h = harness().await;
  let admin = h.admin().await;
  // profile without a credential row — no resolvable address
  let id = {
    let profile = h
      .store
      .create_profile(NewProfile {
        display_name: "Ghost".into(),
        role:         Role::User,
      })
      .await
      .unwrap();
    profile.profile_id
  };

  h.service
    .submit(id, request("Ghost", vec![probe("One")]))
    .await
    .unwrap();
  let outcome = h.service.decide(admin, id, Decision::Approve).await.unwrap();

  let DecisionOutcome::Approved { email, .. } = outcome else {
    panic!("expected approval outcome");
  };
  assert_eq!(email, EmailOutcome::not_sent("no_recipient_address"));
  assert!(h.mailer.recorded().is_empty());
}

#[tokio::test]
async fn slot_template_overrides_the_builtin_mail() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.store
    .upsert_slot(APPROVAL_MAIL_SLOT, "Stage is yours, {{name}}", "Go to {{url}}", None)
    .await
    .unwrap();
  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();
  h.service.decide(admin, id, Decision::Approve).await.unwrap();

  let sent = h.mailer.recorded();
  assert_eq!(sent[0].subject, "Stage is yours, Nova");
  assert!(sent[0].text.starts_with("Go to https://shop.example.com/creator/nova"));
}

// ─── Rejection ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejection_erases_songs_artifacts_and_personal_data() {
  let h = harness().await;
  let admin = h.admin().await;
  let id = h.candidate("Nova Drift", "nova@example.com").await;

  let mut req = request("Nova Drift", vec![probe("One"), probe("Two")]);
  req.avatar = Some(MediaUpload {
    media_type: "image/png".into(),
    bytes:      Bytes::from_static(b"fake png"),
  });
  h.service.submit(id, req).await.unwrap();
  assert_eq!(h.media.object_count(), 3);

  let outcome = h.service.decide(admin, id, Decision::Reject).await.unwrap();
  let DecisionOutcome::Rejected { songs_deleted, email } = outcome else {
    panic!("expected rejection outcome");
  };
  assert_eq!(songs_deleted, 2);
  assert!(email.was_sent());

  // erasure invariant: no songs, no artifacts, no personal fields
  assert_eq!(h.store.count_songs(id).await.unwrap(), 0);
  assert_eq!(h.media.object_count(), 0);

  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Rejected);
  assert_eq!(profile.visibility, Visibility::Rejected);
  assert!(profile.display_name.is_empty());
  assert!(profile.bio.is_none());
  assert!(profile.avatar.is_none());
  assert!(profile.slug.is_none());

  // the mail used the address resolved before erasure
  let sent = h.mailer.recorded();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, "nova@example.com");
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reconcile_rolls_back_a_songless_submission() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  // simulate a crash between the profile transition and the song inserts
  use greenroom_core::profile::SubmissionDraft;
  h.store
    .apply_submission(id, SubmissionDraft {
      display_name:      "Nova".into(),
      bio:               None,
      tech_stack:        vec![],
      social_links:      SocialLinks::default(),
      avatar:            None,
      slug:              Some("nova".into()),
      terms_accepted_at: chrono::Utc::now(),
    })
    .await
    .unwrap();
  h.store.mark_submitted(id).await.unwrap();

  let report = h.service.reconcile().await.unwrap();
  assert_eq!(report.rolled_back, 1);
  assert_eq!(report.completed, 0);

  let profile = h.store.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.onboarding_status, OnboardingStatus::Pending);
}

#[tokio::test]
async fn reconcile_completes_an_interrupted_approval() {
  let h = harness().await;
  let id = h.candidate("Nova", "nova@example.com").await;

  h.service
    .submit(id, request("Nova", vec![probe("One")]))
    .await
    .unwrap();
  // simulate a crash right after the profile transition: the songs still
  // carry the probe flag
  h.store.approve_profile(id, "nova").await.unwrap();
  assert!(h.store.list_songs(id, false).await.unwrap().is_empty());

  let report = h.service.reconcile().await.unwrap();
  assert_eq!(report.completed, 1);
  assert_eq!(h.store.list_songs(id, false).await.unwrap().len(), 1);

  // a second pass finds nothing to do
  let report = h.service.reconcile().await.unwrap();
  assert_eq!(report.rolled_back, 0);
  assert_eq!(report.completed, 0);
}

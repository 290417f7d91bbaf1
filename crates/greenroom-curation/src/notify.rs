//! In-app notification fan-out.
//!
//! Message inserts are best-effort: a failed write is logged and reflected
//! in the returned count, never escalated to the caller. The state
//! transition a notification announces has already committed by the time we
//! get here.

use greenroom_core::{
  message::{MessageKind, NewMessage},
  profile::Role,
  store::{CurationStore, ProfileQuery},
};
use uuid::Uuid;

/// Insert an application notice for every admin. Returns how many inserts
/// succeeded.
pub async fn notify_admins<S: CurationStore>(
  store: &S,
  sender: Uuid,
  subject: &str,
  body: &str,
  related_slug: Option<&str>,
) -> usize {
  let admins = match store
    .list_profiles(&ProfileQuery {
      role: Some(Role::Admin),
      ..Default::default()
    })
    .await
  {
    Ok(admins) => admins,
    Err(e) => {
      tracing::warn!("admin lookup for notification failed: {e}");
      return 0;
    }
  };

  let mut delivered = 0;
  for admin in admins {
    let insert = store
      .insert_message(NewMessage {
        recipient_id: admin.profile_id,
        sender_id:    Some(sender),
        kind:         MessageKind::Application,
        subject:      subject.to_owned(),
        body:         body.to_owned(),
        related_slug: related_slug.map(str::to_owned),
      })
      .await;

    match insert {
      Ok(_) => delivered += 1,
      Err(e) => {
        tracing::warn!(admin = %admin.profile_id, "notification insert failed: {e}");
      }
    }
  }

  delivered
}

/// Best-effort system message to a single recipient.
pub async fn system_message<S: CurationStore>(
  store: &S,
  recipient: Uuid,
  subject: &str,
  body: &str,
  related_slug: Option<&str>,
) {
  let mut message = NewMessage::system(recipient, subject, body);
  message.related_slug = related_slug.map(str::to_owned);

  if let Err(e) = store.insert_message(message).await {
    tracing::warn!(recipient = %recipient, "message insert failed: {e}");
  }
}

/// Operator-visible record of a failed mail dispatch, addressed to the
/// admin whose decision triggered the mail.
pub async fn note_email_failure<S: CurationStore>(
  store: &S,
  admin: Uuid,
  candidate: Uuid,
  reason: &str,
) {
  tracing::warn!(candidate = %candidate, reason, "decision email not sent");
  system_message(
    store,
    admin,
    "Decision email not sent",
    &format!("The decision email for profile {candidate} was not sent ({reason}). The decision itself has been applied."),
    None,
  )
  .await;
}

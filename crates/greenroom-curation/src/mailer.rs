//! Outbound transactional email.
//!
//! Email is strictly best-effort: the [`Mailer`] trait cannot fail, it can
//! only report that a mail was not sent and why. Absent provider credentials
//! mean every send answers `NotSent { reason: "missing_config" }` — the
//! decision that triggered the mail commits regardless.

use std::{future::Future, sync::Mutex, time::Duration};

use serde::Serialize;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What happened to an outbound mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailOutcome {
  Sent,
  NotSent { reason: String },
}

impl EmailOutcome {
  pub fn not_sent(reason: impl Into<String>) -> Self {
    Self::NotSent { reason: reason.into() }
  }

  pub fn was_sent(&self) -> bool { matches!(self, Self::Sent) }
}

// ─── Mail & trait ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OutboundMail {
  pub to:      String,
  pub subject: String,
  pub html:    String,
  pub text:    String,
}

/// A transactional email transport.
pub trait Mailer: Send + Sync {
  fn send<'a>(
    &'a self,
    mail: &'a OutboundMail,
  ) -> impl Future<Output = EmailOutcome> + Send + 'a;
}

// ─── Disabled transport ──────────────────────────────────────────────────────

/// Used when no provider is configured; never sends anything.
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
  async fn send(&self, _mail: &OutboundMail) -> EmailOutcome {
    EmailOutcome::not_sent("missing_config")
  }
}

// ─── HTTP transport ──────────────────────────────────────────────────────────

/// Connection settings for the HTTP email provider.
#[derive(Debug, Clone)]
pub struct MailerConfig {
  /// Provider endpoint accepting `POST {from, to, subject, html, text}`.
  pub endpoint:     String,
  pub api_key:      String,
  /// Sender address, e.g. `curation@shop.example.com`.
  pub sender:       String,
  /// Request timeout; the provider call sits on the admin's request path.
  pub timeout_secs: u64,
}

/// Sends mail through an HTTP provider API.
pub struct HttpMailer {
  client: reqwest::Client,
  config: MailerConfig,
}

impl HttpMailer {
  pub fn new(config: MailerConfig) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }
}

impl Mailer for HttpMailer {
  async fn send(&self, mail: &OutboundMail) -> EmailOutcome {
    let payload = serde_json::json!({
      "from":    self.config.sender,
      "to":      mail.to,
      "subject": mail.subject,
      "html":    mail.html,
      "text":    mail.text,
    });

    let response = self
      .client
      .post(&self.config.endpoint)
      .bearer_auth(&self.config.api_key)
      .json(&payload)
      .send()
      .await;

    match response {
      Ok(resp) if resp.status().is_success() => EmailOutcome::Sent,
      Ok(resp) => {
        EmailOutcome::not_sent(format!("provider_status_{}", resp.status().as_u16()))
      }
      Err(e) if e.is_timeout() => EmailOutcome::not_sent("timeout"),
      Err(_) => EmailOutcome::not_sent("transport_error"),
    }
  }
}

// ─── Runtime selection ───────────────────────────────────────────────────────

/// Mailer chosen at startup from configuration.
pub enum AnyMailer {
  Http(HttpMailer),
  Disabled(DisabledMailer),
}

impl AnyMailer {
  /// Build from optional provider settings; `None` yields the disabled
  /// transport. A client construction failure also degrades to disabled —
  /// mail is best-effort, startup must not fail over it.
  pub fn from_config(config: Option<MailerConfig>) -> Self {
    match config {
      Some(cfg) => match HttpMailer::new(cfg) {
        Ok(mailer) => Self::Http(mailer),
        Err(e) => {
          tracing::warn!("mail client init failed, mail disabled: {e}");
          Self::Disabled(DisabledMailer)
        }
      },
      None => Self::Disabled(DisabledMailer),
    }
  }
}

impl Mailer for AnyMailer {
  async fn send(&self, mail: &OutboundMail) -> EmailOutcome {
    match self {
      Self::Http(mailer) => mailer.send(mail).await,
      Self::Disabled(mailer) => mailer.send(mail).await,
    }
  }
}

// ─── Test double ─────────────────────────────────────────────────────────────

/// Records outbound mail instead of sending it; answers a fixed outcome.
pub struct RecordingMailer {
  outcome:  EmailOutcome,
  recorded: Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
  /// Every send is recorded and answered with `Sent`.
  pub fn new() -> Self {
    Self {
      outcome:  EmailOutcome::Sent,
      recorded: Mutex::new(Vec::new()),
    }
  }

  /// Every send is recorded and answered with `NotSent { reason }`.
  pub fn failing(reason: &str) -> Self {
    Self {
      outcome:  EmailOutcome::not_sent(reason),
      recorded: Mutex::new(Vec::new()),
    }
  }

  /// Mail handed to this transport so far.
  pub fn recorded(&self) -> Vec<OutboundMail> {
    self.recorded.lock().expect("mailer lock").clone()
  }
}

impl Default for RecordingMailer {
  fn default() -> Self { Self::new() }
}

impl Mailer for RecordingMailer {
  async fn send(&self, mail: &OutboundMail) -> EmailOutcome {
    self.recorded.lock().expect("mailer lock").push(mail.clone());
    self.outcome.clone()
  }
}

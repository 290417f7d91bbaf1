//! Mail template resolution and rendering.
//!
//! Templates come from configuration slots 201/202 when present, with
//! builtin fallbacks otherwise. Placeholders are `{{name}}` and `{{url}}`;
//! the approval mail additionally gets a fixed "next step" suffix pointing
//! at the new public page.

use greenroom_core::slot::TemplateSlot;

use crate::mailer::OutboundMail;

// ─── Builtin fallbacks ───────────────────────────────────────────────────────

const APPROVAL_SUBJECT: &str = "Your creator application was approved";
const APPROVAL_BODY: &str = "Hi {{name}},\n\n\
   good news: your application was approved and your creator profile is now \
   public.";

const REJECTION_SUBJECT: &str = "About your creator application";
const REJECTION_BODY: &str = "Hi {{name}},\n\n\
   thank you for your submission. After review we decided not to publish \
   your profile at this time. Your uploaded material has been removed.";

// ─── Rendering ───────────────────────────────────────────────────────────────

fn merge(template: &str, name: &str, url: &str) -> String {
  template.replace("{{name}}", name).replace("{{url}}", url)
}

fn escape_html(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}

fn as_html(text: &str) -> String {
  format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

fn subject_and_body(
  slot: Option<TemplateSlot>,
  fallback_subject: &str,
  fallback_body: &str,
) -> (String, String) {
  match slot {
    Some(slot) => (slot.subject, slot.body),
    None => (fallback_subject.to_owned(), fallback_body.to_owned()),
  }
}

/// Render the approval mail for `name`, linking to `public_url`.
pub fn approval_mail(
  slot: Option<TemplateSlot>,
  to: &str,
  name: &str,
  public_url: &str,
) -> OutboundMail {
  let (subject, body) =
    subject_and_body(slot, APPROVAL_SUBJECT, APPROVAL_BODY);

  let mut text = merge(&body, name, public_url);
  text.push_str(&format!("\n\nNext step: your page is live at {public_url}"));

  OutboundMail {
    to:      to.to_owned(),
    subject: merge(&subject, name, public_url),
    html:    as_html(&text),
    text,
  }
}

/// Render the rejection mail for `name`. No link suffix — there is no page.
pub fn rejection_mail(
  slot: Option<TemplateSlot>,
  to: &str,
  name: &str,
) -> OutboundMail {
  let (subject, body) =
    subject_and_body(slot, REJECTION_SUBJECT, REJECTION_BODY);

  let text = merge(&body, name, "");

  OutboundMail {
    to:      to.to_owned(),
    subject: merge(&subject, name, ""),
    html:    as_html(&text),
    text,
  }
}

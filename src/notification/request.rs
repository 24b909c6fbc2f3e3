//! Prowl `add` request: field resolution and form encoding.

use crate::config::PlatformConfig;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in form values. Matches a query-string escape: only
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )` pass through, and space becomes `%20`.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Body fields of one notification. `None` encodes as an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub apikey: String,
    pub application: Option<String>,
    pub description: Option<String>,
    pub priority: i64,
    pub url: Option<String>,
}

impl NotificationRequest {
    /// `application/x-www-form-urlencoded` body, keys in fixed order.
    pub fn encode(&self) -> String {
        let priority = self.priority.to_string();
        let fields: [(&str, Option<&str>); 5] = [
            ("apikey", Some(self.apikey.as_str())),
            ("application", self.application.as_deref()),
            ("description", self.description.as_deref()),
            ("priority", Some(priority.as_str())),
            ("url", self.url.as_deref()),
        ];

        fields
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    key,
                    utf8_percent_encode(value.unwrap_or_default(), FORM_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Substitute the subject into a message template.
///
/// The first `%` is the placeholder. A template without one gets the subject
/// appended after a space.
pub fn render_template(template: &str, subject: &str) -> String {
    if template.contains('%') {
        template.replacen('%', subject, 1)
    } else {
        format!("{template} {subject}")
    }
}

/// Subject and message for a switch, or `(None, None)` when the reloaded
/// configuration no longer lists it.
pub fn resolve_text(platform: &PlatformConfig, switch_name: &str) -> (Option<String>, Option<String>) {
    let Some(entry) = platform.switch(switch_name) else {
        return (None, None);
    };

    let subject = entry
        .subject
        .clone()
        .unwrap_or_else(|| switch_name.to_string());
    let message = match &entry.message {
        Some(message) => message.clone(),
        None => render_template(platform.message_template(), &subject),
    };

    (Some(subject), Some(message))
}

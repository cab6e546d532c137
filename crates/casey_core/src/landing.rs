//! Landing-page helpers: contact form validation and the stat counter
//! animation. Independent of the wizard state.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// Request context recorded alongside a contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMeta {
    pub timestamp: String,
    pub user_agent: String,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub timestamp: String,
    pub user_agent: String,
    pub referrer: String,
}

pub const MISSING_FIELDS: &str = "Please fill in all required fields.";

impl ContactForm {
    /// Trims every field and checks that name, email and message are present.
    pub fn into_submission(self, meta: ContactMeta) -> Result<ContactSubmission, &'static str> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let message = self.message.trim().to_string();
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(MISSING_FIELDS);
        }
        let referrer = meta
            .referrer
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "direct".to_string());
        Ok(ContactSubmission {
            name,
            email,
            company: self.company.trim().to_string(),
            message,
            timestamp: meta.timestamp,
            user_agent: meta.user_agent,
            referrer,
        })
    }
}

/// Length of the count-up animation.
pub const STAT_ANIMATION_MS: u64 = 1200;

/// A landing-page figure such as `500k+`, `12+` or `99.9%`, animated from
/// zero to its value.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCounter {
    raw: String,
    target: f64,
    percent: bool,
    thousands: bool,
    plus: bool,
}

impl StatCounter {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let digits: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let target = if digits.is_empty() {
            0.0
        } else {
            digits.parse::<f64>().ok()?
        };
        if !target.is_finite() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            target,
            percent: raw.contains('%'),
            thousands: raw.to_ascii_lowercase().contains('k'),
            plus: raw.contains('+'),
        })
    }

    /// Text to display `elapsed_ms` after the animation started.
    pub fn frame(&self, elapsed_ms: u64) -> String {
        if elapsed_ms >= STAT_ANIMATION_MS {
            return self.raw.clone();
        }
        let t = elapsed_ms as f64 / STAT_ANIMATION_MS as f64;
        let eased = 1.0 - (1.0 - t).powi(3);
        let value = self.target * eased;
        if self.percent {
            return format!("{value:.1}%");
        }
        let mut text = (value.round() as u64).to_string();
        if self.thousands {
            text.push('k');
        }
        if self.plus {
            text.push('+');
        }
        text
    }
}

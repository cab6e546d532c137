//! Toast queue and loading overlay. Time is passed in by the caller so the
//! queue stays deterministic under test.

use std::time::{Duration, Instant};

/// How long a toast stays visible unless dismissed earlier.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastLevel {
    pub fn title(self) -> &'static str {
        match self {
            ToastLevel::Success => "Success",
            ToastLevel::Error => "Error",
            ToastLevel::Warning => "Warning",
            ToastLevel::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message)
    }

    fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToast {
    pub id: ToastId,
    pub toast: Toast,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: ToastId,
    visible: Vec<ActiveToast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast, now: Instant) -> ToastId {
        self.next_id += 1;
        let id = self.next_id;
        self.visible.push(ActiveToast {
            id,
            toast,
            expires_at: now + TOAST_LIFETIME,
        });
        id
    }

    /// Drops toasts whose timer ran out. Returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.visible.len();
        self.visible.retain(|t| t.expires_at > now);
        before - self.visible.len()
    }

    /// Click-to-dismiss. Returns false if the toast was already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.visible.len();
        self.visible.retain(|t| t.id != id);
        before != self.visible.len()
    }

    pub fn visible(&self) -> &[ActiveToast] {
        &self.visible
    }
}

/// Blocking overlay with a message. Show/hide calls are not nested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingOverlay {
    message: Option<String>,
}

impl LoadingOverlay {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

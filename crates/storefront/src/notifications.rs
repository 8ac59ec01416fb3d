//! Transient user-facing notifications.
//!
//! A toast lives until its expiry timestamp. Nothing runs in the background:
//! expired toasts are hidden on read and dropped by [`ToastQueue::prune`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a toast stays visible unless the queue says otherwise.
pub const DEFAULT_TOAST_TTL: Duration = Duration::seconds(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    #[must_use]
    pub fn new(
        level: ToastLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            expires_at,
        }
    }

    #[must_use]
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.title, self.message)
    }
}

/// Toasts waiting to be shown, oldest first.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    ttl: Duration,
    toasts: Vec<Toast>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl ToastQueue {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            toasts: Vec::new(),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Queue a toast that expires one TTL after `now`.
    pub fn push(
        &mut self,
        level: ToastLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.push_toast(Toast::new(level, title, message, now + self.ttl));
    }

    /// Queue an already-built toast.
    pub fn push_toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    /// Toasts still visible at `now`.
    #[must_use]
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Toast> {
        self.toasts.iter().filter(|t| t.is_visible(now)).collect()
    }

    /// Drop expired toasts. Returns how many were dropped.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.is_visible(now));
        before - self.toasts.len()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_toast_expires_after_ttl() {
        let mut queue = ToastQueue::new(Duration::seconds(3));
        queue.push(ToastLevel::Success, "Added", "Item added to cart", now());

        assert_eq!(queue.active(now() + Duration::seconds(2)).len(), 1);
        assert!(queue.active(now() + Duration::seconds(3)).is_empty());
    }

    #[test]
    fn test_prune_keeps_visible() {
        let mut queue = ToastQueue::default();
        queue.push(ToastLevel::Info, "Old", "", now());
        queue.push(ToastLevel::Info, "New", "", now() + Duration::seconds(4));

        let dropped = queue.prune(now() + Duration::seconds(6));
        assert_eq!(dropped, 1);
        let active = queue.active(now() + Duration::seconds(6));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "New");
    }

    #[test]
    fn test_display() {
        let toast = Toast::new(ToastLevel::Warning, "Low stock", "Mouse: 2 left", now());
        assert_eq!(toast.to_string(), "[warning] Low stock: Mouse: 2 left");
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Notification lifecycle management.
//!
//! The `Manager` limits the number of visible toasts, queues the rest and
//! runs the auto-dismiss timers. Warnings and errors are mirrored to the log.

use super::notification::{Notification, NotificationId, Severity};
use std::collections::VecDeque;

/// Maximum number of notifications visible at once.
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone)]
pub enum Message {
    Dismiss(NotificationId),
    Tick,
}

#[derive(Debug, Default)]
pub struct Manager {
    /// Newest first.
    visible: VecDeque<Notification>,
    queue: VecDeque<Notification>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the notification now, or queues it when `MAX_VISIBLE` are showing.
    pub fn push(&mut self, notification: Notification) {
        match notification.severity() {
            Severity::Warning => tracing::warn!(key = notification.message_key(), "user warning"),
            Severity::Error => tracing::error!(key = notification.message_key(), "user error"),
            Severity::Success | Severity::Info => {
                tracing::debug!(key = notification.message_key(), "user notice")
            }
        }

        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(notification);
        } else {
            self.queue.push_back(notification);
        }
    }

    /// Returns `true` if the notification was found and removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.visible.iter().position(|n| n.id() == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }

        if let Some(pos) = self.queue.iter().position(|n| n.id() == id) {
            self.queue.remove(pos);
            return true;
        }

        false
    }

    /// Dismisses expired notifications.
    pub fn tick(&mut self) {
        let expired: Vec<NotificationId> = self
            .visible
            .iter()
            .filter(|n| n.should_auto_dismiss())
            .map(Notification::id)
            .collect();

        for id in expired {
            self.dismiss(id);
        }
    }

    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Dismiss(id) => {
                self.dismiss(*id);
            }
            Message::Tick => self.tick(),
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    /// Returns whether a notification with this key is visible or queued.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.visible
            .iter()
            .chain(self.queue.iter())
            .any(|n| n.message_key() == key)
    }

    /// Drops error toasts that a later success made stale.
    pub fn clear_errors(&mut self) {
        let visible_before = self.visible.len();
        self.visible.retain(|n| n.severity() != Severity::Error);
        self.queue.retain(|n| n.severity() != Severity::Error);

        if self.visible.len() < visible_before {
            self.promote_from_queue();
        }
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            let Some(notification) = self.queue.pop_front() else {
                break;
            };
            self.visible.push_back(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_is_empty() {
        let manager = Manager::new();
        assert_eq!(manager.visible_count(), 0);
        assert!(!manager.has_notifications());
    }

    #[test]
    fn push_queues_when_visible_is_full() {
        let mut manager = Manager::new();
        for i in 0..MAX_VISIBLE {
            manager.push(Notification::success(format!("test-{i}")));
        }
        assert_eq!(manager.queued_count(), 0);

        manager.push(Notification::success("queued"));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 1);
    }

    #[test]
    fn dismiss_promotes_from_queue() {
        let mut manager = Manager::new();
        let first = Notification::success("visible-0");
        let first_id = first.id();
        manager.push(first);
        for i in 1..MAX_VISIBLE {
            manager.push(Notification::success(format!("visible-{i}")));
        }
        manager.push(Notification::success("queued"));

        assert!(manager.dismiss(first_id));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);
        assert!(manager.contains_key("queued"));
    }

    #[test]
    fn dismiss_nonexistent_returns_false() {
        let mut manager = Manager::new();
        let fake_id = Notification::success("temp").id();
        assert!(!manager.dismiss(fake_id));
    }

    #[test]
    fn error_notifications_do_not_auto_dismiss() {
        let mut manager = Manager::new();
        let notification = Notification::error("notification-invalid-face");
        let id = notification.id();
        manager.push(notification);

        manager.tick();
        assert_eq!(manager.visible_count(), 1);

        manager.handle_message(&Message::Dismiss(id));
        assert_eq!(manager.visible_count(), 0);
    }

    #[test]
    fn clear_errors_keeps_other_severities() {
        let mut manager = Manager::new();
        manager.push(Notification::error("notification-invalid-face"));
        manager.push(Notification::error("notification-transport-error"));
        manager.push(Notification::warning("notification-camera-error"));
        manager.push(Notification::success("notification-generate-success"));
        assert_eq!(manager.queued_count(), 1);

        manager.clear_errors();

        assert_eq!(manager.visible_count(), 2);
        assert_eq!(manager.queued_count(), 0);
        assert!(!manager.contains_key("notification-invalid-face"));
        assert!(manager.contains_key("notification-generate-success"));
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Toast notification system for user feedback.
//!
//! Every outcome the user must hear about (missing image, invalid face,
//! generated video, camera or download failures) goes through a toast.
//!
//! # Usage
//!
//! ```ignore
//! use crate::ui::notifications::{Manager, Notification};
//!
//! let mut manager = Manager::new();
//! manager.push(Notification::success("notification-generate-success"));
//!
//! let toast_overlay = Toast::view_overlay(&manager, &i18n).map(Message::Notification);
//! ```
//!
//! - Toast duration: 3s for success/info, 5s for warnings, manual dismiss for errors
//! - Max visible toasts: 3 (others are queued)
//! - Position: bottom-right corner

mod manager;
mod notification;
mod toast;

pub use manager::{Manager, Message as NotificationMessage};
pub use notification::{Notification, NotificationId, Severity};
pub use toast::Toast;

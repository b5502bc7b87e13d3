use crate::render::render_notification;

use mkt_core::Notification;
use mkt_realtime::ToastSink;

/// Prints incoming notifications to stdout as one-line toasts
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalToast;

impl ToastSink for TerminalToast {
    fn show(&self, notification: &Notification) {
        println!("{}", render_notification(notification));
    }
}

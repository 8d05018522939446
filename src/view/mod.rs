//! HTML fragment rendering. Every function is pure: data in, markup out.
//! Interpolated text is always escaped.

pub mod admin;
pub mod chat;
pub mod format;
pub mod professional;
pub mod professionals;

use crate::notify::Notification;

use format::escape_html;

/// Table row shown in place of an empty admin table.
pub(crate) fn empty_table_row(message: &str) -> String {
    format!(
        r#"<tr><td colspan="6" class="empty-state-cell"><i class="fas fa-inbox fa-2x empty-state-icon"></i> {}</td></tr>"#,
        escape_html(message)
    )
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|notification| {
            format!(
                r#"<div class="notification notification-{kind}" data-id="{id}"><div class="notification-content"><i class="fas {icon}"></i><span>{message}</span></div><button class="notification-close" data-dismiss="{id}"><i class="fas fa-times"></i></button></div>"#,
                kind = notification.kind,
                id = notification.id,
                icon = notification.kind.icon(),
                message = escape_html(&notification.message),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationKind, Notifier};

    #[test]
    fn notifications_are_escaped_and_tagged() {
        let notifier = Notifier::default();
        notifier.show(NotificationKind::Error, "Erro no login: <script>");
        let html = render_notifications(&notifier.active());
        assert!(html.contains("notification-error"));
        assert!(html.contains("fa-exclamation-triangle"));
        assert!(html.contains("Erro no login: &lt;script&gt;"));
        assert_eq!(render_notifications(&[]), "");
    }
}

use chrono::{DateTime, Utc};

use crate::common::records::{
    Activity, AdminService, AdminStats, AdminUser, SystemSettings, SystemStatus, UserAction,
};

use super::empty_table_row;
use super::format::{
    activity_icon, currency, date, escape_html, service_status_class, service_status_text,
    time_ago, truncate, user_status_class, user_status_text, user_type_text,
};

/// Moderation actions offered for a user row, besides "view".
pub fn available_actions(user: &AdminUser) -> Vec<UserAction> {
    match user.status.as_str() {
        "pending" => vec![UserAction::Verify, UserAction::Reject],
        "active" if user.user_type == "professional" => vec![UserAction::Suspend],
        "suspended" => vec![UserAction::Activate],
        _ => Vec::new(),
    }
}

fn action_button(user_id: &str, action: UserAction) -> String {
    let (style, icon, title) = match action {
        UserAction::Verify => ("btn-success", "fa-check", "Aprovar"),
        UserAction::Reject => ("btn-danger", "fa-times", "Rejeitar"),
        UserAction::Suspend => ("btn-warning", "fa-pause", "Suspender"),
        UserAction::Activate => ("btn-success", "fa-play", "Ativar"),
    };
    format!(
        r#"<button class="btn {style} btn-sm user-action" data-user-id="{user_id}" data-action="{action}" title="{title}"><i class="fas {icon}"></i></button>"#,
        action = action.path_segment(),
    )
}

pub fn render_user_actions(user: &AdminUser) -> String {
    let user_id = escape_html(&user.id.0);
    let mut html = format!(
        r#"<button class="btn btn-outline btn-sm user-action" data-user-id="{user_id}" data-action="view" title="Ver detalhes"><i class="fas fa-eye"></i></button>"#
    );
    for action in available_actions(user) {
        html.push_str(&action_button(&user_id, action));
    }
    html
}

pub fn render_users(users: &[AdminUser]) -> String {
    if users.is_empty() {
        return empty_table_row("Nenhum usuário encontrado");
    }
    users
        .iter()
        .map(|user| {
            let avatar = if user.user_type == "professional" {
                "fa-user-tie"
            } else {
                "fa-user"
            };
            format!(
                concat!(
                    "<tr><td>",
                    r#"<div class="user-info-cell"><div class="user-avatar-small"><i class="fas {avatar}"></i></div>"#,
                    r#"<div class="user-details"><strong>{name}</strong><small>{email}</small></div></div>"#,
                    "</td><td>{kind}</td>",
                    r#"<td><span class="status-badge {status_class}">{status}</span></td>"#,
                    "<td>{created}</td>",
                    r#"<td class="action-btns">{actions}</td></tr>"#
                ),
                avatar = avatar,
                name = escape_html(user.display_name()),
                email = escape_html(user.email.as_deref().unwrap_or("Sem email")),
                kind = escape_html(user_type_text(&user.user_type)),
                status_class = user_status_class(&user.status),
                status = user_status_text(&user.status),
                created = date(user.created_at.as_deref()),
                actions = render_user_actions(user),
            )
        })
        .collect()
}

pub fn render_services(services: &[AdminService]) -> String {
    if services.is_empty() {
        return empty_table_row("Nenhum serviço encontrado");
    }
    services
        .iter()
        .map(|service| {
            let description = match service.description.as_deref() {
                Some(text) if !text.is_empty() => format!(
                    r#"<br><small class="service-description">{}</small>"#,
                    escape_html(&truncate(text, 50))
                ),
                _ => String::new(),
            };
            format!(
                concat!(
                    "<tr><td><strong>{title}</strong>{description}</td>",
                    "<td>{professional}</td><td>{client}</td>",
                    r#"<td><span class="status-badge {status_class}">{status}</span></td>"#,
                    "<td>{price}</td><td>{created}</td></tr>"
                ),
                title = escape_html(service.title.as_deref().unwrap_or("Serviço sem título")),
                description = description,
                professional = escape_html(service.professional_name.as_deref().unwrap_or("N/A")),
                client = escape_html(service.client_name.as_deref().unwrap_or("N/A")),
                status_class = service_status_class(&service.status),
                status = service_status_text(&service.status),
                price = currency(service.price),
                created = date(service.created_at.as_deref()),
            )
        })
        .collect()
}

pub fn render_activities(activities: &[Activity], now: DateTime<Utc>) -> String {
    if activities.is_empty() {
        return concat!(
            r#"<div class="empty-activities"><i class="fas fa-inbox"></i>"#,
            "<p>Nenhuma atividade recente</p></div>"
        )
        .to_string();
    }
    activities
        .iter()
        .map(|activity| {
            format!(
                concat!(
                    r#"<div class="activity-item"><div class="activity-icon {kind}"><i class="{icon}"></i></div>"#,
                    r#"<div class="activity-content"><p class="activity-title"><strong>{title}</strong></p>"#,
                    r#"<p class="activity-description">{description}</p>"#,
                    r#"<span class="activity-time">{time}</span></div></div>"#
                ),
                kind = escape_html(&activity.kind),
                icon = activity_icon(&activity.kind),
                title = escape_html(&activity.title),
                description = escape_html(&activity.description),
                time = time_ago(activity.timestamp.as_deref(), now),
            )
        })
        .collect()
}

/// Counter cards, keyed by the element ids the dashboard page uses.
pub fn render_stats(stats: &AdminStats) -> String {
    let cards = [
        ("totalUsers", stats.total_users.to_string()),
        ("totalProfessionals", stats.total_professionals.to_string()),
        ("totalServices", stats.total_services.to_string()),
        ("pendingVerifications", stats.pending_verifications.to_string()),
        ("totalReports", stats.total_reports.to_string()),
        ("totalRevenue", currency(stats.total_revenue)),
        ("activeServices", stats.active_services.to_string()),
        ("completedServices", stats.completed_services.to_string()),
    ];
    cards
        .iter()
        .map(|(id, value)| format!(r#"<span class="stat-number" id="{id}">{value}</span>"#))
        .collect()
}

pub fn render_system_status(status: &SystemStatus) -> String {
    [
        ("webServerStatus", "Servidor Web", &status.web_server),
        ("databaseStatus", "Base de Dados", &status.database),
        ("apiStatus", "API", &status.api),
        ("chatStatus", "Chat", &status.chat),
    ]
    .iter()
    .map(|(id, label, value)| {
        let class = if value.as_str() == "online" {
            "status-online"
        } else {
            "status-offline"
        };
        format!(
            r#"<div class="status-item"><span>{label}</span><span id="{id}" class="status-indicator {class}">{}</span></div>"#,
            escape_html(value)
        )
    })
    .collect()
}

pub fn render_settings(settings: &SystemSettings) -> String {
    let checked = |flag: bool| if flag { " checked" } else { "" };
    format!(
        concat!(
            r#"<form id="systemSettingsForm">"#,
            r#"<input name="siteName" value="{site_name}">"#,
            r#"<textarea name="siteDescription">{site_description}</textarea>"#,
            r#"<input name="adminEmail" type="email" value="{admin_email}">"#,
            r#"<input name="comissionRate" type="number" value="{commission}">"#,
            r#"<input name="maxServices" type="number" value="{max_services}">"#,
            r#"<input name="autoApprove" type="checkbox"{auto_approve}>"#,
            r#"<input name="passwordMinLength" type="number" value="{password_min}">"#,
            r#"<input name="maxLoginAttempts" type="number" value="{max_attempts}">"#,
            r#"<input name="sessionTimeout" type="number" value="{session_timeout}">"#,
            r#"<input name="emailNotifications" type="checkbox"{email}>"#,
            r#"<input name="pushNotifications" type="checkbox"{push}>"#,
            r#"<input name="smsNotifications" type="checkbox"{sms}>"#,
            r#"<input name="maintenanceMode" type="checkbox"{maintenance}>"#,
            r#"<textarea name="maintenanceMessage">{maintenance_message}</textarea>"#,
            "</form>"
        ),
        site_name = escape_html(&settings.site_name),
        site_description = escape_html(&settings.site_description),
        admin_email = escape_html(&settings.admin_email),
        commission = settings.commission_rate,
        max_services = settings.max_services,
        auto_approve = checked(settings.auto_approve),
        password_min = settings.password_min_length,
        max_attempts = settings.max_login_attempts,
        session_timeout = settings.session_timeout,
        email = checked(settings.email_notifications),
        push = checked(settings.push_notifications),
        sms = checked(settings.sms_notifications),
        maintenance = checked(settings.maintenance_mode),
        maintenance_message = escape_html(&settings.maintenance_message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Id;

    fn user(status: &str, user_type: &str) -> AdminUser {
        AdminUser {
            id: Id::from("u1"),
            username: Some("ana".into()),
            full_name: None,
            email: None,
            user_type: user_type.into(),
            status: status.into(),
            created_at: Some("2025-02-01T08:00:00".into()),
        }
    }

    #[test]
    fn actions_follow_status() {
        assert_eq!(
            available_actions(&user("pending", "client")),
            vec![UserAction::Verify, UserAction::Reject]
        );
        assert_eq!(
            available_actions(&user("active", "professional")),
            vec![UserAction::Suspend]
        );
        assert!(available_actions(&user("active", "client")).is_empty());
        assert_eq!(
            available_actions(&user("suspended", "client")),
            vec![UserAction::Activate]
        );

        let html = render_user_actions(&user("pending", "client"));
        assert!(html.contains(r#"data-action="view""#));
        assert!(html.contains(r#"data-action="reject""#));
    }

    #[test]
    fn user_rows_render_labels() {
        let html = render_users(&[user("suspended", "professional")]);
        assert!(html.contains("fa-user-tie"));
        assert!(html.contains("Profissional"));
        assert!(html.contains("Suspenso"));
        assert!(html.contains("Sem email"));
        assert!(html.contains("01/02/2025"));
    }

    #[test]
    fn empty_collections_render_empty_states() {
        assert!(render_users(&[]).contains("Nenhum usuário encontrado"));
        assert!(render_services(&[]).contains("Nenhum serviço encontrado"));
        assert!(render_activities(&[], Utc::now()).contains("Nenhuma atividade recente"));
    }

    #[test]
    fn service_rows_truncate_description() {
        let service = AdminService {
            id: Id::from(1),
            title: None,
            description: Some("x".repeat(60)),
            professional_name: None,
            client_name: Some("Ana".into()),
            status: "completed".into(),
            price: 2500.0,
            created_at: None,
        };
        let html = render_services(&[service]);
        assert!(html.contains("Serviço sem título"));
        assert!(html.contains(&format!("{}...", "x".repeat(50))));
        assert!(html.contains("2.500,00 MT"));
        assert!(html.contains("status-completed"));
    }

    #[test]
    fn default_status_and_settings_render() {
        let html = render_system_status(&SystemStatus::default());
        assert!(html.contains(r#"id="databaseStatus" class="status-indicator status-offline">offline"#));
        let html = render_settings(&SystemSettings::default());
        assert!(html.contains(r#"value="TxunaJob""#));
        assert!(html.contains(r#"name="emailNotifications" type="checkbox" checked"#));
        assert!(html.contains(r#"name="smsNotifications" type="checkbox">"#));
    }
}

use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::common::Id;
use crate::common::records::{
    Activity, AdminService, AdminStats, AdminUser, SystemSettings, SystemStatus, UserAction,
};
use crate::notify::Notifier;
use crate::view::admin as view;

use super::refresh::{RefreshGuard, report_failures, slice};

const SLICES: usize = 5;

/// Everything one admin refresh produced. Failed slices hold their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSnapshot {
    pub stats: AdminStats,
    pub users: Vec<AdminUser>,
    pub services: Vec<AdminService>,
    pub activities: Vec<Activity>,
    pub system_status: SystemStatus,
    pub failures: Vec<&'static str>,
}

impl AdminSnapshot {
    pub fn render(&self, now: DateTime<Utc>) -> String {
        format!(
            concat!(
                r#"<section id="adminStats">{}</section>"#,
                r#"<table id="usersTable"><tbody id="usersTableBody">{}</tbody></table>"#,
                r#"<table id="servicesTable"><tbody id="servicesTableBody">{}</tbody></table>"#,
                r#"<section id="recentActivities">{}</section>"#,
                r#"<section id="systemStatus">{}</section>"#
            ),
            view::render_stats(&self.stats),
            view::render_users(&self.users),
            view::render_services(&self.services),
            view::render_activities(&self.activities, now),
            view::render_system_status(&self.system_status),
        )
    }
}

pub fn fallback_activities(now: DateTime<Utc>) -> Vec<Activity> {
    vec![Activity {
        kind: "system".to_string(),
        title: "Sistema Carregado".to_string(),
        description: "Dashboard administrativo inicializado".to_string(),
        timestamp: Some(now.to_rfc3339()),
    }]
}

pub struct AdminDashboard {
    api: ApiClient,
    notifier: Notifier,
    guard: RefreshGuard,
}

impl AdminDashboard {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            guard: RefreshGuard::default(),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.guard.is_refreshing()
    }

    /// Fetches all slices concurrently. Returns `None` without fetching
    /// anything when a previous refresh is still outstanding.
    pub async fn refresh(&self) -> Option<AdminSnapshot> {
        let Some(_ticket) = self.guard.try_begin() else {
            log::debug!("Admin refresh already in flight; skipped");
            return None;
        };

        let (stats, users, services, activities, system_status) = tokio::join!(
            self.api.admin_stats(),
            self.api.admin_users(),
            self.api.admin_services(),
            self.api.admin_activities(),
            self.api.admin_system_status(),
        );

        let mut failures = Vec::new();
        let snapshot = AdminSnapshot {
            stats: slice("stats", stats, &mut failures).unwrap_or_default(),
            users: slice("users", users, &mut failures).unwrap_or_default(),
            services: slice("services", services, &mut failures).unwrap_or_default(),
            activities: slice("activities", activities, &mut failures)
                .unwrap_or_else(|| fallback_activities(Utc::now())),
            system_status: slice("system_status", system_status, &mut failures)
                .unwrap_or_default(),
            failures,
        };
        report_failures(&self.notifier, &snapshot.failures, SLICES);
        log::info!(
            "Admin dashboard refreshed ({} users, {} services)",
            snapshot.users.len(),
            snapshot.services.len()
        );
        Some(snapshot)
    }

    pub async fn load_settings(&self) -> SystemSettings {
        match self.api.admin_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Settings unavailable: {err}");
                self.notifier.error("Erro ao carregar configurações");
                SystemSettings::default()
            }
        }
    }

    pub async fn save_settings(&self, settings: &SystemSettings) -> bool {
        match self.api.save_admin_settings(settings).await {
            Ok(()) => {
                self.notifier.success("Configurações salvas com sucesso!");
                true
            }
            Err(err) => {
                self.notifier
                    .error(format!("Erro ao salvar configurações: {}", err.user_message()));
                false
            }
        }
    }

    pub async fn user_action(&self, user_id: &Id, action: UserAction) -> bool {
        match self.api.admin_user_action(user_id, action).await {
            Ok(()) => {
                let message = match action {
                    UserAction::Verify => "Usuário verificado com sucesso!",
                    UserAction::Reject => "Usuário rejeitado.",
                    UserAction::Suspend => "Usuário suspenso.",
                    UserAction::Activate => "Usuário ativado com sucesso!",
                };
                self.notifier.success(message);
                true
            }
            Err(err) => {
                self.notifier
                    .error(format!("Erro ao executar ação: {}", err.user_message()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn ok(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    #[tokio::test]
    async fn one_failing_slice_does_not_blank_the_rest() {
        let server = MockServer::start().await;
        mount(&server, "/admin/stats", ok(json!({"success": true, "stats": {"totalUsers": 12}}))).await;
        mount(
            &server,
            "/admin/users",
            ok(json!([{"id": "u1", "username": "ana", "status": "pending", "user_type": "client"}])),
        )
        .await;
        mount(&server, "/admin/services", ResponseTemplate::new(500)).await;
        mount(&server, "/admin/activities", ok(json!({"success": false, "error": "x"}))).await;
        mount(
            &server,
            "/admin/system-status",
            ok(json!({"success": true, "status": {"web_server": "online", "database": "online", "api": "online", "chat": "online"}})),
        )
        .await;

        let notifier = Notifier::default();
        let dashboard = AdminDashboard::new(
            ApiClient::new(server.uri(), Duration::from_secs(2)),
            notifier.clone(),
        );
        let snapshot = dashboard.refresh().await.unwrap();

        assert_eq!(snapshot.stats.total_users, 12);
        assert_eq!(snapshot.users.len(), 1);
        assert!(snapshot.services.is_empty());
        assert_eq!(snapshot.activities[0].title, "Sistema Carregado");
        assert_eq!(snapshot.system_status.database, "online");
        assert_eq!(snapshot.failures, vec!["services", "activities"]);
        assert!(notifier.latest().unwrap().message.contains("services, activities"));

        let html = snapshot.render(Utc::now());
        assert!(html.contains("Nenhum serviço encontrado"));
        assert!(html.contains("Sistema Carregado"));
    }

    #[tokio::test]
    async fn unreachable_backend_yields_defaults() {
        let notifier = Notifier::default();
        let dashboard = AdminDashboard::new(
            ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)),
            notifier.clone(),
        );
        let snapshot = dashboard.refresh().await.unwrap();
        assert_eq!(snapshot.stats, AdminStats::default());
        assert_eq!(snapshot.system_status, SystemStatus::default());
        assert_eq!(snapshot.failures.len(), SLICES);
        assert_eq!(
            notifier.latest().unwrap().message,
            "Erro ao carregar dados. Verifique sua conexão."
        );
    }

    #[tokio::test]
    async fn overlapping_refresh_returns_immediately() {
        let server = MockServer::start().await;
        for route in [
            "/admin/stats",
            "/admin/users",
            "/admin/services",
            "/admin/activities",
            "/admin/system-status",
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ok(json!([])).set_delay(Duration::from_millis(300)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let dashboard = Arc::new(AdminDashboard::new(
            ApiClient::new(server.uri(), Duration::from_secs(2)),
            Notifier::default(),
        ));
        let first = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(dashboard.is_refreshing());
        assert!(dashboard.refresh().await.is_none());

        assert!(first.await.unwrap().is_some());
        assert!(!dashboard.is_refreshing());
    }

    #[tokio::test]
    async fn slow_slice_times_out_alone() {
        let server = MockServer::start().await;
        mount(&server, "/admin/stats", ok(json!({"stats": {"totalServices": 4}}))).await;
        mount(&server, "/admin/users", ok(json!([]))).await;
        mount(&server, "/admin/services", ok(json!([]))).await;
        mount(&server, "/admin/activities", ok(json!([]))).await;
        mount(
            &server,
            "/admin/system-status",
            ok(json!({})).set_delay(Duration::from_secs(2)),
        )
        .await;

        let dashboard = AdminDashboard::new(
            ApiClient::new(server.uri(), Duration::from_millis(200)),
            Notifier::default(),
        );
        let snapshot = dashboard.refresh().await.unwrap();
        assert_eq!(snapshot.stats.total_services, 4);
        assert!(snapshot.activities.is_empty());
        assert_eq!(snapshot.failures, vec!["system_status"]);
    }

    #[tokio::test]
    async fn settings_fall_back_and_actions_notify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/users/u1/verify"))
            .respond_with(ok(json!({"success": true})))
            .mount(&server)
            .await;

        let notifier = Notifier::default();
        let dashboard = AdminDashboard::new(
            ApiClient::new(server.uri(), Duration::from_secs(2)),
            notifier.clone(),
        );

        assert_eq!(dashboard.load_settings().await, SystemSettings::default());
        assert_eq!(
            notifier.latest().unwrap().message,
            "Erro ao carregar configurações"
        );

        assert!(dashboard.user_action(&Id::from("u1"), UserAction::Verify).await);
        assert_eq!(
            notifier.latest().unwrap().message,
            "Usuário verificado com sucesso!"
        );
        assert!(!dashboard.user_action(&Id::from("u2"), UserAction::Suspend).await);
    }
}

//! Dashboard records as served by the `/admin/*` and `/professional/*` endpoints.

use serde::{Deserialize, Serialize};

use super::types::{Id, de_opt_amount};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_professionals: u64,
    pub total_services: u64,
    pub pending_verifications: u64,
    pub total_reports: u64,
    pub total_revenue: f64,
    pub active_services: u64,
    pub completed_services: u64,
    pub new_users_month: u64,
    pub services_month: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Id,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminUser {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.username.as_deref())
            .unwrap_or("Sem nome")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminService {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub professional_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub web_server: String,
    pub database: String,
    pub api: String,
    pub chat: String,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            web_server: "online".to_string(),
            database: "offline".to_string(),
            api: "online".to_string(),
            chat: "offline".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemSettings {
    pub site_name: String,
    pub site_description: String,
    pub admin_email: String,
    // Wire name keeps the backend's spelling.
    #[serde(rename = "comissionRate")]
    pub commission_rate: f64,
    pub max_services: u32,
    pub auto_approve: bool,
    pub password_min_length: u32,
    pub max_login_attempts: u32,
    pub session_timeout: u32,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub sms_notifications: bool,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            site_name: "TxunaJob".to_string(),
            site_description: "Plataforma de serviços profissionais em Moçambique".to_string(),
            admin_email: "admin@txunajob.com".to_string(),
            commission_rate: 15.0,
            max_services: 10,
            auto_approve: false,
            password_min_length: 8,
            max_login_attempts: 5,
            session_timeout: 120,
            email_notifications: true,
            push_notifications: true,
            sms_notifications: false,
            maintenance_mode: false,
            maintenance_message: "Sistema em manutenção. Volte em breve!".to_string(),
        }
    }
}

/// Moderation actions on `/admin/users/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Verify,
    Reject,
    Suspend,
    Activate,
}

impl UserAction {
    pub fn path_segment(self) -> &'static str {
        match self {
            UserAction::Verify => "verify",
            UserAction::Reject => "reject",
            UserAction::Suspend => "suspend",
            UserAction::Activate => "activate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub is_verified: bool,
}

/// Response of `/professional/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalAccount {
    pub id: Id,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub professional_profile: ProfessionalProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalStats {
    pub active_services: u64,
    pub average_rating: f64,
    pub monthly_clients: u64,
    pub unread_messages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub service_title: String,
}

/// Body of `POST /professional/services/create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub price: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub scheduled_date: Option<String>,
}

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::api::ApiClient;
use crate::common::Id;
use crate::common::records::{
    NewService, ProfessionalAccount, ProfessionalStats, Review, ServiceItem,
};
use crate::notify::Notifier;
use crate::view::format::parse_timestamp;
use crate::view::professional as view;

use super::refresh::{RefreshGuard, report_failures, slice};

const SLICES: usize = 5;
const DEFAULT_SPECIALTY: &str = "Eletricista";
const DEFAULT_LOCATION: &str = "Maputo";

#[derive(Debug, Clone, PartialEq)]
pub struct ProfessionalSnapshot {
    pub account: Option<ProfessionalAccount>,
    pub stats: ProfessionalStats,
    pub services: Vec<ServiceItem>,
    pub schedule: Vec<ServiceItem>,
    pub reviews: Vec<Review>,
    pub failures: Vec<&'static str>,
}

impl ProfessionalSnapshot {
    pub fn render(&self, now: DateTime<Utc>) -> String {
        let header = self
            .account
            .as_ref()
            .map(view::render_header)
            .unwrap_or_default();
        format!(
            concat!(
                r#"<div class="dashboard-welcome">{}</div>"#,
                r#"<section class="stats">{}</section>"#,
                r#"<div class="service-list">{}</div>"#,
                r#"<aside class="dashboard-sidebar"><div class="service-list">{}</div></aside>"#,
                r#"<div class="message-list">{}</div>"#
            ),
            header,
            view::render_stats(&self.stats),
            view::render_services(&self.services, now),
            view::render_schedule(&self.schedule, now),
            view::render_reviews(&self.reviews),
        )
    }
}

/// Demo services built around the professional's specialty and town.
pub fn fallback_services(
    account: Option<&ProfessionalAccount>,
    now: DateTime<Utc>,
) -> Vec<ServiceItem> {
    let specialty = account
        .map(|account| account.professional_profile.specialty.as_str())
        .filter(|specialty| !specialty.is_empty())
        .unwrap_or(DEFAULT_SPECIALTY);
    let location = account
        .and_then(|account| account.location.as_deref())
        .filter(|location| !location.is_empty())
        .unwrap_or(DEFAULT_LOCATION);

    let demo = [
        DemoService {
            title: format!("Instalação {specialty} - Casa Silva"),
            description: format!("Instalação completa do sistema em {location}"),
            client: "Maria Silva",
            days_ahead: 0,
            status: "in_progress",
            price: 2500.0,
            address: "Bairro Central",
        },
        DemoService {
            title: format!("Manutenção {specialty} - Empresa ABC"),
            description: "Manutenção preventiva do sistema".to_string(),
            client: "João Carlos",
            days_ahead: 1,
            status: "pending",
            price: 1800.0,
            address: "Zona Industrial",
        },
        DemoService {
            title: format!("Reparo {specialty} - Apartamento 302"),
            description: "Reparo nas instalações".to_string(),
            client: "Ana Santos",
            days_ahead: 2,
            status: "pending",
            price: 950.0,
            address: "Av. Principal",
        },
    ];

    demo.into_iter()
        .zip(1..)
        .map(|(demo, id): (DemoService, i64)| ServiceItem {
            id: Id::from(id),
            title: demo.title,
            description: demo.description,
            client_name: demo.client.to_string(),
            date: Some((now + Duration::days(demo.days_ahead)).to_rfc3339()),
            status: demo.status.to_string(),
            price: demo.price,
            address: format!("{}, {location}", demo.address),
            category: specialty.to_string(),
        })
        .collect()
}

struct DemoService {
    title: String,
    description: String,
    client: &'static str,
    days_ahead: i64,
    status: &'static str,
    price: f64,
    address: &'static str,
}

/// Upcoming services (from now on), soonest first, at most three.
pub fn upcoming_schedule(services: &[ServiceItem], now: DateTime<Utc>) -> Vec<ServiceItem> {
    let mut upcoming: Vec<(DateTime<Utc>, &ServiceItem)> = services
        .iter()
        .filter_map(|service| {
            let at = service.date.as_deref().and_then(parse_timestamp)?;
            (at >= now).then_some((at, service))
        })
        .collect();
    upcoming.sort_by_key(|(at, _)| *at);
    upcoming
        .into_iter()
        .take(3)
        .map(|(_, service)| service.clone())
        .collect()
}

pub fn fallback_reviews(now: DateTime<Utc>) -> Vec<Review> {
    vec![
        Review {
            id: Id::from(1),
            client_name: "Maria Santos".to_string(),
            rating: 5.0,
            comment: "Excelente profissional! Muito competente e educado. Recomendo!".to_string(),
            date: Some((now - Duration::days(1)).to_rfc3339()),
            service_title: "Instalação Elétrica Residencial".to_string(),
        },
        Review {
            id: Id::from(2),
            client_name: "João Carlos".to_string(),
            rating: 4.5,
            comment: "Trabalho bem feito e dentro do prazo combinado. Muito satisfeito!"
                .to_string(),
            date: Some((now - Duration::days(2)).to_rfc3339()),
            service_title: "Manutenção Preventiva".to_string(),
        },
    ]
}

/// Stats derived from the local services and reviews. Unread messages are
/// unknown locally and stay at zero.
pub fn computed_stats(
    services: &[ServiceItem],
    reviews: &[Review],
    now: DateTime<Utc>,
) -> ProfessionalStats {
    let active_services = services
        .iter()
        .filter(|service| matches!(service.status.as_str(), "in_progress" | "pending"))
        .count() as u64;
    let average_rating = if reviews.is_empty() {
        0.0
    } else {
        reviews.iter().map(|review| review.rating).sum::<f64>() / reviews.len() as f64
    };
    let monthly_clients = services
        .iter()
        .filter_map(|service| service.date.as_deref().and_then(parse_timestamp))
        .filter(|at| at.year() == now.year() && at.month() == now.month())
        .count() as u64;

    ProfessionalStats {
        active_services,
        average_rating,
        monthly_clients,
        unread_messages: 0,
    }
}

pub struct ProfessionalDashboard {
    api: ApiClient,
    notifier: Notifier,
    guard: RefreshGuard,
}

impl ProfessionalDashboard {
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

    /// Same single-flight contract as the admin dashboard.
    pub async fn refresh(&self) -> Option<ProfessionalSnapshot> {
        let Some(_ticket) = self.guard.try_begin() else {
            log::debug!("Professional refresh already in flight; skipped");
            return None;
        };

        let (account, stats, services, schedule, reviews) = tokio::join!(
            self.api.professional_current(),
            self.api.professional_stats(),
            self.api.professional_services(),
            self.api.professional_schedule(),
            self.api.professional_reviews(),
        );

        let now = Utc::now();
        let mut failures = Vec::new();
        let account = slice("current", account, &mut failures);
        let stats = slice("stats", stats, &mut failures);
        let services = slice("services", services, &mut failures)
            .unwrap_or_else(|| fallback_services(account.as_ref(), now));
        let schedule = slice("schedule", schedule, &mut failures)
            .unwrap_or_else(|| upcoming_schedule(&services, now));
        let reviews =
            slice("reviews", reviews, &mut failures).unwrap_or_else(|| fallback_reviews(now));
        let stats = stats.unwrap_or_else(|| computed_stats(&services, &reviews, now));

        report_failures(&self.notifier, &failures, SLICES);
        Some(ProfessionalSnapshot {
            account,
            stats,
            services,
            schedule,
            reviews,
            failures,
        })
    }

    pub async fn create_service(&self, service: &NewService) -> bool {
        if service.title.trim().is_empty() {
            self.notifier.error("Indique o título do serviço");
            return false;
        }
        match self.api.create_service(service).await {
            Ok(()) => {
                self.notifier.success("Serviço criado com sucesso!");
                true
            }
            Err(err) => {
                self.notifier
                    .error(format!("Erro ao criar serviço: {}", err.user_message()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration as StdDuration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn fallback_services_use_profile() {
        let account: ProfessionalAccount = serde_json::from_value(json!({
            "id": 1, "location": "Beira", "professional_profile": {"specialty": "Canalização"}
        }))
        .unwrap();
        let services = fallback_services(Some(&account), at(2025, 3, 10));
        assert_eq!(services.len(), 3);
        assert_eq!(services[0].title, "Instalação Canalização - Casa Silva");
        assert_eq!(services[2].address, "Av. Principal, Beira");
        assert_eq!(services[1].id, Id::from(2));
        assert_eq!(services[1].status, "pending");
        assert_eq!(services[1].category, "Canalização");
        assert_eq!(
            services[2].date.as_deref(),
            Some((at(2025, 3, 10) + Duration::days(2)).to_rfc3339().as_str())
        );

        let defaults = fallback_services(None, at(2025, 3, 10));
        assert_eq!(defaults[1].title, "Manutenção Eletricista - Empresa ABC");
        assert_eq!(defaults[0].description, "Instalação completa do sistema em Maputo");
    }

    #[test]
    fn schedule_is_sorted_upcoming_only() {
        let now = at(2025, 3, 10);
        let mut services = fallback_services(None, now);
        services.reverse();
        services[0].date = Some(at(2025, 3, 1).to_rfc3339());
        let schedule = upcoming_schedule(&services, now);
        let titles: Vec<_> = schedule.iter().map(|s| s.client_name.as_str()).collect();
        assert_eq!(titles, vec!["Maria Silva", "João Carlos"]);
    }

    #[test]
    fn stats_computed_without_randomness() {
        let now = at(2025, 3, 10);
        let services = fallback_services(None, now);
        let stats = computed_stats(&services, &fallback_reviews(now), now);
        assert_eq!(stats.active_services, 3);
        assert_eq!(stats.average_rating, 4.75);
        assert_eq!(stats.monthly_clients, 3);
        assert_eq!(stats.unread_messages, 0);
        assert_eq!(computed_stats(&[], &[], now).average_rating, 0.0);
    }

    #[tokio::test]
    async fn failed_endpoints_fall_back_per_slice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/professional/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5, "username": "maria", "location": "Matola",
                "professional_profile": {"specialty": "Pintura"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/professional/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "client_name": "Rui", "rating": 3, "comment": "Ok"}
            ])))
            .mount(&server)
            .await;

        let notifier = Notifier::default();
        let dashboard = ProfessionalDashboard::new(
            ApiClient::new(server.uri(), StdDuration::from_secs(2)),
            notifier.clone(),
        );
        let snapshot = dashboard.refresh().await.unwrap();

        assert_eq!(snapshot.failures, vec!["stats", "services", "schedule"]);
        assert_eq!(snapshot.services[0].title, "Instalação Pintura - Casa Silva");
        assert_eq!(snapshot.reviews.len(), 1);
        assert_eq!(snapshot.stats.average_rating, 3.0);
        assert_eq!(snapshot.stats.unread_messages, 0);
        assert!(!snapshot.schedule.is_empty());
        assert!(notifier.latest().is_some());

        let html = snapshot.render(Utc::now());
        assert!(html.contains("Bem-vindo, maria!"));
        assert!(html.contains("★★★☆☆"));
    }

    #[tokio::test]
    async fn create_service_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/professional/services/create"))
            .and(body_partial_json(json!({"title": "Pintura de sala", "price": "1200"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::default();
        let dashboard = ProfessionalDashboard::new(
            ApiClient::new(server.uri(), StdDuration::from_secs(2)),
            notifier.clone(),
        );
        let service = NewService {
            title: "Pintura de sala".into(),
            price: Some("1200".into()),
            ..NewService::default()
        };
        assert!(dashboard.create_service(&service).await);
        assert_eq!(notifier.latest().unwrap().message, "Serviço criado com sucesso!");

        assert!(!dashboard.create_service(&NewService::default()).await);
    }
}

use chrono::{DateTime, Utc};

use crate::common::records::{ProfessionalAccount, ProfessionalStats, Review, ServiceItem};

use super::format::{escape_html, parse_timestamp};

fn status_text(status: &str) -> &str {
    match status {
        "in_progress" => "Em Andamento",
        "pending" => "Agendado",
        "completed" => "Concluído",
        "cancelled" => "Cancelado",
        other => other,
    }
}

/// "Hoje", "Amanhã", "Ontem", "3 dias atrás", else `dd/mm`.
pub fn service_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = raw.and_then(parse_timestamp) else {
        return String::new();
    };
    match (parsed.date_naive() - now.date_naive()).num_days() {
        0 => "Hoje".to_string(),
        1 => "Amanhã".to_string(),
        -1 => "Ontem".to_string(),
        days if days < 0 => format!("{} dias atrás", -days),
        _ => parsed.format("%d/%m").to_string(),
    }
}

fn schedule_date(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = raw.and_then(parse_timestamp) else {
        return String::new();
    };
    match (parsed.date_naive() - now.date_naive()).num_days() {
        0 => "Hoje".to_string(),
        1 => "Amanhã".to_string(),
        _ => parsed.format("%d/%m").to_string(),
    }
}

pub fn stars(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = if rating.fract() > 0.0 { "½" } else { "" };
    let empty = 5 - rating.ceil() as usize;
    format!("{}{half}{}", "★".repeat(full), "☆".repeat(empty))
}

pub fn render_header(account: &ProfessionalAccount) -> String {
    let mut html = format!(
        "<h1>Bem-vindo, {}! 🛠️</h1>",
        escape_html(&account.username)
    );
    let specialty = &account.professional_profile.specialty;
    if !specialty.is_empty() {
        html.push_str(&format!(
            r#"<span class="specialty-badge"><i class="fas fa-tools"></i> {}</span>"#,
            escape_html(specialty)
        ));
    }
    if let Some(location) = account.location.as_deref() {
        html.push_str(&format!(
            r#"<p><i class="fas fa-map-marker-alt"></i> {}</p>"#,
            escape_html(location)
        ));
    }
    html
}

pub fn render_stats(stats: &ProfessionalStats) -> String {
    format!(
        concat!(
            r#"<span class="stat-number">{}</span>"#,
            r#"<span class="stat-number">{:.1}</span>"#,
            r#"<span class="stat-number">{}</span>"#,
            r#"<span class="stat-number">{}</span>"#
        ),
        stats.active_services, stats.average_rating, stats.monthly_clients, stats.unread_messages
    )
}

/// First three services.
pub fn render_services(services: &[ServiceItem], now: DateTime<Utc>) -> String {
    if services.is_empty() {
        return r#"<p class="empty-state">Nenhum serviço encontrado</p>"#.to_string();
    }
    services
        .iter()
        .take(3)
        .map(|service| {
            format!(
                concat!(
                    r#"<div class="service-item" data-service-id="{id}"><div class="service-header">"#,
                    r#"<h3 class="service-title">{title}</h3><span class="service-date">{date}</span></div>"#,
                    r#"<p class="service-description">{description}</p>"#,
                    r#"<div class="service-footer"><span class="service-status status-{status}">{status_text}</span>"#,
                    r#"<span class="service-price">{price:.2} MT</span></div></div>"#
                ),
                id = escape_html(&service.id.0),
                title = escape_html(&service.title),
                date = service_date(service.date.as_deref(), now),
                description = escape_html(&service.description),
                status = escape_html(&service.status),
                status_text = escape_html(status_text(&service.status)),
                price = service.price,
            )
        })
        .collect()
}

pub fn render_schedule(schedule: &[ServiceItem], now: DateTime<Utc>) -> String {
    if schedule.is_empty() {
        return r#"<p class="empty-state">Sem serviços agendados</p>"#.to_string();
    }
    schedule
        .iter()
        .map(|service| {
            let time = service
                .date
                .as_deref()
                .and_then(parse_timestamp)
                .map(|parsed| parsed.format("%H:%M").to_string())
                .unwrap_or_default();
            format!(
                concat!(
                    r#"<div class="service-item"><div class="service-header">"#,
                    r#"<h3 class="service-title">{client}</h3><span class="service-date">{date}</span></div>"#,
                    r#"<p class="service-description">{time} - {title}</p></div>"#
                ),
                client = escape_html(&service.client_name),
                date = schedule_date(service.date.as_deref(), now),
                time = time,
                title = escape_html(&service.title),
            )
        })
        .collect()
}

/// First two reviews.
pub fn render_reviews(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return r#"<p class="empty-state">Ainda sem avaliações</p>"#.to_string();
    }
    reviews
        .iter()
        .take(2)
        .map(|review| {
            format!(
                concat!(
                    r#"<div class="message-item"><div class="message-header">"#,
                    r#"<h3 class="message-sender">{client}</h3><div class="rating-display">{stars}</div></div>"#,
                    r#"<p class="message-preview">{comment}</p></div>"#
                ),
                client = escape_html(&review.client_name),
                stars = stars(review.rating),
                comment = escape_html(&review.comment),
            )
        })
        .collect()
}

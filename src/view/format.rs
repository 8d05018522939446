//! Display formatting: money, dates, relative times and status labels.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Accepts RFC 3339, naive ISO date-times (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `1234.5` becomes `1.234,50 MT`; zero is `0 MT`.
pub fn currency(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "0 MT".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{sign}{},{:02} MT",
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn date(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => "N/A".to_string(),
        Some(raw) => parse_timestamp(raw)
            .map(|parsed| parsed.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "Data inválida".to_string()),
    }
}

/// Dashboard activity style: "Há 5 min", "Ontem", "Há 2 semanas".
pub fn time_ago(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = raw.and_then(parse_timestamp) else {
        return "Há algum tempo".to_string();
    };
    let elapsed = now - parsed;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Agora mesmo".to_string()
    } else if minutes < 60 {
        format!("Há {minutes} min")
    } else if hours < 24 {
        format!("Há {hours} h")
    } else if days == 1 {
        "Ontem".to_string()
    } else if days < 7 {
        format!("Há {days} dias")
    } else if days < 30 {
        format!("Há {} semanas", days / 7)
    } else {
        parsed.format("%d/%m/%Y").to_string()
    }
}

/// Chat bubble style: "Agora", "5 min atrás", else `dd/mm HH:MM`.
pub fn message_time(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = raw.and_then(parse_timestamp) else {
        return String::new();
    };
    let elapsed = now - parsed;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if minutes < 1 {
        "Agora".to_string()
    } else if minutes < 60 {
        format!("{minutes} min atrás")
    } else if hours < 24 {
        format!("{hours} h atrás")
    } else {
        parsed.format("%d/%m %H:%M").to_string()
    }
}

/// Conversation list style: `HH:MM` today, "Ontem", "3 dias", else a date.
pub fn chat_time(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(parsed) = raw.and_then(parse_timestamp) else {
        return String::new();
    };
    match (now - parsed).num_days() {
        0 => parsed.format("%H:%M").to_string(),
        1 => "Ontem".to_string(),
        days @ 2..=6 => format!("{days} dias"),
        _ => parsed.format("%d/%m/%Y").to_string(),
    }
}

pub fn user_status_text(status: &str) -> &'static str {
    match status {
        "active" => "Ativo",
        "suspended" => "Suspenso",
        "inactive" => "Inativo",
        "verified" => "Verificado",
        "rejected" => "Rejeitado",
        _ => "Pendente",
    }
}

pub fn user_status_class(status: &str) -> &'static str {
    match status {
        "active" | "verified" => "status-active",
        "suspended" | "inactive" | "rejected" => "status-inactive",
        _ => "status-pending",
    }
}

pub fn user_type_text(user_type: &str) -> &str {
    match user_type {
        "client" => "Cliente",
        "professional" => "Profissional",
        "admin" => "Administrador",
        other => other,
    }
}

pub fn service_status_text(status: &str) -> &'static str {
    match status {
        "accepted" => "Aceito",
        "in_progress" => "Em Andamento",
        "completed" => "Concluído",
        "cancelled" => "Cancelado",
        _ => "Pendente",
    }
}

pub fn service_status_class(status: &str) -> &'static str {
    match status {
        "accepted" | "in_progress" => "status-active",
        "completed" => "status-completed",
        "cancelled" => "status-inactive",
        _ => "status-pending",
    }
}

pub fn activity_icon(kind: &str) -> &'static str {
    match kind {
        "user_registered" => "fas fa-user-plus",
        "service_completed" => "fas fa-check-circle",
        "payment_processed" => "fas fa-money-bill-wave",
        "report_received" => "fas fa-exclamation-triangle",
        "user_verified" => "fas fa-user-check",
        "service_created" => "fas fa-tools",
        "system" => "fas fa-cog",
        _ => "fas fa-info-circle",
    }
}

/// Escapes text for both element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// First `max` characters plus an ellipsis when longer.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

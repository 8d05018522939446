use crate::common::{Id, ProfessionalListing};

use super::format::escape_html;

// name, category, rating, location, hourly rate, skills
type DemoRow = (
    &'static str,
    &'static str,
    f64,
    &'static str,
    &'static str,
    &'static [&'static str],
);

const DEMO_PROFESSIONALS: [DemoRow; 4] = [
    (
        "João Eletricista",
        "Eletricista",
        4.8,
        "Maputo",
        "350.00",
        &["Instalação elétrica", "Manutenção", "Reparação"],
    ),
    (
        "Maria Encanadora",
        "Encanador",
        4.9,
        "Matola",
        "300.00",
        &["Encanamento", "Desentupimento", "Instalação"],
    ),
    (
        "Carlos Pintor",
        "Pintor",
        4.7,
        "Maputo",
        "250.00",
        &["Pintura residencial", "Pintura comercial"],
    ),
    (
        "Ana Pedreira",
        "Pedreiro",
        4.6,
        "Matola",
        "280.00",
        &["Assentamento", "Acabamento", "Revestimento"],
    ),
];

/// Listings shown when the catalogue cannot be fetched.
pub fn demo_listings() -> Vec<ProfessionalListing> {
    DEMO_PROFESSIONALS
        .iter()
        .zip(1..)
        .map(
            |(&(name, category, rating, location, rate, skills), id): (&DemoRow, i64)| {
                ProfessionalListing {
                    id: Id::from(id),
                    name: name.to_string(),
                    category: category.to_string(),
                    rating: Some(rating),
                    location: Some(location.to_string()),
                    skills: skills.iter().map(|skill| skill.to_string()).collect(),
                    hourly_rate: Some(rate.to_string()),
                }
            },
        )
        .collect()
}

pub fn render_professionals(professionals: &[ProfessionalListing]) -> String {
    if professionals.is_empty() {
        return concat!(
            r#"<div class="no-results"><i class="fas fa-search"></i>"#,
            "<h3>Nenhum profissional encontrado</h3>",
            "<p>Tente novamente mais tarde.</p></div>"
        )
        .to_string();
    }
    professionals.iter().map(render_card).collect()
}

fn render_card(professional: &ProfessionalListing) -> String {
    let skills = if professional.skills.is_empty() {
        "Habilidades diversas".to_string()
    } else {
        professional.skills.join(", ")
    };
    let rating = professional
        .rating
        .map(|rating| rating.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        concat!(
            r#"<div class="feature-card"><div class="feature-icon"><i class="fas fa-user-tie"></i></div>"#,
            "<h3>{name}</h3>",
            "<p><strong>Categoria:</strong> {category}</p>",
            "<p><strong>Localização:</strong> {location}</p>",
            "<p><strong>Avaliação:</strong> {rating} ⭐</p>",
            "<p><strong>Habilidades:</strong> {skills}</p>",
            "<p><strong>Taxa horária:</strong> {rate} MT</p>",
            r#"<button class="btn btn-primary" data-professional-id="{id}"><i class="fas fa-envelope"></i> Contactar</button>"#,
            "</div>"
        ),
        name = escape_html(&professional.name),
        category = escape_html(&professional.category),
        location = escape_html(professional.location.as_deref().unwrap_or("Não informada")),
        rating = rating,
        skills = escape_html(&skills),
        rate = escape_html(professional.hourly_rate.as_deref().unwrap_or("A combinar")),
        id = escape_html(&professional.id.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalogue_has_four_entries() {
        let demo = demo_listings();
        assert_eq!(demo.len(), 4);
        assert_eq!(demo[1].name, "Maria Encanadora");
        assert_eq!(demo[3].hourly_rate.as_deref(), Some("280.00"));

        let html = render_professionals(&demo);
        assert_eq!(html.matches("feature-card").count(), 4);
        assert!(html.contains("Instalação elétrica, Manutenção, Reparação"));
        assert!(html.contains("4.9 ⭐"));
    }

    #[test]
    fn empty_list_renders_no_results() {
        assert!(render_professionals(&[]).contains("Nenhum profissional encontrado"));
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let listing = ProfessionalListing {
            id: Id::from(7),
            name: "<Zé>".into(),
            category: String::new(),
            rating: None,
            location: None,
            skills: Vec::new(),
            hourly_rate: None,
        };
        let html = render_professionals(&[listing]);
        assert!(html.contains("&lt;Zé&gt;"));
        assert!(html.contains("N/A ⭐"));
        assert!(html.contains("Não informada"));
        assert!(html.contains("Habilidades diversas"));
        assert!(html.contains("A combinar MT"));
    }
}

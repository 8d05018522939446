use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend identifier. The API mixes numeric and string ids, so both decode
/// into the same string form. Integer ids are written back as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "RawId")]
pub struct Id(pub String);

impl Id {
    /// The id as an integer, when its text is the canonical form of one.
    pub fn as_integer(&self) -> Option<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|value| value.to_string() == self.0)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(value) => serializer.serialize_i64(value),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for Id {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => Id(text),
            RawId::Int(value) => Id(value.to_string()),
            RawId::Float(value) => Id(value.to_string()),
        }
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_string())
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id(value.to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts `"350.00"`, `350` or `350.5` and keeps the textual form.
pub(crate) fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<Amount>::deserialize(deserializer)?.map(|amount| match amount {
            Amount::Text(text) => text,
            Amount::Number(number) => number.to_string(),
        }),
    )
}

/// Skills arrive either as a list or as one free-text string.
fn de_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Skills {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Skills>::deserialize(deserializer)? {
        Some(Skills::List(list)) => list,
        Some(Skills::Text(text)) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Professional,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Professional => "professional",
            Role::Admin => "admin",
        }
    }
}

/// Authenticated identity as returned by `/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "user_type", alias = "role")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Cached identity/token pair representing a logged-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Read-only snapshot of a chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Id,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub professional_name: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
}

impl Conversation {
    /// Name of the other participant from the viewer's point of view.
    pub fn participant_name(&self, viewer: Role) -> &str {
        let name = match viewer {
            Role::Client => self.professional_name.as_deref(),
            _ => self.client_name.as_deref(),
        };
        name.unwrap_or("Utilizador")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Id,
    pub chat_id: Id,
    pub sender_id: Id,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".to_string()
}

/// Immutable display snapshot of a professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalListing {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de_skills")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub hourly_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest<'a> {
    pub professional_id: &'a Id,
    pub message: &'a str,
    pub client_name: &'a str,
}

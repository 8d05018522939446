//! Login, registration, logout and session restore flows.
//!
//! Every outcome is surfaced through the [`Notifier`]; the returned error
//! only tells the caller what kind of failure it was.

use std::sync::LazyLock;

use regex::Regex;

use crate::api::{ApiClient, ApiError};
use crate::common::{RegisterForm, Session};
use crate::error::{Error, FieldError, Result};
use crate::notify::Notifier;
use crate::storage::{SessionLoad, SessionStore};

const REQUIRED: &str = "Este campo é obrigatório.";
const CONNECTION_ERROR: &str = "Erro de conexão. Tente novamente.";
const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Mozambican mobile numbers, optionally with the +258 prefix.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+258\s?)?8[2-7][\s\-]?[0-9]{3}[\s\-]?[0-9]{3,4}$").expect("valid phone pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    PHONE_PATTERN.is_match(phone) && digits >= 9
}

pub fn validate_register(form: &RegisterForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let required = [
        ("name", &form.name),
        ("email", &form.email),
        ("password", &form.password),
        ("user_type", &form.user_type),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, REQUIRED));
        }
    }

    if !form.email.trim().is_empty() && !is_valid_email(&form.email) {
        errors.push(FieldError::new("email", "Por favor, insira um email válido."));
    }
    if !form.phone.trim().is_empty() && !is_valid_phone(&form.phone) {
        errors.push(FieldError::new(
            "phone",
            "Por favor, insira um número de telefone válido (ex: +258 84 123 4567)",
        ));
    }
    if !form.password.is_empty() && form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "A senha deve ter pelo menos 6 caracteres",
        ));
    }
    errors
}

fn connection_or(notifier: &Notifier, err: ApiError, prefix: &str) -> Error {
    if err.is_connection_failure() {
        notifier.error(CONNECTION_ERROR);
        Error::Network(err)
    } else {
        let message = err.user_message();
        notifier.error(format!("{prefix}: {message}"));
        Error::Auth(message)
    }
}

pub async fn login(
    api: &ApiClient,
    store: &SessionStore,
    notifier: &Notifier,
    email: &str,
    password: &str,
) -> Result<Session> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        notifier.error("Preencha todos os campos");
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push(FieldError::new("email", REQUIRED));
        }
        if password.is_empty() {
            errors.push(FieldError::new("password", REQUIRED));
        }
        return Err(Error::Validation(errors));
    }

    log::info!("Logging in as {email}");
    let response = api
        .login(email, password)
        .await
        .map_err(|err| connection_or(notifier, err, "Erro no login"))?;

    let session = Session {
        user: response.user,
        token: response.token,
    };
    store.save(&session)?;
    notifier.success(format!("Bem-vindo, {}!", session.user.name));
    Ok(session)
}

/// Registers and then logs in with the same credentials.
pub async fn register(
    api: &ApiClient,
    store: &SessionStore,
    notifier: &Notifier,
    form: &RegisterForm,
) -> Result<Session> {
    let errors = validate_register(form);
    if !errors.is_empty() {
        if errors.iter().any(|error| error.message == REQUIRED) {
            notifier.error("Preencha todos os campos obrigatórios");
        }
        return Err(Error::Validation(errors));
    }

    let user_id = api
        .register(form)
        .await
        .map_err(|err| connection_or(notifier, err, "Erro no registro"))?;
    log::info!("Registered user {user_id:?}");
    notifier.success("Conta criada com sucesso!");

    login(api, store, notifier, &form.email, &form.password).await
}

pub fn logout(store: &SessionStore, notifier: &Notifier) -> Result<()> {
    store.clear()?;
    notifier.success("Logout realizado com sucesso!");
    Ok(())
}

/// Cached session, if any. Corrupt storage is cleared and reads as logged out.
pub fn restore(store: &SessionStore) -> Result<Option<Session>> {
    match store.load()? {
        SessionLoad::Active(session) => {
            log::info!("Restored session for {}", session.user.email);
            Ok(Some(session))
        }
        SessionLoad::Corrupt => {
            log::warn!("Discarded corrupt stored session");
            Ok(None)
        }
        SessionLoad::Anonymous => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> RegisterForm {
        RegisterForm {
            name: "Ana Matos".into(),
            email: "ana@txunajob.co.mz".into(),
            password: "segredo".into(),
            user_type: "client".into(),
            phone: "+258 84 123 4567".into(),
            location: "Maputo".into(),
        }
    }

    #[test]
    fn email_and_phone_rules() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));

        assert!(is_valid_phone("+258 84 123 4567"));
        assert!(is_valid_phone("841234567"));
        assert!(is_valid_phone("82-123-4567"));
        assert!(!is_valid_phone("81 123 4567"));
        assert!(!is_valid_phone("84 123 456"));
    }

    #[test]
    fn register_form_validation() {
        assert!(validate_register(&form()).is_empty());

        let bad = RegisterForm {
            name: " ".into(),
            email: "nope".into(),
            password: "123".into(),
            phone: "123".into(),
            ..form()
        };
        let fields: Vec<_> = validate_register(&bad).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "phone", "password"]);

        let optional_phone = RegisterForm {
            phone: String::new(),
            ..form()
        };
        assert!(validate_register(&optional_phone).is_empty());
    }

    #[tokio::test]
    async fn rejected_login_notifies_and_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": false, "error": "Credenciais inválidas"}),
            ))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(2));
        let store = SessionStore::in_memory().unwrap();
        let notifier = Notifier::default();

        let result = login(&api, &store, &notifier, "a@b.com", "x").await;
        assert!(matches!(result, Err(Error::Auth(_))));
        assert_eq!(
            notifier.latest().unwrap().message,
            "Erro no login: Credenciais inválidas"
        );
        assert_eq!(store.database().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_fields_block_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(2));
        let store = SessionStore::in_memory().unwrap();
        let notifier = Notifier::default();
        let result = login(&api, &store, &notifier, "  ", "x").await;
        assert!(matches!(result, Err(Error::Validation(ref errors)) if errors.len() == 1));
        assert_eq!(notifier.latest().unwrap().message, "Preencha todos os campos");
    }

    #[tokio::test]
    async fn register_then_auto_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"success": true, "user_id": 42})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok",
                "user": {"id": 42, "name": "Ana Matos", "email": "ana@txunajob.co.mz", "user_type": "client"}
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(2));
        let store = SessionStore::in_memory().unwrap();
        let notifier = Notifier::default();

        let session = register(&api, &store, &notifier, &form()).await.unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(
            notifier.messages(),
            vec!["Conta criada com sucesso!", "Bem-vindo, Ana Matos!"]
        );
        assert_eq!(restore(&store).unwrap(), Some(session));

        logout(&store, &notifier).unwrap();
        assert_eq!(restore(&store).unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connection_error() {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500));
        let store = SessionStore::in_memory().unwrap();
        let notifier = Notifier::default();

        let result = login(&api, &store, &notifier, "a@b.com", "x").await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(notifier.latest().unwrap().message, CONNECTION_ERROR);
    }
}

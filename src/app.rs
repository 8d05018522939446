use chrono::Utc;

use crate::api::ApiClient;
use crate::auth;
use crate::common::{ChannelEvent, Id, ProfessionalListing, RegisterForm, Role, Session};
use crate::config::AppConfig;
use crate::dashboard::{AdminDashboard, ProfessionalDashboard};
use crate::error::{Error, FieldError, Result};
use crate::network::{Connector, MessagingChannel, SocketIoConnector};
use crate::notify::Notifier;
use crate::storage::SessionStore;
use crate::view;
use crate::view::professionals::demo_listings;

/// Composition root: owns the session and every collaborator that depends on it.
pub struct App<C: Connector = SocketIoConnector> {
    config: AppConfig,
    store: SessionStore,
    api: ApiClient,
    notifier: Notifier,
    channel: MessagingChannel<C>,
    session: Option<Session>,
}

impl App<SocketIoConnector> {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = SessionStore::with_path(&config.db_path)?;
        let connector = SocketIoConnector::new(config.ws_url.clone());
        Ok(Self::with_parts(config, store, connector))
    }
}

impl<C: Connector> App<C> {
    pub fn with_parts(config: AppConfig, store: SessionStore, connector: C) -> Self {
        let api = ApiClient::new(config.api_base.clone(), config.request_timeout());
        let notifier = Notifier::new(config.notification_ttl());
        let channel = MessagingChannel::new(connector, config.event_queue_capacity);
        Self {
            config,
            store,
            api,
            notifier,
            channel,
            session: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn channel(&self) -> &MessagingChannel<C> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut MessagingChannel<C> {
        &mut self.channel
    }

    fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Auth("Sessão não iniciada".to_string()))
    }

    fn set_session(&mut self, session: Option<Session>) {
        self.api
            .set_token(session.as_ref().map(|session| session.token.clone()));
        self.session = session;
    }

    // ========== Session ==========

    pub fn restore_session(&mut self) -> Result<Option<&Session>> {
        let session = auth::restore(&self.store)?;
        self.set_session(session);
        Ok(self.session.as_ref())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session> {
        let session = auth::login(&self.api, &self.store, &self.notifier, email, password).await?;
        self.replace_session(session);
        self.require_session()
    }

    pub async fn register(&mut self, form: &RegisterForm) -> Result<&Session> {
        let session = auth::register(&self.api, &self.store, &self.notifier, form).await?;
        self.replace_session(session);
        self.require_session()
    }

    // A new identity never inherits the previous one's connection.
    fn replace_session(&mut self, session: Session) {
        self.reset_chat();
        self.set_session(Some(session));
    }

    fn reset_chat(&mut self) {
        self.channel.close();
        self.channel.leave_conversation();
        self.channel.set_conversations(Vec::new());
    }

    /// The server rejected the token: drop the session so the caller goes
    /// back to the login flow.
    fn expire_session(&mut self) -> Error {
        log::warn!("Session token rejected by the server");
        self.reset_chat();
        self.set_session(None);
        if let Err(err) = self.store.clear() {
            log::error!("Failed to clear expired session: {err}");
        }
        self.notifier.error("Sessão expirada. Faça login novamente.");
        Error::Auth("Sessão expirada".to_string())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.reset_chat();
        self.set_session(None);
        auth::logout(&self.store, &self.notifier)
    }

    // ========== Chat ==========

    /// Opens the realtime channel for the current session.
    pub fn connect(&mut self) -> Result<()> {
        let session = self.require_session()?.clone();
        self.channel.open(&session)
    }

    /// Fetches the conversation list and returns its markup.
    pub async fn load_conversations(&mut self) -> Result<String> {
        let role = self.require_session()?.user.role;
        let chats = match self.api.chats().await {
            Ok(chats) => chats,
            Err(err) if err.is_unauthorized() => return Err(self.expire_session()),
            Err(err) => {
                log::warn!("Conversations unavailable: {err}");
                self.notifier
                    .error(format!("Erro ao carregar conversas: {}", err.user_message()));
                Vec::new()
            }
        };
        self.channel.set_conversations(chats);
        Ok(view::chat::render_conversations(
            self.channel.conversations(),
            role,
            Utc::now(),
        ))
    }

    /// Makes `chat_id` the open conversation and returns its history markup.
    pub async fn open_chat(&mut self, chat_id: Id) -> Result<String> {
        let viewer = self.require_session()?.user.id.clone();
        let messages = match self.api.messages(&chat_id).await {
            Ok(messages) => messages,
            Err(err) if err.is_unauthorized() => return Err(self.expire_session()),
            Err(err) => {
                log::warn!("History of chat {chat_id} unavailable: {err}");
                self.notifier
                    .error(format!("Erro ao carregar mensagens: {}", err.user_message()));
                Vec::new()
            }
        };
        self.channel.join_conversation(chat_id);
        self.channel.load_history(messages);
        Ok(view::chat::render_messages(
            self.channel.messages(),
            &viewer,
            Utc::now(),
        ))
    }

    pub fn send_chat_message(&mut self, content: &str) -> Result<()> {
        let result = self.channel.send_message(content);
        if let Err(Error::NotConnected) = result {
            self.notifier.error("Chat não conectado. Tente novamente.");
        }
        result
    }

    /// Applies pending realtime traffic and hands back what happened.
    pub fn pump_channel(&mut self) -> Vec<ChannelEvent> {
        self.channel.process_pending();
        self.take_channel_events()
    }

    /// Drains queued channel events, surfacing server errors as notifications.
    pub fn take_channel_events(&mut self) -> Vec<ChannelEvent> {
        let events = self.channel.drain_events();
        for event in &events {
            if let ChannelEvent::ServerError(message) = event {
                self.notifier.error(format!("Erro no chat: {message}"));
            }
        }
        events
    }

    // ========== Marketplace ==========

    /// Never fails: any problem yields the demo catalogue and a notice.
    pub async fn load_professionals(&self) -> Vec<ProfessionalListing> {
        match self.api.professionals().await {
            Ok(professionals) => professionals,
            Err(err) => {
                log::warn!("Professionals unavailable ({err}); using demo data");
                self.notifier.info("Usando dados de demonstração");
                demo_listings()
            }
        }
    }

    pub async fn contact_professional(&self, professional_id: &Id, message: &str) -> Result<()> {
        let client_name = match self.session.as_ref() {
            Some(session) => session.user.name.clone(),
            None => {
                self.notifier
                    .warning("Para contactar profissionais, é necessário fazer login.");
                return Err(Error::Auth("Sessão não iniciada".to_string()));
            }
        };
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "message",
                "Digite sua mensagem para o profissional.",
            )]));
        }

        match self.api.contact(professional_id, message, &client_name).await {
            Ok(()) => {
                self.notifier.success("Mensagem enviada com sucesso!");
                Ok(())
            }
            Err(err) if err.is_connection_failure() => {
                self.notifier.error("Erro de conexão. Tente novamente.");
                Err(err.into())
            }
            Err(err) => {
                self.notifier
                    .error(format!("Erro ao enviar mensagem: {}", err.user_message()));
                Err(err.into())
            }
        }
    }

    // ========== Dashboards ==========

    fn require_role(&self, role: Role) -> Result<&Session> {
        let session = self.require_session()?;
        if session.user.role != role {
            return Err(Error::Auth(format!(
                "Acesso restrito ao perfil {}",
                role.as_str()
            )));
        }
        Ok(session)
    }

    pub fn admin_dashboard(&self) -> Result<AdminDashboard> {
        self.require_role(Role::Admin)?;
        Ok(AdminDashboard::new(self.api.clone(), self.notifier.clone()))
    }

    pub fn professional_dashboard(&self) -> Result<ProfessionalDashboard> {
        self.require_role(Role::Professional)?;
        Ok(ProfessionalDashboard::new(
            self.api.clone(),
            self.notifier.clone(),
        ))
    }

    pub fn render_notifications(&self) -> String {
        view::render_notifications(&self.notifier.active())
    }
}

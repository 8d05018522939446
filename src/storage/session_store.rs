use std::path::Path;

use crate::common::{Session, User};
use crate::error::Result;

use super::database::Database;

pub const TOKEN_KEY: &str = "txunajob_token";
pub const USER_KEY: &str = "txunajob_user";

/// Outcome of reading the persisted session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionLoad {
    Active(Session),
    /// Nothing (or only half of the pair) is stored.
    Anonymous,
    /// Stored user failed to parse; storage has been cleared.
    Corrupt,
}

impl SessionLoad {
    pub fn into_session(self) -> Option<Session> {
        match self {
            SessionLoad::Active(session) => Some(session),
            SessionLoad::Anonymous | SessionLoad::Corrupt => None,
        }
    }
}

/// Persists the authenticated identity and its credential token.
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: Database::new(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::in_memory()?,
        })
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;
        self.db.set_item(TOKEN_KEY, &session.token)?;
        self.db.set_item(USER_KEY, &user_json)?;
        log::debug!("Session saved for user {}", session.user.id);
        Ok(())
    }

    pub fn load(&self) -> Result<SessionLoad> {
        let token = self.db.get_item(TOKEN_KEY)?;
        let user = self.db.get_item(USER_KEY)?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(SessionLoad::Anonymous);
        };

        match serde_json::from_str::<User>(&user) {
            Ok(user) if !token.is_empty() => Ok(SessionLoad::Active(Session { user, token })),
            Ok(_) => Ok(SessionLoad::Anonymous),
            Err(err) => {
                log::warn!("Stored session is unreadable ({err}); clearing it");
                self.clear()?;
                Ok(SessionLoad::Corrupt)
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.db.remove_item(TOKEN_KEY)?;
        self.db.remove_item(USER_KEY)?;
        Ok(())
    }

    /// Raw access to the underlying storage.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Id, Role};

    fn session() -> Session {
        Session {
            user: User {
                id: Id::from(2),
                name: "Ana".to_string(),
                email: "a@b.com".to_string(),
                role: Role::Client,
                phone: None,
                location: Some("Maputo".to_string()),
            },
            token: "tok-123".to_string(),
        }
    }

    #[test]
    fn save_load_clear() {
        let store = SessionStore::in_memory().unwrap();
        assert_eq!(store.load().unwrap(), SessionLoad::Anonymous);

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), SessionLoad::Active(session()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), SessionLoad::Anonymous);
    }

    #[test]
    fn malformed_payloads_are_cleared_every_time() {
        for payload in ["{not json", "[]", "{\"id\": 1}", "null", ""] {
            let store = SessionStore::in_memory().unwrap();
            store.database().set_item(TOKEN_KEY, "tok").unwrap();
            store.database().set_item(USER_KEY, payload).unwrap();

            assert_eq!(store.load().unwrap(), SessionLoad::Corrupt, "{payload}");
            assert_eq!(store.database().count().unwrap(), 0);

            // Second read finds nothing left to clear.
            assert_eq!(store.load().unwrap(), SessionLoad::Anonymous);
            assert_eq!(store.load().unwrap().into_session(), None);
        }
    }

    #[test]
    fn half_a_session_is_logged_out_but_kept() {
        let store = SessionStore::in_memory().unwrap();
        store.database().set_item(TOKEN_KEY, "tok").unwrap();
        assert_eq!(store.load().unwrap(), SessionLoad::Anonymous);
        assert_eq!(store.database().count().unwrap(), 1);
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");
        SessionStore::with_path(&path).unwrap().save(&session()).unwrap();

        let store = SessionStore::with_path(&path).unwrap();
        assert_eq!(store.load().unwrap().into_session(), Some(session()));
    }
}

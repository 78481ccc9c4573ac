//! Signed-in session: who the user is and the credentials every request uses.
//!
//! Restored from `<state_dir>/.jobboard_session.ron` on startup and removed
//! again on logout.

use std::fs;
use std::path::{Path, PathBuf};

use jobboard_logging::{board_info, board_warn};
use jobboard_remote::{CredentialStore, Credentials};
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

const SESSION_FILENAME: &str = ".jobboard_session.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedSession {
    user_id: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    csrf_token: Option<String>,
    #[serde(default)]
    session_cookie: Option<String>,
}

impl PersistedSession {
    fn new(user_id: &str, credentials: Credentials) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: credentials.access_token,
            csrf_token: credentials.csrf_token,
            session_cookie: credentials.session_cookie,
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            csrf_token: self.csrf_token.clone(),
            session_cookie: self.session_cookie.clone(),
        }
    }
}

pub struct SessionContext {
    writer: AtomicFileWriter,
    state_dir: PathBuf,
    credentials: CredentialStore,
    user_id: Option<String>,
}

impl SessionContext {
    pub fn new(state_dir: PathBuf, credentials: CredentialStore) -> Self {
        Self {
            writer: AtomicFileWriter::new(state_dir.clone()),
            state_dir,
            credentials,
            user_id: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Loads a persisted session into the credential store. Unreadable files
    /// are logged and treated as signed out.
    pub fn restore(&mut self) -> Option<String> {
        let session = load_session(&self.state_dir.join(SESSION_FILENAME))?;
        self.credentials.replace(session.credentials());
        self.user_id = Some(session.user_id.clone());
        board_info!("restored session for user {}", session.user_id);
        Some(session.user_id)
    }

    pub fn sign_in(&mut self, user_id: &str, credentials: Credentials) -> Result<(), PersistError> {
        self.credentials.replace(credentials);
        self.user_id = Some(user_id.to_string());
        board_info!("signed in as {}", user_id);
        self.save()
    }

    /// Clears credentials and deletes the session file.
    pub fn sign_out(&mut self) -> Result<(), PersistError> {
        self.credentials.clear();
        if let Some(user_id) = self.user_id.take() {
            board_info!("signed out {}", user_id);
        }
        self.writer.remove(SESSION_FILENAME)
    }

    /// Writes the current credentials, including any the server rotated.
    pub fn save(&self) -> Result<(), PersistError> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(());
        };
        let session = PersistedSession::new(user_id, self.credentials.snapshot());
        let content = ron::ser::to_string_pretty(&session, ron::ser::PrettyConfig::new())
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        self.writer.write(SESSION_FILENAME, &content)?;
        Ok(())
    }
}

fn load_session(path: &Path) -> Option<PersistedSession> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            board_warn!("Failed to read session from {:?}: {}", path, err);
            return None;
        }
    };
    match ron::from_str::<PersistedSession>(&content) {
        Ok(session) if !session.user_id.trim().is_empty() => Some(session),
        Ok(_) => {
            board_warn!("Ignoring session without a user id at {:?}", path);
            None
        }
        Err(err) => {
            board_warn!("Failed to parse session from {:?}: {}", path, err);
            None
        }
    }
}

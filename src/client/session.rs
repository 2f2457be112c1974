use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::models::user::{AuthResponse, Role, SessionUser};

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            user: auth.user,
        }
    }
}

/// Holds the current session, optionally mirrored to a JSON file.
///
/// The store is handed to [`ApiClient`](super::ApiClient) explicitly; there
/// is no global session.
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Mutex<Option<Session>>,
}

impl SessionStore {
    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Mutex::new(None),
        }
    }

    /// Open a file-backed store, loading the saved session if there is one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let store = Self {
            path: Some(path.as_ref().to_path_buf()),
            current: Mutex::new(None),
        };
        store.load()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Re-read the session file. A missing file means signed out.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let Some(path) = &self.path else {
            return Ok(self.current());
        };

        let session = match std::fs::read(path) {
            Ok(bytes) => Some(serde_json::from_slice::<Session>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        *self.lock() = session.clone();
        Ok(session)
    }

    pub fn save(&self, session: Session) -> Result<(), SessionError> {
        if let Some(path) = &self.path {
            std::fs::write(path, serde_json::to_vec_pretty(&session)?)?;
        }
        *self.lock() = Some(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().as_ref().map(Session::role)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

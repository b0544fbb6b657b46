use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{AuthSession, Role};

/// Holds the signed-in session. Initialized at start, cleared on logout or
/// role mismatch. With a backing file the session survives restarts.
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<Option<AuthSession>>,
    file: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            file: None,
        }
    }

    /// Opens a store backed by `file`, loading any session already there.
    /// An unreadable or corrupt file is discarded, not fatal.
    pub fn init(file: Option<PathBuf>) -> Self {
        let current = file.as_deref().and_then(|path| match load(path) {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding session file {}: {e:#}", path.display());
                None
            }
        });
        if let Some(session) = &current {
            info!("Restored {} session for {}", session.role, session.email);
        }
        Self {
            current: RwLock::new(current),
            file,
        }
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn establish(&self, session: AuthSession) -> Result<(), AppError> {
        info!("Session established: {} {}", session.role, session.email);
        if let Some(path) = &self.file {
            persist(path, &session)?;
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Logout. Idempotent.
    pub fn clear(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = previous {
            info!("Session cleared for {}", session.email);
        }
        if let Some(path) = &self.file {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove session file {}: {e}", path.display());
                }
            }
        }
    }

    /// Returns the session if it belongs to one of `roles`. A session with
    /// any other role is cleared.
    pub fn require_role(&self, roles: &[Role]) -> Result<AuthSession, AppError> {
        let session = self
            .current()
            .ok_or_else(|| AppError::unauthorized("no active session"))?;
        if roles.contains(&session.role) {
            return Ok(session);
        }
        warn!(
            "Role mismatch: session is {}, expected one of {:?}",
            session.role, roles
        );
        self.clear();
        Err(AppError::unauthorized(format!(
            "{} session cannot access this page",
            session.role
        )))
    }
}

fn load(path: &Path) -> Result<Option<AuthSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let session = serde_json::from_str(&raw).context("decoding session")?;
    Ok(Some(session))
}

fn persist(path: &Path, session: &AuthSession) -> Result<()> {
    let raw = serde_json::to_string(session).context("encoding session")?;
    std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{AuthSession, Role};

    pub fn session(role: Role) -> AuthSession {
        AuthSession {
            role,
            token: format!("{role}-token"),
            user_id: format!("{role}-1"),
            email: format!("{role}@example.com"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }
}

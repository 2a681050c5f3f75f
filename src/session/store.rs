use crate::api::User;
use crate::error::Result;
use crate::error_ext::ResultExt;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SESSION_FILE: &str = "session.json";

/// Persisted user object and bearer credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
    /// Unix seconds when the session was saved
    #[serde(default)]
    pub saved_at: u64,
}

impl Session {
    pub fn new(user: User, token: String) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            user,
            token,
            saved_at,
        }
    }
}

/// File-backed session storage inside the data directory.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Missing file means no session. A file that cannot be parsed is logged and
    /// treated the same way so a corrupt session never blocks `login`.
    pub fn load(&self) -> Result<Option<Session>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;

        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&tmp, content)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!(user = %session.user.id, path = %path.display(), "Session saved");
        Ok(())
    }

    /// Returns whether a session file was removed.
    pub fn clear(&self) -> Result<bool> {
        let path = self.path();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

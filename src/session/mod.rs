//! Client-side session: whether the user signed in, whether the admin OTP step passed,
//! and where to go after signing in. Persisted through a [`SessionStore`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Login,
    OtpVerify,
    Home,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::OtpVerify => "/otp-verify",
            Route::Home => "/",
            Route::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub admin_verified: bool,
    #[serde(default)]
    pub email: Option<String>,
    /// Email an OTP was sent to and is awaiting verification.
    #[serde(default)]
    pub pending_email: Option<String>,
    #[serde(default)]
    pub established_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admin_verified_at: Option<DateTime<Utc>>,
    /// Where to land after signing in.
    #[serde(default)]
    pub target_route: Option<String>,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<SessionData>;

    fn save(&self, data: &SessionData) -> ClientResult<()>;

    fn clear(&self) -> ClientResult<()>;
}

/// JSON file on disk. A missing or unreadable file means "signed out".
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SessionData::default()),
            Err(e) => {
                return Err(ClientError::Session(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(data) => Ok(data),
            Err(e) => {
                log::warn!(
                    "Ignoring corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(SessionData::default())
            }
        }
    }

    fn save(&self, data: &SessionData) -> ClientResult<()> {
        let raw = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, raw).map_err(|e| {
            ClientError::Session(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        Ok(self
            .data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default())
    }

    fn save(&self, data: &SessionData) -> ClientResult<()> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Shared session handle injected into services and the command host.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    data: Arc<RwLock<SessionData>>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let data = store.load()?;
        Ok(Self {
            store,
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemorySessionStore::new()),
            data: Arc::new(RwLock::new(SessionData::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, change: impl FnOnce(&mut SessionData)) -> ClientResult<()> {
        let mut data = self.write();
        change(&mut data);
        self.store.save(&data)
    }

    pub fn snapshot(&self) -> SessionData {
        self.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().logged_in
    }

    pub fn is_admin(&self) -> bool {
        let data = self.read();
        data.logged_in && data.admin_verified
    }

    pub fn email(&self) -> Option<String> {
        self.read().email.clone()
    }

    pub fn pending_email(&self) -> Option<String> {
        self.read().pending_email.clone()
    }

    pub fn set_pending_email(&self, email: &str) -> ClientResult<()> {
        self.update(|data| data.pending_email = Some(email.to_string()))
    }

    pub fn remember_target(&self, route: &str) -> ClientResult<()> {
        self.update(|data| data.target_route = Some(route.to_string()))
    }

    /// Marks the user signed in and returns where to go next (the remembered target or home).
    pub fn establish_user(&self, email: &str) -> ClientResult<String> {
        let mut target = Route::Home.path().to_string();
        self.update(|data| {
            data.logged_in = true;
            data.email = Some(email.to_string());
            data.pending_email = None;
            data.established_at = Some(Utc::now());
            if let Some(route) = data.target_route.take() {
                target = route;
            }
        })?;
        log::info!("Session established for {}", email);
        Ok(target)
    }

    pub fn establish_admin(&self) -> ClientResult<()> {
        self.update(|data| {
            data.admin_verified = true;
            data.admin_verified_at = Some(Utc::now());
        })?;
        log::info!("Admin access verified");
        Ok(())
    }

    /// Signs out completely, dropping the persisted session.
    pub fn teardown(&self) -> ClientResult<()> {
        *self.write() = SessionData::default();
        self.store.clear()?;
        log::info!("Session cleared");
        Ok(())
    }

    pub fn require_user(&self) -> ClientResult<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(ClientError::Unauthorized {
                redirect: Route::Login,
            })
        }
    }

    pub fn require_admin(&self) -> ClientResult<()> {
        self.require_user()?;
        if self.read().admin_verified {
            Ok(())
        } else {
            Err(ClientError::Unauthorized {
                redirect: Route::OtpVerify,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_redirect() {
        let session = SessionContext::in_memory();

        match session.require_admin() {
            Err(ClientError::Unauthorized { redirect }) => assert_eq!(redirect, Route::Login),
            other => panic!("unexpected {:?}", other),
        }

        session.establish_user("admin@example.com").unwrap();
        assert!(session.require_user().is_ok());
        match session.require_admin() {
            Err(ClientError::Unauthorized { redirect }) => assert_eq!(redirect, Route::OtpVerify),
            other => panic!("unexpected {:?}", other),
        }

        session.establish_admin().unwrap();
        assert!(session.require_admin().is_ok());
    }

    #[test]
    fn test_target_route_consumed_on_login() {
        let session = SessionContext::in_memory();
        session.remember_target("/admin").unwrap();
        assert_eq!(session.establish_user("a@b.co").unwrap(), "/admin");
        assert_eq!(session.snapshot().target_route, None);
    }

    #[test]
    fn test_teardown_clears_everything() {
        let session = SessionContext::in_memory();
        session.establish_user("a@b.co").unwrap();
        session.establish_admin().unwrap();
        session.teardown().unwrap();
        assert_eq!(session.snapshot(), SessionData::default());
    }
}

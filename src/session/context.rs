use super::store::{Session, SessionStore};
use crate::api::{ApiClient, Role, User};
use crate::error::{LiveroomError, Result};

/// Where a restored session lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeView {
    Login,
    StudentDashboard,
    TeacherDashboard,
    AdminDashboard,
}

impl HomeView {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => HomeView::StudentDashboard,
            Role::Teacher => HomeView::TeacherDashboard,
            Role::Admin => HomeView::AdminDashboard,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HomeView::Login => "Sign in",
            HomeView::StudentDashboard => "Student dashboard",
            HomeView::TeacherDashboard => "Teacher dashboard",
            HomeView::AdminDashboard => "Admin dashboard",
        }
    }

    /// Commands available from this view, shown under `whoami`.
    pub fn commands(&self) -> &'static [&'static str] {
        match self {
            HomeView::Login => &["login"],
            HomeView::StudentDashboard => &["live --room <id>", "logout"],
            HomeView::TeacherDashboard | HomeView::AdminDashboard => &[
                "assign-students --batch <id>",
                "assign-batches --assessment <id>",
                "logout",
            ],
        }
    }
}

/// Explicitly initialized session state handed to each command.
pub struct SessionContext {
    store: SessionStore,
    session: Option<Session>,
}

impl SessionContext {
    pub fn restore(store: SessionStore) -> Result<Self> {
        let session = store.load()?;
        match &session {
            Some(s) => tracing::debug!(user = %s.user.id, role = %s.user.role, "Session restored"),
            None => tracing::debug!("No stored session"),
        }
        Ok(Self { store, session })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Result<&User> {
        self.session
            .as_ref()
            .map(|s| &s.user)
            .ok_or(LiveroomError::NotLoggedIn)
    }

    pub fn token(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(LiveroomError::NotLoggedIn)
    }

    pub fn require_role(&self, expected: &[Role]) -> Result<&User> {
        let user = self.user()?;
        if expected.contains(&user.role) {
            Ok(user)
        } else {
            Err(LiveroomError::WrongRole {
                expected: expected
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(" or "),
                actual: user.role.to_string(),
            })
        }
    }

    pub fn home_view(&self) -> HomeView {
        self.session
            .as_ref()
            .map_or(HomeView::Login, |s| HomeView::for_role(s.user.role))
    }

    /// Authenticated REST client for the current session.
    pub fn api_client(&self, api_url: &str) -> Result<ApiClient> {
        ApiClient::new(api_url, Some(self.token()?))
    }

    pub fn sign_in(&mut self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(())
    }

    /// Drops the in-memory session and the persisted copy.
    pub fn sign_out(&mut self) -> Result<bool> {
        self.session = None;
        self.store.clear()
    }
}

use super::session::Session;
use super::{ApiClient, ClientError};
use crate::models::booking::Dashboard;
use crate::models::user::DashboardKind;

/// Where the app lands after start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    SignIn,
    Dashboard(DashboardKind),
}

impl Landing {
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            None => Landing::SignIn,
            Some(s) => Landing::Dashboard(s.role().dashboard()),
        }
    }
}

/// Fetch the signed-in user's dashboard.
///
/// The server picks the dashboard from the token; a body for a different
/// role than the saved session is reported instead of rendered.
pub async fn load(client: &ApiClient) -> Result<Dashboard, ClientError> {
    let expected = client.session().role();
    let dashboard = client.dashboard().await?;

    if let Some(role) = expected {
        if dashboard.kind() != role.dashboard() {
            return Err(ClientError::DashboardMismatch {
                expected: role.dashboard(),
                actual: dashboard.kind(),
            });
        }
    }
    Ok(dashboard)
}

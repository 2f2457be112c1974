use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::db;
use crate::error::ApiError;
use crate::models::booking::Dashboard;
use crate::models::user::DashboardKind;

const CUSTOMER_RECENT_BOOKINGS: usize = 5;

/// GET /api/dashboard — the signed-in role's landing data.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = match user.role.dashboard() {
        DashboardKind::Customer => {
            let mut recent_bookings = db::bookings::list_for_customer(&state.db, user.id).await?;
            recent_bookings.truncate(CUSTOMER_RECENT_BOOKINGS);
            Dashboard::Customer { recent_bookings }
        }
        DashboardKind::FieldTechnician => Dashboard::FieldTechnician {
            stats: db::bookings::technician_stats(&state.db, user.id, db::bookings::today())
                .await?,
            jobs: db::bookings::list_for_technician(&state.db, user.id).await?,
        },
        DashboardKind::Admin => Dashboard::Admin {
            stats: db::stats::admin_dashboard(&state.db).await?,
        },
    };

    Ok(Json(dashboard))
}

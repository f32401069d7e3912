use actix_web::{HttpResponse, web};

use super::Envelope;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::store::RecordStore;
use crate::summary::Dashboard;

/// Dashboard summary
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Headcount, today's attendance, recent records and department breakdown", body = Dashboard)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_summary(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, ApiError> {
    let dashboard = store
        .dashboard(clock.today())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to build dashboard", "Not found"))?;

    Ok(HttpResponse::Ok().json(Envelope::new(
        "Dashboard summary retrieved successfully",
        dashboard,
    )))
}

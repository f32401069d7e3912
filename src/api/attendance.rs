use actix_web::{HttpResponse, web};
use tracing::info;

use super::Envelope;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::filter::{AttendanceFilter, AttendanceQuery};
use crate::model::attendance::{AttendanceDetail, AttendanceListItem};
use crate::store::RecordStore;
use crate::validation::attendance::{AttendanceInput, validate_attendance};

const NOT_FOUND: &str = "Attendance record not found";

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records ordered by date (newest first), then employee ID", body = Object, example = json!({
            "message": "Attendance records retrieved successfully",
            "data": [{
                "id": 1,
                "employee_id": "EMP001",
                "employee_name": "John Doe",
                "department": "IT",
                "date": "2026-01-01",
                "status": "Present",
                "created_at": "2026-01-01T09:00:00Z"
            }]
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn RecordStore>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = AttendanceFilter::from(&query.into_inner());
    let records = store
        .list_attendance(&filter)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to list attendance records", NOT_FOUND))?;

    let data: Vec<AttendanceListItem> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(Envelope::new(
        "Attendance records retrieved successfully",
        data,
    )))
}

/// Mark attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceInput,
    responses(
        (status = 201, description = "Attendance record created successfully", body = Object, example = json!({
            "message": "Attendance record created successfully",
            "data": {
                "id": 1,
                "employee": 1,
                "employee_id": "EMP001",
                "employee_name": "John Doe",
                "date": "2026-01-01",
                "status": "Present",
                "created_at": "2026-01-01T09:00:00Z",
                "updated_at": "2026-01-01T09:00:00Z"
            }
        })),
        (status = 400, description = "Validation failure or duplicate employee/date", body = Object, example = json!({
            "message": "Failed to create attendance record",
            "errors": { "non_field_errors": ["Attendance record for John Doe on 2026-01-01 already exists."] }
        }))
    ),
    tag = "Attendance"
)]
pub async fn create_attendance(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<AttendanceInput>,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to create attendance record";

    let candidate =
        validate_attendance(&payload, clock.today()).map_err(ApiError::invalid(FAILED))?;
    let record = store
        .create_attendance(candidate, clock.now())
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    info!(id = record.id, record = %record, "Attendance recorded");
    Ok(HttpResponse::Created().json(Envelope::new(
        "Attendance record created successfully",
        AttendanceDetail::from(record),
    )))
}

/// Get attendance record by ID
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record found", body = AttendanceDetail),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let record = store
        .get_attendance(path.into_inner())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to retrieve attendance record", NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(Envelope::new(
        "Attendance record retrieved successfully",
        AttendanceDetail::from(record),
    )))
}

async fn apply_update(
    store: &dyn RecordStore,
    clock: &dyn Clock,
    id: u64,
    input: AttendanceInput,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to update attendance record";

    let existing = store
        .get_attendance(id)
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    let input = if partial { input.merged_over(&existing) } else { input };
    let candidate =
        validate_attendance(&input, clock.today()).map_err(ApiError::invalid(FAILED))?;

    let record = store
        .update_attendance(id, candidate, clock.now())
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    info!(id, record = %record, partial, "Attendance updated");
    Ok(HttpResponse::Ok().json(Envelope::new(
        "Attendance record updated successfully",
        AttendanceDetail::from(record),
    )))
}

/// Update attendance record (all fields)
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = AttendanceInput,
    responses(
        (status = 200, description = "Attendance record updated successfully", body = Object),
        (status = 400, description = "Validation failure or duplicate employee/date", body = Object),
        (status = 404, description = "Attendance record not found", body = Object)
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceInput>,
) -> Result<HttpResponse, ApiError> {
    apply_update(
        store.get_ref(),
        clock.get_ref(),
        path.into_inner(),
        payload.into_inner(),
        false,
    )
    .await
}

/// Partially update attendance record
#[utoipa::path(
    patch,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = AttendanceInput,
    responses(
        (status = 200, description = "Attendance record updated successfully", body = Object),
        (status = 400, description = "Validation failure or duplicate employee/date", body = Object),
        (status = 404, description = "Attendance record not found", body = Object)
    ),
    tag = "Attendance"
)]
pub async fn partial_update_attendance(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceInput>,
) -> Result<HttpResponse, ApiError> {
    apply_update(
        store.get_ref(),
        clock.get_ref(),
        path.into_inner(),
        payload.into_inner(),
        true,
    )
    .await
}

/// Delete attendance record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record deleted successfully", body = Object, example = json!({
            "message": "Attendance record deleted successfully"
        })),
        (status = 404, description = "Attendance record not found", body = Object)
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    store
        .delete_attendance(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete attendance record", NOT_FOUND))?;

    info!(id, "Attendance deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record deleted successfully"
    })))
}

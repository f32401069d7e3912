use actix_web::{HttpResponse, web};
use tracing::info;

use super::Envelope;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::filter::{EmployeeFilter, EmployeeQuery};
use crate::store::RecordStore;
use crate::summary::EmployeeAttendanceSummary;
use crate::validation::employee::{EmployeeInput, validate_employee};

const NOT_FOUND: &str = "Employee not found";

/// List Employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees ordered by employee ID", body = Object, example = json!({
            "message": "Employees retrieved successfully",
            "data": [{
                "id": 1,
                "employee_id": "EMP001",
                "full_name": "John Doe",
                "email": "john.doe@example.com",
                "department": "IT",
                "created_at": "2026-01-01T09:00:00Z",
                "updated_at": "2026-01-01T09:00:00Z"
            }]
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    store: web::Data<dyn RecordStore>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = EmployeeFilter::from(&query.into_inner());
    let employees = store
        .list_employees(&filter)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to list employees", NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(Envelope::new("Employees retrieved successfully", employees)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "message": "Employee created successfully",
            "data": {
                "id": 1,
                "employee_id": "EMP001",
                "full_name": "John Doe",
                "email": "john.doe@example.com",
                "department": "IT",
                "created_at": "2026-01-01T09:00:00Z",
                "updated_at": "2026-01-01T09:00:00Z"
            }
        })),
        (status = 400, description = "Validation or uniqueness failure", body = Object, example = json!({
            "message": "Failed to create employee",
            "errors": { "employee_id": ["An employee with this ID already exists."] }
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<EmployeeInput>,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to create employee";

    let candidate = validate_employee(&payload).map_err(ApiError::invalid(FAILED))?;
    let employee = store
        .create_employee(candidate, clock.now())
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    info!(id = employee.id, employee_id = %employee.employee_id, "Employee created");
    Ok(HttpResponse::Created().json(Envelope::new("Employee created successfully", employee)))
}

/// Simple Employee list for dropdowns
#[utoipa::path(
    get,
    path = "/api/employees/simple",
    responses(
        (status = 200, description = "id, employee_id, full_name and department of every employee", body = Object, example = json!({
            "message": "Employee list retrieved successfully",
            "data": [{ "id": 1, "employee_id": "EMP001", "full_name": "John Doe", "department": "IT" }]
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees_simple(
    store: web::Data<dyn RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let employees = store
        .list_employees_brief()
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to list employees", NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(Envelope::new("Employee list retrieved successfully", employees)))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee surrogate key")
    ),
    responses(
        (status = 200, description = "Employee found", body = Object),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee = store
        .get_employee(path.into_inner())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to retrieve employee", NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(Envelope::new("Employee retrieved successfully", employee)))
}

async fn apply_update(
    store: &dyn RecordStore,
    clock: &dyn Clock,
    id: u64,
    input: EmployeeInput,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to update employee";

    let existing = store
        .get_employee(id)
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    let input = if partial { input.merged_over(&existing) } else { input };
    let candidate = validate_employee(&input).map_err(ApiError::invalid(FAILED))?;

    let employee = store
        .update_employee(id, candidate, clock.now())
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    info!(id, employee_id = %employee.employee_id, partial, "Employee updated");
    Ok(HttpResponse::Ok().json(Envelope::new("Employee updated successfully", employee)))
}

/// Update Employee (all fields)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee surrogate key")
    ),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated successfully", body = Object),
        (status = 400, description = "Validation or uniqueness failure", body = Object),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeInput>,
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

/// Partially update Employee
#[utoipa::path(
    patch,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee surrogate key")
    ),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated successfully", body = Object),
        (status = 400, description = "Validation or uniqueness failure", body = Object),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee"
)]
pub async fn partial_update_employee(
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeInput>,
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

/// Delete Employee and its attendance records
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee surrogate key")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee John Doe deleted successfully"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let employee = store
        .delete_employee(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete employee", NOT_FOUND))?;

    info!(id, employee_id = %employee.employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Employee {} deleted successfully", employee.full_name)
    })))
}

/// Attendance summary of one Employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}/attendance-summary",
    params(
        ("id" = u64, Path, description = "Employee surrogate key")
    ),
    responses(
        (status = 200, description = "Present, absent and total record counts", body = Object, example = json!({
            "message": "Employee attendance summary retrieved successfully",
            "data": {
                "id": 1,
                "employee_id": "EMP001",
                "full_name": "John Doe",
                "email": "john.doe@example.com",
                "department": "IT",
                "total_present_days": 20,
                "total_absent_days": 2,
                "total_records": 22
            }
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn employee_attendance_summary(
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to summarize attendance";
    let id = path.into_inner();

    let employee = store
        .get_employee(id)
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;
    let counts = store
        .attendance_counts(id)
        .await
        .map_err(|e| ApiError::from_store(e, FAILED, NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(Envelope::new(
        "Employee attendance summary retrieved successfully",
        EmployeeAttendanceSummary::new(employee, counts),
    )))
}

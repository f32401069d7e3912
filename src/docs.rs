use crate::model::attendance::{AttendanceDetail, AttendanceListItem, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeBrief};
use crate::summary::{Dashboard, DepartmentCount, EmployeeAttendanceSummary, TodayAttendance};
use crate::validation::attendance::AttendanceInput;
use crate::validation::employee::EmployeeInput;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "1.0.0",
        description = r#"
## HRMS Lite

Employee records and daily attendance tracking.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, search and delete employees
  - Per-employee attendance summary
- **Attendance Management**
  - Mark one Present/Absent record per employee per day
  - Filter by employee, date range and status
- **Dashboard**
  - Headcount, today's attendance, recent records, department breakdown

### 📦 Response Format
- Success: `{"message": ..., "data": ...}`
- Failure: `{"message": ..., "errors": {"field": ["reason"]}}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::list_employees_simple,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::partial_update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_attendance_summary,

        crate::api::attendance::list_attendance,
        crate::api::attendance::create_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::partial_update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::dashboard::dashboard_summary
    ),
    components(
        schemas(
            Employee,
            EmployeeBrief,
            EmployeeInput,
            EmployeeAttendanceSummary,
            AttendanceStatus,
            AttendanceInput,
            AttendanceDetail,
            AttendanceListItem,
            Dashboard,
            TodayAttendance,
            DepartmentCount
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Dashboard", description = "Aggregate counts"),
    )
)]
pub struct ApiDoc;

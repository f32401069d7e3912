use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, Transaction};
use std::str::FromStr;
use tracing::debug;

use super::uniqueness::{
    AttendanceKey, DUPLICATE_EMAIL, DUPLICATE_EMPLOYEE_ID, EmployeeKey, check_attendance,
    check_employee, duplicate_attendance,
};
use super::{RecordStore, StoreError, StoreResult};
use crate::filter::{AttendanceFilter, EmployeeFilter};
use crate::model::{
    attendance::{Attendance, AttendanceStatus, NewAttendance},
    employee::{Employee, EmployeeBrief, NewEmployee},
};
use crate::summary::{
    Dashboard, DepartmentCount, RECENT_ATTENDANCE_LIMIT, StatusCounts, most_recent,
};
use crate::utils::db_utils::{attendance_where, bind_values, employee_where};
use crate::validation::FieldErrors;

const EMPLOYEE_COLUMNS: &str =
    "e.id, e.employee_id, e.full_name, e.email, e.department, e.created_at, e.updated_at";

const ATTENDANCE_SELECT: &str = r#"
    SELECT
        a.id,
        a.employee_id AS employee,
        e.employee_id AS employee_code,
        e.full_name AS employee_name,
        e.department,
        a.date,
        a.status,
        a.created_at,
        a.updated_at
    FROM attendance a
    JOIN employees e ON e.id = a.employee_id
"#;

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    employee: u64,
    employee_code: String,
    employee_name: String,
    department: String,
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status)
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Attendance {
            id: row.id,
            employee: row.employee,
            employee_code: row.employee_code,
            employee_name: row.employee_name,
            department: row.department,
            date: row.date,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<AttendanceRow>) -> StoreResult<Vec<Attendance>> {
    rows.into_iter().map(Attendance::try_from).collect()
}

/// Maps a duplicate-key violation (SQLSTATE 23000) that slipped past the
/// locked pre-check onto the same conflict the pre-check would report.
fn unique_violation(e: sqlx::Error, conflict: impl FnOnce(&str) -> FieldErrors) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return StoreError::Conflict(conflict(db_err.message()));
        }
    }
    StoreError::Database(e)
}

fn employee_unique_violation(message: &str) -> FieldErrors {
    if message.contains("uq_employees_email") {
        FieldErrors::single("email", DUPLICATE_EMAIL)
    } else {
        FieldErrors::single("employee_id", DUPLICATE_EMPLOYEE_ID)
    }
}

/// Record store backed by MySQL through a shared `MySqlPool`.
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn lock_employee_conflicts(
        tx: &mut Transaction<'_, MySql>,
        new: &NewEmployee,
        exclude: Option<u64>,
    ) -> StoreResult<()> {
        let existing = sqlx::query_as::<_, (u64, String, String)>(
            r#"
            SELECT id, employee_id, email
            FROM employees
            WHERE employee_id = ? OR email = ?
            FOR UPDATE
            "#,
        )
        .bind(&new.employee_id)
        .bind(&new.email)
        .fetch_all(&mut **tx)
        .await?;

        check_employee(
            new,
            exclude,
            existing.iter().map(|(id, employee_id, email)| EmployeeKey {
                id: *id,
                employee_id,
                email,
            }),
        )
        .map_err(StoreError::Conflict)
    }

    /// Locks the referenced employee and any same-day record, then checks
    /// for a clash. Returns the employee's name for error messages.
    async fn lock_attendance_conflicts(
        tx: &mut Transaction<'_, MySql>,
        new: &NewAttendance,
        exclude: Option<u64>,
    ) -> StoreResult<String> {
        let (employee_name,) = sqlx::query_as::<_, (String,)>(
            "SELECT full_name FROM employees WHERE id = ? FOR UPDATE",
        )
        .bind(new.employee)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::UnknownEmployee(new.employee))?;

        let existing = sqlx::query_as::<_, (u64, u64, NaiveDate)>(
            r#"
            SELECT id, employee_id, date
            FROM attendance
            WHERE employee_id = ? AND date = ?
            FOR UPDATE
            "#,
        )
        .bind(new.employee)
        .bind(new.date)
        .fetch_all(&mut **tx)
        .await?;

        check_attendance(
            new,
            &employee_name,
            exclude,
            existing
                .into_iter()
                .map(|(id, employee, date)| AttendanceKey { id, employee, date }),
        )
        .map_err(StoreError::Conflict)?;

        Ok(employee_name)
    }

    async fn count(&self, sql: &str) -> StoreResult<i64> {
        let (total,) = sqlx::query_as::<_, (i64,)>(sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let filter_sql = employee_where(filter);
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees e {} ORDER BY e.employee_id ASC",
            filter_sql.clause()
        );
        debug!(sql = %sql, bindings = ?filter_sql.values, "Fetching employees");

        let employees = bind_values(sqlx::query_as::<_, Employee>(&sql), filter_sql.values)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn list_employees_brief(&self) -> StoreResult<Vec<EmployeeBrief>> {
        let employees = sqlx::query_as::<_, EmployeeBrief>(
            "SELECT id, employee_id, full_name, department FROM employees ORDER BY employee_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Employee> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e WHERE e.id = ?");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee> {
        let mut tx = self.pool.begin().await?;
        Self::lock_employee_conflicts(&mut tx, &new, None).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (employee_id, full_name, email, department, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.employee_id)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.department)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, employee_unique_violation))?;

        tx.commit().await?;
        self.get_employee(result.last_insert_id()).await
    }

    async fn update_employee(
        &self,
        id: u64,
        new: NewEmployee,
        now: DateTime<Utc>,
    ) -> StoreResult<Employee> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_as::<_, (u64,)>("SELECT id FROM employees WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        Self::lock_employee_conflicts(&mut tx, &new, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE employees
            SET employee_id = ?, full_name = ?, email = ?, department = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&new.employee_id)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.department)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, employee_unique_violation))?;

        tx.commit().await?;
        self.get_employee(id).await
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<Employee> {
        let employee = self.get_employee(id).await?;

        // attendance rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(employee)
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let filter_sql = attendance_where(filter);
        let sql = format!(
            "{ATTENDANCE_SELECT} {} ORDER BY a.date DESC, e.employee_id ASC",
            filter_sql.clause()
        );
        debug!(sql = %sql, bindings = ?filter_sql.values, "Fetching attendance");

        let rows = bind_values(sqlx::query_as::<_, AttendanceRow>(&sql), filter_sql.values)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn get_attendance(&self, id: u64) -> StoreResult<Attendance> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE a.id = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn create_attendance(
        &self,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance> {
        let mut tx = self.pool.begin().await?;
        let employee_name = Self::lock_attendance_conflicts(&mut tx, &new, None).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee)
        .bind(new.date)
        .bind(new.status.as_ref())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, |_| duplicate_attendance(&employee_name, new.date)))?;

        tx.commit().await?;
        self.get_attendance(result.last_insert_id()).await
    }

    async fn update_attendance(
        &self,
        id: u64,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_as::<_, (u64,)>("SELECT id FROM attendance WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        let employee_name = Self::lock_attendance_conflicts(&mut tx, &new, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE attendance
            SET employee_id = ?, date = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new.employee)
        .bind(new.date)
        .bind(new.status.as_ref())
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, |_| duplicate_attendance(&employee_name, new.date)))?;

        tx.commit().await?;
        self.get_attendance(id).await
    }

    async fn delete_attendance(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn attendance_counts(&self, employee: u64) -> StoreResult<StatusCounts> {
        self.get_employee(employee).await?;

        let groups = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM attendance WHERE employee_id = ? GROUP BY status",
        )
        .bind(employee)
        .fetch_all(&self.pool)
        .await?;
        Ok(StatusCounts::from_groups(groups))
    }

    async fn dashboard(&self, today: NaiveDate) -> StoreResult<Dashboard> {
        let total_employees = self.count("SELECT COUNT(*) FROM employees").await?;
        let total_attendance_records = self.count("SELECT COUNT(*) FROM attendance").await?;

        let today_groups = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM attendance WHERE date = ? GROUP BY status",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        let recent_sql = format!("{ATTENDANCE_SELECT} ORDER BY a.date DESC, a.created_at DESC LIMIT ?");
        let recent_rows = sqlx::query_as::<_, AttendanceRow>(&recent_sql)
            .bind(RECENT_ATTENDANCE_LIMIT as u64)
            .fetch_all(&self.pool)
            .await?;

        let department_stats = sqlx::query_as::<_, DepartmentCount>(
            r#"
            SELECT department, COUNT(*) AS count
            FROM employees
            GROUP BY department
            ORDER BY count DESC, department ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Dashboard {
            total_employees,
            total_attendance_records,
            today_attendance: StatusCounts::from_groups(today_groups).into(),
            recent_attendance: most_recent(into_records(recent_rows)?, RECENT_ATTENDANCE_LIMIT),
            department_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_key_message_picks_conflicting_field() {
        let email = employee_unique_violation("Duplicate entry 'a@x.io' for key 'employees.uq_employees_email'");
        assert!(email.contains("email"));

        let id = employee_unique_violation("Duplicate entry 'E1' for key 'employees.uq_employees_employee_id'");
        assert!(id.contains("employee_id"));
        assert!(!id.contains("email"));

        let quoted = employee_unique_violation(
            "Duplicate entry 'email1' for key 'employees.uq_employees_employee_id'",
        );
        assert!(quoted.contains("employee_id"));
        assert!(!quoted.contains("email"));
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        let err = unique_violation(sqlx::Error::RowNotFound, employee_unique_violation);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}

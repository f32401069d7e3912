//! Record store: the persistent home of employees and their attendance.
//!
//! Handlers only see `dyn RecordStore`. Creates and updates run the
//! uniqueness check and the write as one atomic unit inside the store.

pub mod memory;
pub mod mysql;
pub mod uniqueness;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Display, Error};

use crate::filter::{AttendanceFilter, EmployeeFilter};
use crate::model::{
    attendance::{Attendance, NewAttendance},
    employee::{Employee, EmployeeBrief, NewEmployee},
};
use crate::summary::{Dashboard, StatusCounts};
use crate::validation::FieldErrors;

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display(fmt = "record not found")]
    NotFound,
    #[display(fmt = "employee {} does not exist", _0)]
    UnknownEmployee(#[error(not(source))] u64),
    #[display(fmt = "uniqueness conflict")]
    Conflict(#[error(not(source))] FieldErrors),
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>>;
    async fn list_employees_brief(&self) -> StoreResult<Vec<EmployeeBrief>>;
    async fn get_employee(&self, id: u64) -> StoreResult<Employee>;
    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee>;
    async fn update_employee(
        &self,
        id: u64,
        new: NewEmployee,
        now: DateTime<Utc>,
    ) -> StoreResult<Employee>;
    /// Removes the employee and all of its attendance; returns the removed employee.
    async fn delete_employee(&self, id: u64) -> StoreResult<Employee>;

    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>>;
    async fn get_attendance(&self, id: u64) -> StoreResult<Attendance>;
    async fn create_attendance(
        &self,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance>;
    async fn update_attendance(
        &self,
        id: u64,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance>;
    async fn delete_attendance(&self, id: u64) -> StoreResult<()>;

    /// Present/absent counts for one employee; `NotFound` if it does not exist.
    async fn attendance_counts(&self, employee: u64) -> StoreResult<StatusCounts>;
    async fn dashboard(&self, today: NaiveDate) -> StoreResult<Dashboard>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn database_error_keeps_its_source() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        let source = err.source().expect("sqlx error as source");
        assert_eq!(source.to_string(), sqlx::Error::RowNotFound.to_string());

        assert!(StoreError::UnknownEmployee(3).source().is_none());
        assert!(StoreError::Conflict(FieldErrors::non_field("clash")).source().is_none());
    }
}

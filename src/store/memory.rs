use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::uniqueness::{AttendanceKey, EmployeeKey, check_attendance, check_employee};
use super::{RecordStore, StoreError, StoreResult};
use crate::filter::{AttendanceFilter, EmployeeFilter, attendance_order, employee_order};
use crate::model::{
    attendance::{Attendance, AttendanceStatus, NewAttendance},
    employee::{Employee, EmployeeBrief, NewEmployee},
};
use crate::summary::{
    Dashboard, RECENT_ATTENDANCE_LIMIT, StatusCounts, department_stats, most_recent,
};

#[derive(Debug, Clone)]
struct AttendanceRow {
    id: u64,
    employee: u64,
    date: NaiveDate,
    status: AttendanceStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    last_employee_id: u64,
    last_attendance_id: u64,
    employees: BTreeMap<u64, Employee>,
    attendance: BTreeMap<u64, AttendanceRow>,
}

impl Tables {
    fn join(&self, row: &AttendanceRow) -> Option<Attendance> {
        let employee = self.employees.get(&row.employee)?;
        Some(Attendance {
            id: row.id,
            employee: row.employee,
            employee_code: employee.employee_id.clone(),
            employee_name: employee.full_name.clone(),
            department: employee.department.clone(),
            date: row.date,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn joined(&self) -> impl Iterator<Item = Attendance> + '_ {
        self.attendance.values().filter_map(move |row| self.join(row))
    }

    fn employee_keys(&self) -> impl Iterator<Item = EmployeeKey<'_>> {
        self.employees.values().map(|e| EmployeeKey {
            id: e.id,
            employee_id: &e.employee_id,
            email: &e.email,
        })
    }

    fn attendance_keys(&self) -> impl Iterator<Item = AttendanceKey> + '_ {
        self.attendance.values().map(|row| AttendanceKey {
            id: row.id,
            employee: row.employee,
            date: row.date,
        })
    }

    fn employee_name(&self, id: u64) -> StoreResult<String> {
        self.employees
            .get(&id)
            .map(|e| e.full_name.clone())
            .ok_or(StoreError::UnknownEmployee(id))
    }
}

/// Record store held in process memory. One mutex guards both tables, so
/// every check-then-write happens under a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let tables = self.tables();
        let mut employees: Vec<Employee> = tables
            .employees
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        employees.sort_by(employee_order);
        Ok(employees)
    }

    async fn list_employees_brief(&self) -> StoreResult<Vec<EmployeeBrief>> {
        let tables = self.tables();
        let mut employees: Vec<&Employee> = tables.employees.values().collect();
        employees.sort_by(|a, b| employee_order(a, b));
        Ok(employees.into_iter().map(EmployeeBrief::from).collect())
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Employee> {
        self.tables()
            .employees
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee> {
        let mut tables = self.tables();
        check_employee(&new, None, tables.employee_keys()).map_err(StoreError::Conflict)?;

        tables.last_employee_id += 1;
        let employee = Employee {
            id: tables.last_employee_id,
            employee_id: new.employee_id,
            full_name: new.full_name,
            email: new.email,
            department: new.department,
            created_at: now,
            updated_at: now,
        };
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: u64,
        new: NewEmployee,
        now: DateTime<Utc>,
    ) -> StoreResult<Employee> {
        let mut tables = self.tables();
        if !tables.employees.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        check_employee(&new, Some(id), tables.employee_keys()).map_err(StoreError::Conflict)?;

        let employee = tables.employees.get_mut(&id).ok_or(StoreError::NotFound)?;
        employee.employee_id = new.employee_id;
        employee.full_name = new.full_name;
        employee.email = new.email;
        employee.department = new.department;
        employee.updated_at = now;
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<Employee> {
        let mut tables = self.tables();
        let employee = tables.employees.remove(&id).ok_or(StoreError::NotFound)?;
        tables.attendance.retain(|_, row| row.employee != id);
        Ok(employee)
    }

    async fn list_attendance(&self, filter: &AttendanceFilter) -> StoreResult<Vec<Attendance>> {
        let tables = self.tables();
        let mut records: Vec<Attendance> = tables.joined().filter(|r| filter.matches(r)).collect();
        records.sort_by(attendance_order);
        Ok(records)
    }

    async fn get_attendance(&self, id: u64) -> StoreResult<Attendance> {
        let tables = self.tables();
        tables
            .attendance
            .get(&id)
            .and_then(|row| tables.join(row))
            .ok_or(StoreError::NotFound)
    }

    async fn create_attendance(
        &self,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance> {
        let mut tables = self.tables();
        let employee_name = tables.employee_name(new.employee)?;
        check_attendance(&new, &employee_name, None, tables.attendance_keys())
            .map_err(StoreError::Conflict)?;

        tables.last_attendance_id += 1;
        let row = AttendanceRow {
            id: tables.last_attendance_id,
            employee: new.employee,
            date: new.date,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        let record = tables.join(&row).ok_or(StoreError::UnknownEmployee(new.employee))?;
        tables.attendance.insert(row.id, row);
        Ok(record)
    }

    async fn update_attendance(
        &self,
        id: u64,
        new: NewAttendance,
        now: DateTime<Utc>,
    ) -> StoreResult<Attendance> {
        let mut tables = self.tables();
        if !tables.attendance.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let employee_name = tables.employee_name(new.employee)?;
        check_attendance(&new, &employee_name, Some(id), tables.attendance_keys())
            .map_err(StoreError::Conflict)?;

        let row = tables.attendance.get_mut(&id).ok_or(StoreError::NotFound)?;
        row.employee = new.employee;
        row.date = new.date;
        row.status = new.status;
        row.updated_at = now;
        let row = row.clone();
        tables.join(&row).ok_or(StoreError::UnknownEmployee(new.employee))
    }

    async fn delete_attendance(&self, id: u64) -> StoreResult<()> {
        self.tables()
            .attendance
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn attendance_counts(&self, employee: u64) -> StoreResult<StatusCounts> {
        let tables = self.tables();
        if !tables.employees.contains_key(&employee) {
            return Err(StoreError::NotFound);
        }
        Ok(StatusCounts::tally(
            tables
                .attendance
                .values()
                .filter(|row| row.employee == employee)
                .map(|row| row.status),
        ))
    }

    async fn dashboard(&self, today: NaiveDate) -> StoreResult<Dashboard> {
        let tables = self.tables();
        let today_counts = StatusCounts::tally(
            tables
                .attendance
                .values()
                .filter(|row| row.date == today)
                .map(|row| row.status),
        );

        Ok(Dashboard {
            total_employees: tables.employees.len() as i64,
            total_attendance_records: tables.attendance.len() as i64,
            today_attendance: today_counts.into(),
            recent_attendance: most_recent(tables.joined().collect(), RECENT_ATTENDANCE_LIMIT),
            department_stats: department_stats(
                tables.employees.values().map(|e| e.department.as_str()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn new_employee(employee_id: &str, email: &str, department: &str) -> NewEmployee {
        NewEmployee {
            employee_id: employee_id.into(),
            full_name: "Test Person".into(),
            email: email.into(),
            department: department.into(),
        }
    }

    #[actix_web::test]
    async fn assigns_increasing_surrogate_keys_and_timestamps() {
        let store = MemoryStore::new();
        let a = store.create_employee(new_employee("E1", "a@x.io", "IT"), now()).await.unwrap();
        let b = store.create_employee(new_employee("E2", "b@x.io", "IT"), now()).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.created_at, now());
        assert_eq!(a.updated_at, now());
    }

    #[actix_web::test]
    async fn rejects_duplicate_identity_on_create_and_update() {
        let store = MemoryStore::new();
        store.create_employee(new_employee("E1", "a@x.io", "IT"), now()).await.unwrap();
        let b = store.create_employee(new_employee("E2", "b@x.io", "IT"), now()).await.unwrap();

        let err = store
            .create_employee(new_employee("E1", "c@x.io", "IT"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref e) if e.contains("employee_id")));

        let err = store
            .update_employee(b.id, new_employee("E2", "a@x.io", "IT"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref e) if e.contains("email")));
    }

    #[actix_web::test]
    async fn update_refreshes_updated_at_only() {
        let store = MemoryStore::new();
        let e = store.create_employee(new_employee("E1", "a@x.io", "IT"), now()).await.unwrap();
        let later = now() + Duration::hours(1);

        let updated = store
            .update_employee(e.id, new_employee("E1", "a@x.io", "HR"), later)
            .await
            .unwrap();
        assert_eq!(updated.created_at, now());
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.department, "HR");
    }

    #[actix_web::test]
    async fn deleting_employee_cascades_to_attendance() {
        let store = MemoryStore::new();
        let e = store.create_employee(new_employee("E1", "a@x.io", "IT"), now()).await.unwrap();
        let date = now().date_naive();
        let record = store
            .create_attendance(
                NewAttendance { employee: e.id, date, status: AttendanceStatus::Present },
                now(),
            )
            .await
            .unwrap();

        store.delete_employee(e.id).await.unwrap();

        assert!(matches!(store.get_attendance(record.id).await, Err(StoreError::NotFound)));
        assert!(store.list_attendance(&AttendanceFilter::default()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn attendance_for_unknown_employee_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_attendance(
                NewAttendance {
                    employee: 42,
                    date: now().date_naive(),
                    status: AttendanceStatus::Absent,
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownEmployee(42)));
    }

    #[actix_web::test]
    async fn counts_require_existing_employee() {
        let store = MemoryStore::new();
        assert!(matches!(store.attendance_counts(1).await, Err(StoreError::NotFound)));

        let e = store.create_employee(new_employee("E1", "a@x.io", "IT"), now()).await.unwrap();
        for (days, status) in [(0, AttendanceStatus::Present), (1, AttendanceStatus::Absent), (2, AttendanceStatus::Present)] {
            store
                .create_attendance(
                    NewAttendance {
                        employee: e.id,
                        date: now().date_naive() - Duration::days(days),
                        status,
                    },
                    now(),
                )
                .await
                .unwrap();
        }

        let counts = store.attendance_counts(e.id).await.unwrap();
        assert_eq!(counts, StatusCounts { present: 2, absent: 1 });
    }
}

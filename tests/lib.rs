//! Shared fixtures for the service-level integration tests: an in-memory
//! sqlite database with the HR tables and helpers to populate it.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use entity::{
    departments,
    employees::{self, EmploymentStatus, EmploymentType},
    users,
};
use platform_authz::{Actor, Role};
use platform_db::DbPool;
use products_hr::HrService;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, EntityTrait, Set, Statement,
    prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE departments (
        id BLOB PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        manager_id BLOB,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE employees (
        id BLOB PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        position TEXT,
        department_id BLOB,
        manager_id BLOB,
        status TEXT NOT NULL,
        employment_type TEXT NOT NULL,
        hire_date TEXT,
        termination_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(department_id) REFERENCES departments(id) ON DELETE SET NULL
    );
    "#,
    r#"
    CREATE TABLE attendance (
        id BLOB PRIMARY KEY,
        employee_id BLOB NOT NULL,
        date TEXT NOT NULL,
        time_in TEXT,
        time_out TEXT,
        status TEXT NOT NULL,
        hours_worked REAL NOT NULL DEFAULT 0,
        notes TEXT,
        recorded_by_id BLOB,
        is_remote_work INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(employee_id, date),
        FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE leave_requests (
        id BLOB PRIMARY KEY,
        employee_id BLOB NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        leave_type TEXT NOT NULL,
        status TEXT NOT NULL,
        reason TEXT,
        total_days REAL NOT NULL,
        approved_by_id BLOB,
        approved_at TEXT,
        approver_notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE compliance_records (
        id BLOB PRIMARY KEY,
        employee_id BLOB NOT NULL,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        description TEXT,
        issue_date TEXT,
        expiration_date TEXT,
        issuing_authority TEXT,
        license_number TEXT,
        verified_by_id BLOB,
        verified_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE documents (
        id BLOB PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        document_type TEXT NOT NULL,
        access_level TEXT NOT NULL,
        file_name TEXT NOT NULL,
        file_path TEXT NOT NULL,
        mime_type TEXT,
        employee_id BLOB,
        department_id BLOB,
        expiration_date TEXT,
        uploaded_by_id BLOB NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE users (
        id BLOB PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT,
        role TEXT NOT NULL,
        department_id BLOB,
        employee_id BLOB,
        utc_offset_minutes INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE sessions (
        id BLOB PRIMARY KEY,
        user_id BLOB NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        ip TEXT,
        user_agent TEXT,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    "#,
];

/// Instant every fixture service reads as "now".
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Fresh in-memory database with the HR tables.
pub async fn memory_db() -> Result<DbPool> {
    let db = Database::connect("sqlite::memory:").await?;
    for statement in SCHEMA {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, *statement))
            .await?;
    }
    Ok(db)
}

/// Service over a fresh database with the clock pinned to [`fixed_now`].
pub async fn service() -> Result<HrService> {
    let db = memory_db().await?;
    Ok(HrService::new(db).with_clock(fixed_now))
}

pub async fn insert_department(db: &DbPool, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now: DateTimeWithTimeZone = fixed_now().into();
    departments::Entity::insert(departments::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(None),
        manager_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .exec_without_returning(db)
    .await?;
    Ok(id)
}

pub async fn insert_employee(db: &DbPool, name: &str, department_id: Option<Uuid>) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now: DateTimeWithTimeZone = fixed_now().into();
    employees::Entity::insert(employees::ActiveModel {
        id: Set(id),
        first_name: Set(name.to_string()),
        last_name: Set("Tester".to_string()),
        email: Set(format!("{}@example.test", name.to_lowercase())),
        phone: Set(None),
        position: Set(None),
        department_id: Set(department_id),
        manager_id: Set(None),
        status: Set(EmploymentStatus::Active),
        employment_type: Set(EmploymentType::FullTime),
        hire_date: Set(None),
        termination_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .exec_without_returning(db)
    .await?;
    Ok(id)
}

/// Login row for `email` carrying the given role name and scope.
pub async fn insert_user(
    db: &DbPool,
    email: &str,
    role: &str,
    department_id: Option<Uuid>,
    employee_id: Option<Uuid>,
    is_active: bool,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    users::Entity::insert(users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        name: Set(None),
        role: Set(role.to_string()),
        department_id: Set(department_id),
        employee_id: Set(employee_id),
        utc_offset_minutes: Set(0),
        is_active: Set(is_active),
        created_at: Set(fixed_now().into()),
    })
    .exec_without_returning(db)
    .await?;
    Ok(id)
}

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

pub fn hr_manager() -> Actor {
    Actor::new(Uuid::new_v4(), Role::HrManager)
}

pub fn department_head(department_id: Uuid, employee_id: Uuid) -> Actor {
    Actor::new(Uuid::new_v4(), Role::DepartmentHead)
        .with_department(department_id)
        .with_employee(employee_id)
}

pub fn staff(department_id: Uuid, employee_id: Uuid) -> Actor {
    Actor::new(Uuid::new_v4(), Role::Employee)
        .with_department(department_id)
        .with_employee(employee_id)
}

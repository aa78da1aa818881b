use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

const UP_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS pgcrypto;

CREATE TABLE IF NOT EXISTS departments (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name varchar(100) NOT NULL UNIQUE,
    description text NULL,
    manager_id uuid NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS employees (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name varchar(100) NOT NULL,
    last_name varchar(100) NOT NULL,
    email text NOT NULL UNIQUE,
    phone varchar(20) NULL,
    position text NULL,
    department_id uuid NULL REFERENCES departments(id) ON DELETE SET NULL,
    manager_id uuid NULL REFERENCES employees(id) ON DELETE SET NULL,
    status varchar(32) NOT NULL DEFAULT 'active',
    employment_type varchar(32) NOT NULL DEFAULT 'full_time',
    hire_date date NULL,
    termination_date date NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS employees_department_idx ON employees (department_id);
CREATE INDEX IF NOT EXISTS employees_last_name_idx ON employees (last_name);

ALTER TABLE departments
    ADD CONSTRAINT departments_manager_fk
    FOREIGN KEY (manager_id) REFERENCES employees(id) ON DELETE SET NULL;

CREATE TABLE IF NOT EXISTS users (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    email text NOT NULL UNIQUE,
    name text NULL,
    role varchar(32) NOT NULL DEFAULT 'employee',
    department_id uuid NULL REFERENCES departments(id) ON DELETE SET NULL,
    employee_id uuid NULL REFERENCES employees(id) ON DELETE SET NULL,
    utc_offset_minutes integer NOT NULL DEFAULT 0,
    is_active boolean NOT NULL DEFAULT true,
    created_at timestamptz NOT NULL DEFAULT now()
);
"#;

const DOWN_SQL: &str = r#"
DROP TABLE IF EXISTS users CASCADE;
ALTER TABLE IF EXISTS departments DROP CONSTRAINT IF EXISTS departments_manager_fk;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS departments CASCADE;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}

use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS attendance (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id uuid NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    date date NOT NULL,
    time_in time NULL,
    time_out time NULL,
    status varchar(16) NOT NULL DEFAULT 'present',
    hours_worked double precision NOT NULL DEFAULT 0,
    notes text NULL,
    recorded_by_id uuid NULL,
    is_remote_work boolean NOT NULL DEFAULT false,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    UNIQUE (employee_id, date)
);

CREATE TABLE IF NOT EXISTS leave_requests (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id uuid NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    start_date date NOT NULL,
    end_date date NOT NULL,
    leave_type varchar(16) NOT NULL DEFAULT 'vacation',
    status varchar(16) NOT NULL DEFAULT 'pending',
    reason text NULL,
    total_days double precision NOT NULL DEFAULT 1,
    approved_by_id uuid NULL,
    approved_at timestamptz NULL,
    approver_notes text NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    CHECK (end_date >= start_date)
);

CREATE INDEX IF NOT EXISTS leave_requests_employee_idx ON leave_requests (employee_id);

CREATE TABLE IF NOT EXISTS compliance_records (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id uuid NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    title varchar(100) NOT NULL,
    kind varchar(32) NOT NULL DEFAULT 'license',
    status varchar(16) NOT NULL DEFAULT 'pending',
    description text NULL,
    issue_date date NULL,
    expiration_date date NULL,
    issuing_authority text NULL,
    license_number text NULL,
    verified_by_id uuid NULL,
    verified_at timestamptz NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS compliance_records_employee_idx ON compliance_records (employee_id);

CREATE TABLE IF NOT EXISTS documents (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    title varchar(255) NOT NULL,
    description text NULL,
    document_type varchar(32) NOT NULL DEFAULT 'other',
    access_level varchar(16) NOT NULL DEFAULT 'hr',
    file_name text NOT NULL,
    file_path text NOT NULL,
    mime_type text NULL,
    employee_id uuid NULL REFERENCES employees(id) ON DELETE SET NULL,
    department_id uuid NULL REFERENCES departments(id) ON DELETE SET NULL,
    expiration_date date NULL,
    uploaded_by_id uuid NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS documents_employee_idx ON documents (employee_id);
CREATE INDEX IF NOT EXISTS documents_department_idx ON documents (department_id);
"#;

const DOWN_SQL: &str = r#"
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS compliance_records CASCADE;
DROP TABLE IF EXISTS leave_requests CASCADE;
DROP TABLE IF EXISTS attendance CASCADE;
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

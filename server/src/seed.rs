//! Demo fixtures: a few departments, their staff and one login per role.

use anyhow::Result;
use chrono::Utc;
use entity::{
    departments,
    employees::{self, EmploymentStatus, EmploymentType},
    users,
};
use platform_authz::Role;
use platform_db::DbPool;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SeedReport {
    pub departments: usize,
    pub employees: usize,
    pub users: usize,
}

struct StaffFixture {
    first_name: &'static str,
    last_name: &'static str,
    position: &'static str,
    department: &'static str,
    role: Role,
}

const DEPARTMENTS: &[(&str, &str)] = &[
    ("Human Resources", "People operations and compliance"),
    ("Nursing", "Clinical nursing staff"),
    ("Facilities", "Buildings and maintenance"),
];

const STAFF: &[StaffFixture] = &[
    StaffFixture {
        first_name: "Avery",
        last_name: "Stone",
        position: "Systems Administrator",
        department: "Human Resources",
        role: Role::Admin,
    },
    StaffFixture {
        first_name: "Harper",
        last_name: "Quinn",
        position: "HR Manager",
        department: "Human Resources",
        role: Role::HrManager,
    },
    StaffFixture {
        first_name: "Morgan",
        last_name: "Reyes",
        position: "Head of Nursing",
        department: "Nursing",
        role: Role::DepartmentHead,
    },
    StaffFixture {
        first_name: "Jordan",
        last_name: "Lee",
        position: "Registered Nurse",
        department: "Nursing",
        role: Role::Employee,
    },
    StaffFixture {
        first_name: "Casey",
        last_name: "Ito",
        position: "Maintenance Technician",
        department: "Facilities",
        role: Role::Employee,
    },
];

fn email_for(staff: &StaffFixture) -> String {
    format!(
        "{}.{}@example.test",
        staff.first_name.to_lowercase(),
        staff.last_name.to_lowercase()
    )
}

/// Insert fixtures that are not present yet. Safe to run repeatedly.
pub async fn run(pool: &DbPool) -> Result<SeedReport> {
    let txn = pool.begin().await?;
    let mut report = SeedReport::default();
    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
    for (name, description) in DEPARTMENTS {
        let existing = departments::Entity::find()
            .filter(departments::Column::Name.eq(*name))
            .one(&txn)
            .await?;
        let id = match existing {
            Some(department) => department.id,
            None => {
                let id = Uuid::new_v4();
                departments::Entity::insert(departments::ActiveModel {
                    id: Set(id),
                    name: Set(name.to_string()),
                    description: Set(Some(description.to_string())),
                    manager_id: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                })
                .exec_without_returning(&txn)
                .await?;
                report.departments += 1;
                id
            }
        };
        department_ids.push((*name, id));
    }

    for staff in STAFF {
        let email = email_for(staff);
        let department_id = department_ids
            .iter()
            .find(|(name, _)| *name == staff.department)
            .map(|(_, id)| *id);

        let employee_id = match employees::Entity::find()
            .filter(employees::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await?
        {
            Some(employee) => employee.id,
            None => {
                let id = Uuid::new_v4();
                employees::Entity::insert(employees::ActiveModel {
                    id: Set(id),
                    first_name: Set(staff.first_name.to_string()),
                    last_name: Set(staff.last_name.to_string()),
                    email: Set(email.clone()),
                    phone: Set(None),
                    position: Set(Some(staff.position.to_string())),
                    department_id: Set(department_id),
                    manager_id: Set(None),
                    status: Set(EmploymentStatus::Active),
                    employment_type: Set(EmploymentType::FullTime),
                    hire_date: Set(Some(now.date_naive())),
                    termination_date: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                })
                .exec_without_returning(&txn)
                .await?;
                report.employees += 1;
                id
            }
        };

        let has_user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if !has_user {
            users::Entity::insert(users::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(email.clone()),
                name: Set(Some(format!("{} {}", staff.first_name, staff.last_name))),
                role: Set(staff.role.as_str().to_string()),
                department_id: Set(department_id),
                employee_id: Set(Some(employee_id)),
                utc_offset_minutes: Set(0),
                is_active: Set(true),
                created_at: Set(now),
            })
            .exec_without_returning(&txn)
            .await?;
            report.users += 1;
        }
        debug!(%email, role = %staff.role, "seeded staff member");
    }

    txn.commit().await?;
    Ok(report)
}

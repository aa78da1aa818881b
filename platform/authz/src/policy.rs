//! Per-resource action policy table.
//!
//! Evaluation order, first match wins:
//! 1. the department-delete business guard (applies to every role),
//! 2. admin,
//! 3. resource-specific overrides for department heads and employees,
//! 4. hr_manager and above, except department delete which stays admin-only,
//! 5. deny with `insufficient-role`.
//!
//! Documents additionally pass through the access-level rule on reads.

use chrono::NaiveDate;

use crate::{
    Action, Actor, Decision, ReasonCode, Resource, ResourceType, Role, access_level,
    role::rank_of,
    scope::{is_owner, same_department},
};

pub(crate) fn evaluate(
    actor: &Actor,
    resource_type: ResourceType,
    action: Action,
    resource: &Resource,
    today: NaiveDate,
) -> Decision {
    let department_delete = resource_type == ResourceType::Department && action == Action::Delete;
    if department_delete && resource.employee_count != Some(0) {
        return Decision::deny(ReasonCode::DepartmentNotEmpty);
    }

    let rank = rank_of(actor.role);
    let verdict = if rank >= Role::Admin.rank() {
        Decision::allow(ReasonCode::Admin)
    } else if let Some(verdict) = resource_override(actor, resource_type, action, resource, today) {
        verdict
    } else if rank >= Role::HrManager.rank() && !department_delete {
        Decision::allow(ReasonCode::RoleGranted)
    } else {
        Decision::deny(ReasonCode::InsufficientRole)
    };

    if verdict.allowed && resource_type == ResourceType::Document && action.is_read() {
        let level = resource.access_level.unwrap_or_default();
        if !access_level::permits(level, actor, resource) {
            return Decision::deny(ReasonCode::AccessLevelRestricted);
        }
    }
    verdict
}

fn resource_override(
    actor: &Actor,
    resource_type: ResourceType,
    action: Action,
    resource: &Resource,
    today: NaiveDate,
) -> Option<Decision> {
    match actor.role? {
        Role::DepartmentHead => department_scope(actor, resource_type, action, resource).or_else(
            || match (resource_type, action) {
                // Department heads still file their own leave and clock their own time.
                (ResourceType::Attendance | ResourceType::Leave, Action::Create) => {
                    self_service(actor, resource_type, action, resource, today)
                }
                _ => None,
            },
        ),
        Role::Employee => self_service(actor, resource_type, action, resource, today),
        Role::Admin | Role::HrManager => None,
    }
}

fn department_scope(
    actor: &Actor,
    resource_type: ResourceType,
    action: Action,
    resource: &Resource,
) -> Option<Decision> {
    let permitted = match resource_type {
        ResourceType::Employee | ResourceType::Attendance | ResourceType::Leave => {
            action.is_read() || action == Action::Update
        }
        ResourceType::Compliance | ResourceType::Document => action.is_read(),
        ResourceType::Department => false,
    };
    (permitted && same_department(actor.department_id, resource.department_id))
        .then(|| Decision::allow(ReasonCode::DepartmentScope))
}

fn self_service(
    actor: &Actor,
    resource_type: ResourceType,
    action: Action,
    resource: &Resource,
    today: NaiveDate,
) -> Option<Decision> {
    let owner = is_owner(actor.employee_id, resource.employee_id);
    let owned = || owner.then(|| Decision::allow(ReasonCode::SelfOwned));
    match (resource_type, action) {
        (ResourceType::Attendance, Action::Create | Action::Update) => {
            if resource.date != Some(today) {
                return Some(Decision::deny(ReasonCode::StaleRecord));
            }
            owned()
        }
        (ResourceType::Leave, Action::Create) => owned(),
        (
            ResourceType::Employee
            | ResourceType::Attendance
            | ResourceType::Leave
            | ResourceType::Compliance
            | ResourceType::Document,
            Action::Read | Action::List,
        ) => owned(),
        _ => None,
    }
}

//! Authorization primitives for the HR suite.
//!
//! Every data operation asks [`decide`] before touching persistence. The
//! function is pure: the caller supplies the actor, the resource's scoping
//! attributes and the actor's local calendar date.

mod access_level;
mod decision;
mod policy;
mod resource;
mod role;
mod scope;

use chrono::NaiveDate;
use thiserror::Error;

pub use access_level::permits as access_level_permits;
pub use decision::{Decision, ReasonCode};
pub use resource::{AccessLevel, Action, Actor, Resource, ResourceType};
pub use role::{Role, rank, rank_of};
pub use scope::{is_owner, same_department};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("action {action} denied for resource {resource}: {reason}")]
    Denied {
        action: String,
        resource: String,
        reason: ReasonCode,
    },
    #[error("unknown role {0}")]
    UnknownRole(String),
    #[error("unknown resource type {0}")]
    UnknownResourceType(String),
    #[error("unknown action {0}")]
    UnknownAction(String),
    #[error("unknown access level {0}")]
    UnknownAccessLevel(String),
}

/// Decide whether `actor` may perform `action` on a resource of
/// `resource_type` with the given scoping attributes.
pub fn decide(
    actor: &Actor,
    resource_type: ResourceType,
    action: Action,
    resource: &Resource,
    today: NaiveDate,
) -> Decision {
    policy::evaluate(actor, resource_type, action, resource, today)
}

/// String-typed entry point. Unrecognised resource types or actions are denied
/// with [`ReasonCode::UnknownResourceOrAction`].
pub fn decide_named(
    actor: &Actor,
    resource_type: &str,
    action: &str,
    resource: &Resource,
    today: NaiveDate,
) -> Decision {
    match (resource_type.parse(), action.parse()) {
        (Ok(resource_type), Ok(action)) => decide(actor, resource_type, action, resource, today),
        _ => Decision::deny(ReasonCode::UnknownResourceOrAction),
    }
}

/// Request-scoped view over [`decide`].
#[derive(Clone, Debug)]
pub struct PolicyContext<'a> {
    pub actor: &'a Actor,
    pub resource_type: ResourceType,
    pub action: Action,
    pub resource: &'a Resource,
    pub today: NaiveDate,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn decide(&self, ctx: &PolicyContext<'_>) -> Decision {
        decide(ctx.actor, ctx.resource_type, ctx.action, ctx.resource, ctx.today)
    }

    pub fn check(&self, ctx: &PolicyContext<'_>) -> Result<Decision, AuthzError> {
        let decision = self.decide(ctx);
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AuthzError::Denied {
                action: ctx.action.to_string(),
                resource: ctx.resource_type.to_string(),
                reason: decision.reason_code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn employee(employee_id: Uuid, department_id: Uuid) -> Actor {
        Actor::new(Uuid::new_v4(), Role::Employee)
            .with_employee(employee_id)
            .with_department(department_id)
    }

    fn head(department_id: Uuid) -> Actor {
        Actor::new(Uuid::new_v4(), Role::DepartmentHead).with_department(department_id)
    }

    fn sample_resources() -> Vec<Resource> {
        let dept = Uuid::new_v4();
        let emp = Uuid::new_v4();
        let mut resources = vec![
            Resource::default(),
            Resource::in_department(Some(dept)),
            Resource::owned_by(Some(emp), Some(dept)),
            Resource::attendance(emp, Some(dept), today() - Duration::days(3)),
            Resource::department(dept, 0),
        ];
        for level in AccessLevel::ALL {
            resources.push(Resource::owned_by(Some(emp), None).with_access_level(level));
        }
        resources
    }

    #[test]
    fn admin_is_allowed_everything_but_non_empty_department_delete() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        for resource_type in ResourceType::ALL {
            for action in Action::ALL {
                for resource in sample_resources() {
                    let department_delete = resource_type == ResourceType::Department
                        && action == Action::Delete
                        && resource.employee_count != Some(0);
                    let decision = decide(&admin, resource_type, action, &resource, today());
                    assert_eq!(
                        decision.allowed, !department_delete,
                        "{resource_type} {action} {resource:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn decisions_are_deterministic() {
        let actor = employee(Uuid::new_v4(), Uuid::new_v4());
        for resource_type in ResourceType::ALL {
            for action in Action::ALL {
                for resource in sample_resources() {
                    let first = decide(&actor, resource_type, action, &resource, today());
                    let second = decide(&actor, resource_type, action, &resource, today());
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn department_head_without_resource_department_is_denied() {
        let actor = head(Uuid::new_v4()).with_employee(Uuid::new_v4());
        let resource = Resource::owned_by(Some(Uuid::new_v4()), None).with_date(today());
        let scoped = [
            (ResourceType::Employee, Action::Read),
            (ResourceType::Employee, Action::List),
            (ResourceType::Employee, Action::Update),
            (ResourceType::Attendance, Action::Read),
            (ResourceType::Attendance, Action::Update),
            (ResourceType::Leave, Action::Read),
            (ResourceType::Leave, Action::Update),
            (ResourceType::Compliance, Action::Read),
            (ResourceType::Document, Action::List),
        ];
        for (resource_type, action) in scoped {
            let decision = decide(&actor, resource_type, action, &resource, today());
            assert!(decision.is_denied(), "{resource_type} {action}");
        }
    }

    #[test]
    fn department_head_without_own_department_is_denied() {
        let actor = Actor::new(Uuid::new_v4(), Role::DepartmentHead);
        let resource = Resource::in_department(Some(Uuid::new_v4()));
        let decision = decide(&actor, ResourceType::Employee, Action::Read, &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn employee_attendance_update_is_time_boxed() {
        let emp = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let actor = employee(emp, dept);

        let stale = Resource::attendance(emp, Some(dept), today() - Duration::days(1));
        let decision = decide(&actor, ResourceType::Attendance, Action::Update, &stale, today());
        assert_eq!(decision, Decision::deny(ReasonCode::StaleRecord));

        let future = Resource::attendance(emp, Some(dept), today() + Duration::days(1));
        let decision = decide(&actor, ResourceType::Attendance, Action::Update, &future, today());
        assert_eq!(decision, Decision::deny(ReasonCode::StaleRecord));

        let current = Resource::attendance(emp, Some(dept), today());
        let decision = decide(&actor, ResourceType::Attendance, Action::Update, &current, today());
        assert_eq!(decision, Decision::allow(ReasonCode::SelfOwned));
    }

    #[test]
    fn stale_record_wins_over_ownership() {
        let actor = employee(Uuid::new_v4(), Uuid::new_v4());
        let someone_else = Resource::attendance(Uuid::new_v4(), None, today() - Duration::days(2));
        let decision = decide(&actor, ResourceType::Attendance, Action::Update, &someone_else, today());
        assert_eq!(decision.reason_code, ReasonCode::StaleRecord);

        let undated = Resource::owned_by(actor.employee_id, None);
        let decision = decide(&actor, ResourceType::Attendance, Action::Create, &undated, today());
        assert_eq!(decision.reason_code, ReasonCode::StaleRecord);
    }

    #[test]
    fn employee_cannot_delete_own_attendance() {
        let emp = Uuid::new_v4();
        let actor = employee(emp, Uuid::new_v4());
        let resource = Resource::attendance(emp, None, today());
        let decision = decide(&actor, ResourceType::Attendance, Action::Delete, &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn document_access_level_widening_never_denies_more() {
        let emp = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let actors = [
            employee(emp, dept),
            employee(Uuid::new_v4(), dept),
            head(dept),
            Actor::new(Uuid::new_v4(), Role::HrManager),
            Actor::new(Uuid::new_v4(), Role::Admin),
        ];
        for actor in &actors {
            for action in [Action::Read, Action::List] {
                let individual = Resource::owned_by(Some(emp), Some(dept))
                    .with_access_level(AccessLevel::Individual);
                let public = Resource::owned_by(Some(emp), Some(dept))
                    .with_access_level(AccessLevel::Public);
                let narrow = decide(actor, ResourceType::Document, action, &individual, today());
                let wide = decide(actor, ResourceType::Document, action, &public, today());
                assert!(!narrow.allowed || wide.allowed, "{actor:?} {action}");
            }
        }
    }

    #[test]
    fn document_access_level_only_narrows() {
        let emp = Uuid::new_v4();
        let actor = employee(emp, Uuid::new_v4());
        let own_hr_doc = Resource::owned_by(Some(emp), None).with_access_level(AccessLevel::Hr);
        let decision = decide(&actor, ResourceType::Document, Action::Read, &own_hr_doc, today());
        assert_eq!(decision, Decision::deny(ReasonCode::AccessLevelRestricted));

        let foreign_public = Resource::owned_by(Some(Uuid::new_v4()), None)
            .with_access_level(AccessLevel::Public);
        let decision = decide(&actor, ResourceType::Document, Action::Read, &foreign_public, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn department_delete_guard_applies_to_admin() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let dept = Uuid::new_v4();
        let decision = decide(
            &admin,
            ResourceType::Department,
            Action::Delete,
            &Resource::department(dept, 2),
            today(),
        );
        assert_eq!(decision, Decision::deny(ReasonCode::DepartmentNotEmpty));

        let decision = decide(
            &admin,
            ResourceType::Department,
            Action::Delete,
            &Resource::department(dept, 0),
            today(),
        );
        assert_eq!(decision, Decision::allow(ReasonCode::Admin));
    }

    #[test]
    fn department_delete_without_count_fails_closed() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let resource = Resource::in_department(Some(Uuid::new_v4()));
        let decision = decide(&admin, ResourceType::Department, Action::Delete, &resource, today());
        assert_eq!(decision.reason_code, ReasonCode::DepartmentNotEmpty);
    }

    #[test]
    fn empty_department_delete_is_admin_only() {
        let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
        let resource = Resource::department(Uuid::new_v4(), 0);
        let decision = decide(&hr, ResourceType::Department, Action::Delete, &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
        let decision = decide(&hr, ResourceType::Department, Action::Update, &resource, today());
        assert_eq!(decision, Decision::allow(ReasonCode::RoleGranted));
    }

    #[test]
    fn employee_reads_own_attendance() {
        let e1 = Uuid::new_v4();
        let d1 = Uuid::new_v4();
        let actor = employee(e1, d1);
        let resource = Resource::attendance(e1, Some(d1), today());
        let decision = decide(&actor, ResourceType::Attendance, Action::Read, &resource, today());
        assert!(decision.allowed);
    }

    #[test]
    fn employee_cannot_read_colleague_attendance() {
        let d1 = Uuid::new_v4();
        let actor = employee(Uuid::new_v4(), d1);
        let resource = Resource::attendance(Uuid::new_v4(), Some(d1), today());
        let decision = decide(&actor, ResourceType::Attendance, Action::Read, &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn department_head_cannot_update_other_department_employee() {
        let actor = head(Uuid::new_v4());
        let resource = Resource::in_department(Some(Uuid::new_v4()));
        let decision = decide(&actor, ResourceType::Employee, Action::Update, &resource, today());
        assert!(decision.is_denied());

        let own = Resource::in_department(actor.department_id);
        let decision = decide(&actor, ResourceType::Employee, Action::Update, &own, today());
        assert_eq!(decision, Decision::allow(ReasonCode::DepartmentScope));
    }

    #[test]
    fn hr_manager_cannot_delete_populated_department() {
        let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
        let resource = Resource::department(Uuid::new_v4(), 3);
        let decision = decide(&hr, ResourceType::Department, Action::Delete, &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::DepartmentNotEmpty));
    }

    #[test]
    fn department_head_scope_is_read_only_for_compliance_and_documents() {
        let dept = Uuid::new_v4();
        let actor = head(dept);
        let resource = Resource::in_department(Some(dept)).with_access_level(AccessLevel::Department);
        for resource_type in [ResourceType::Compliance, ResourceType::Document] {
            assert!(decide(&actor, resource_type, Action::Read, &resource, today()).allowed);
            for action in [Action::Create, Action::Update, Action::Delete] {
                let decision = decide(&actor, resource_type, action, &resource, today());
                assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
            }
        }
    }

    #[test]
    fn department_head_files_own_leave() {
        let me = Uuid::new_v4();
        let actor = head(Uuid::new_v4()).with_employee(me);
        let own = Resource::owned_by(Some(me), None);
        let decision = decide(&actor, ResourceType::Leave, Action::Create, &own, today());
        assert_eq!(decision, Decision::allow(ReasonCode::SelfOwned));

        let other = Resource::owned_by(Some(Uuid::new_v4()), actor.department_id);
        let decision = decide(&actor, ResourceType::Leave, Action::Create, &other, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn self_read_survives_department_transfer() {
        let emp = Uuid::new_v4();
        let actor = employee(emp, Uuid::new_v4());
        let record = Resource::owned_by(Some(emp), Some(Uuid::new_v4()));
        let decision = decide(&actor, ResourceType::Employee, Action::Read, &record, today());
        assert_eq!(decision, Decision::allow(ReasonCode::SelfOwned));
        let decision = decide(&actor, ResourceType::Employee, Action::Update, &record, today());
        assert_eq!(decision, Decision::deny(ReasonCode::InsufficientRole));
    }

    #[test]
    fn unknown_role_is_denied() {
        let actor = Actor {
            role: None,
            ..employee(Uuid::new_v4(), Uuid::new_v4())
        };
        let resource = Resource::owned_by(actor.employee_id, actor.department_id);
        for resource_type in ResourceType::ALL {
            for action in Action::ALL {
                let decision = decide(&actor, resource_type, action, &resource, today());
                assert!(decision.is_denied(), "{resource_type} {action}");
            }
        }
    }

    #[test]
    fn named_entry_point_fails_closed() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let resource = Resource::default();
        let decision = decide_named(&admin, "payroll", "read", &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::UnknownResourceOrAction));
        let decision = decide_named(&admin, "employee", "approve", &resource, today());
        assert_eq!(decision, Decision::deny(ReasonCode::UnknownResourceOrAction));
        let decision = decide_named(&admin, "employee", "read", &resource, today());
        assert!(decision.allowed);
    }

    #[test]
    fn check_surfaces_reason() {
        let actor = employee(Uuid::new_v4(), Uuid::new_v4());
        let resource = Resource::department(Uuid::new_v4(), 0);
        let ctx = PolicyContext {
            actor: &actor,
            resource_type: ResourceType::Department,
            action: Action::Create,
            resource: &resource,
            today: today(),
        };
        let err = PolicyEngine.check(&ctx).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Denied {
                action: "create".into(),
                resource: "department".into(),
                reason: ReasonCode::InsufficientRole,
            }
        );
    }
}

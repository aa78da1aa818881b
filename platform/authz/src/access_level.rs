use crate::{
    AccessLevel, Actor, Resource, Role,
    role::rank_of,
    scope::{is_owner, same_department},
};

/// Whether a document's access level lets `actor` read it. Only ever narrows
/// what the role and scope checks already allowed.
pub fn permits(level: AccessLevel, actor: &Actor, resource: &Resource) -> bool {
    let rank = rank_of(actor.role);
    let hr_or_above = rank >= Role::HrManager.rank();
    match level {
        AccessLevel::Public => true,
        AccessLevel::Department => {
            hr_or_above || same_department(actor.department_id, resource.department_id)
        }
        AccessLevel::Manager => rank >= Role::DepartmentHead.rank(),
        AccessLevel::Hr => hr_or_above,
        AccessLevel::Admin => actor.is(Role::Admin),
        AccessLevel::Individual => {
            hr_or_above || is_owner(actor.employee_id, resource.employee_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn hr_manager_is_kept_out_of_admin_documents() {
        let actor = Actor::new(Uuid::new_v4(), Role::HrManager);
        let doc = Resource::default();
        assert!(permits(AccessLevel::Hr, &actor, &doc));
        assert!(!permits(AccessLevel::Admin, &actor, &doc));
    }

    #[test]
    fn department_level_needs_matching_department_below_hr() {
        let dept = Uuid::new_v4();
        let head = Actor::new(Uuid::new_v4(), Role::DepartmentHead).with_department(dept);
        assert!(permits(AccessLevel::Department, &head, &Resource::in_department(Some(dept))));
        assert!(!permits(
            AccessLevel::Department,
            &head,
            &Resource::in_department(Some(Uuid::new_v4()))
        ));
        assert!(!permits(AccessLevel::Department, &head, &Resource::in_department(None)));
    }

    #[test]
    fn individual_level_admits_owner_and_hr() {
        let employee_id = Uuid::new_v4();
        let owner = Actor::new(Uuid::new_v4(), Role::Employee).with_employee(employee_id);
        let stranger = Actor::new(Uuid::new_v4(), Role::Employee).with_employee(Uuid::new_v4());
        let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
        let doc = Resource::owned_by(Some(employee_id), None);
        assert!(permits(AccessLevel::Individual, &owner, &doc));
        assert!(!permits(AccessLevel::Individual, &stranger, &doc));
        assert!(permits(AccessLevel::Individual, &hr, &doc));
    }

    #[test]
    fn unknown_role_only_sees_public() {
        let actor = Actor {
            role: None,
            ..Actor::new(Uuid::new_v4(), Role::Employee)
        };
        for level in AccessLevel::ALL {
            assert_eq!(permits(level, &actor, &Resource::default()), level == AccessLevel::Public);
        }
    }
}

//! Department and ownership scoping.

use uuid::Uuid;

/// True only when both sides name the same department. A resource without a
/// department is never in scope.
pub fn same_department(actor_department: Option<Uuid>, resource_department: Option<Uuid>) -> bool {
    matches!((actor_department, resource_department), (Some(a), Some(r)) if a == r)
}

/// True only when the actor is linked to an employee record and that record is
/// the subject of the resource.
pub fn is_owner(actor_employee: Option<Uuid>, resource_employee: Option<Uuid>) -> bool {
    matches!((actor_employee, resource_employee), (Some(a), Some(r)) if a == r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_department_requires_both_sides() {
        let d1 = Uuid::new_v4();
        let d2 = Uuid::new_v4();
        assert!(same_department(Some(d1), Some(d1)));
        assert!(!same_department(Some(d1), Some(d2)));
        assert!(!same_department(Some(d1), None));
        assert!(!same_department(None, Some(d1)));
        assert!(!same_department(None, None));
    }

    #[test]
    fn ownership_requires_both_sides() {
        let e1 = Uuid::new_v4();
        assert!(is_owner(Some(e1), Some(e1)));
        assert!(!is_owner(Some(e1), Some(Uuid::new_v4())));
        assert!(!is_owner(None, None));
        assert!(!is_owner(None, Some(e1)));
    }
}

//! HR services. Every operation takes the requesting [`Actor`], loads the
//! scoping attributes of its target, asks [`platform_authz::decide`] and only
//! then touches persistence.

mod attendance;
mod compliance;
mod departments;
mod documents;
mod employees;
mod error;
mod leave;
mod pagination;

use std::{fmt, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use entity::employees as employee;
use platform_authz::{Action, Actor, Decision, Resource, ResourceType, Role, decide};
use platform_db::DbPool;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select, sea_query::Query};
use tracing::{debug, warn};
use uuid::Uuid;

pub use attendance::{AttendanceFilter, AttendancePatch, NewAttendance};
pub use compliance::{ComplianceFilter, CompliancePatch, NewCompliance};
pub use departments::{DepartmentPatch, DepartmentSummary, NewDepartment};
pub use documents::{DocumentFilter, DocumentPatch, NewDocument, policy_level};
pub use employees::{EmployeeFilter, EmployeePatch, NewEmployee};
pub use error::{HrError, HrResult};
pub use leave::{LeaveFilter, LeaveReview, NewLeave};
pub use pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageLimits, PageRequest, Paginated};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Entry point for every HR operation.
#[derive(Clone)]
pub struct HrService {
    db: DbPool,
    limits: PageLimits,
    clock: Clock,
}

impl fmt::Debug for HrService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HrService")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl HrService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            limits: PageLimits::default(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Calendar date "today" in the actor's locale.
    pub fn today_for(&self, actor: &Actor) -> NaiveDate {
        actor.local_today(self.now())
    }

    /// Ask the policy and turn a deny into [`HrError::Forbidden`].
    pub fn authorize(
        &self,
        actor: &Actor,
        resource_type: ResourceType,
        action: Action,
        resource: &Resource,
    ) -> HrResult<Decision> {
        let decision = decide(actor, resource_type, action, resource, self.today_for(actor));
        if decision.allowed {
            debug!(
                actor = %actor.id,
                resource = %resource_type,
                action = %action,
                reason = %decision.reason_code,
                "authorized"
            );
            Ok(decision)
        } else {
            warn!(
                actor = %actor.id,
                resource = %resource_type,
                action = %action,
                reason = %decision.reason_code,
                "authorization denied"
            );
            Err(HrError::Forbidden(decision.reason_code))
        }
    }

    /// Check a single row without logging, for per-row list filtering.
    pub(crate) fn permits(
        &self,
        actor: &Actor,
        resource_type: ResourceType,
        action: Action,
        resource: &Resource,
    ) -> bool {
        decide(actor, resource_type, action, resource, self.today_for(actor)).allowed
    }

    /// Scoping attributes of a record owned by `employee_id`.
    pub(crate) async fn employee_scope(&self, employee_id: Uuid) -> HrResult<Resource> {
        let record = employee::Entity::find_by_id(employee_id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("employee"))?;
        Ok(Resource::owned_by(Some(record.id), record.department_id))
    }
}

/// Scope a listing is evaluated against. Filters the caller left open default
/// to the actor's own scope, so a department head lists their department and
/// an employee lists their own records.
pub(crate) fn list_scope(
    actor: &Actor,
    department_id: Option<Uuid>,
    employee_id: Option<Uuid>,
) -> Resource {
    let mut scope = Resource::owned_by(employee_id, department_id);
    match actor.role {
        Some(Role::DepartmentHead) => {
            if scope.department_id.is_none() {
                scope.department_id = actor.department_id;
            }
        }
        Some(Role::Employee) => {
            if scope.employee_id.is_none() {
                scope.employee_id = actor.employee_id;
            }
        }
        _ => {}
    }
    scope
}

/// Restrict a query over employee-owned rows to an authorized scope.
pub(crate) fn scoped<E: EntityTrait>(
    mut query: Select<E>,
    employee_column: E::Column,
    scope: &Resource,
) -> Select<E> {
    if let Some(employee_id) = scope.employee_id {
        query = query.filter(employee_column.eq(employee_id));
    }
    if let Some(department_id) = scope.department_id {
        query = query.filter(
            employee_column.in_subquery(
                Query::select()
                    .column(employee::Column::Id)
                    .from(employee::Entity)
                    .and_where(employee::Column::DepartmentId.eq(department_id))
                    .to_owned(),
            ),
        );
    }
    query
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn required(field: &str, value: &str) -> HrResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HrError::invalid(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_head_listing_defaults_to_own_department() {
        let dept = Uuid::new_v4();
        let head = Actor::new(Uuid::new_v4(), Role::DepartmentHead).with_department(dept);
        let scope = list_scope(&head, None, None);
        assert_eq!(scope.department_id, Some(dept));
        let other = Uuid::new_v4();
        assert_eq!(list_scope(&head, Some(other), None).department_id, Some(other));
    }

    #[test]
    fn department_head_listing_an_employee_stays_in_department() {
        let dept = Uuid::new_v4();
        let own = Uuid::new_v4();
        let head = Actor::new(Uuid::new_v4(), Role::DepartmentHead)
            .with_department(dept)
            .with_employee(own);
        let scope = list_scope(&head, None, Some(own));
        assert_eq!(scope.department_id, Some(dept));
        assert_eq!(scope.employee_id, Some(own));
    }

    #[test]
    fn employee_listing_defaults_to_self() {
        let own = Uuid::new_v4();
        let employee = Actor::new(Uuid::new_v4(), Role::Employee).with_employee(own);
        assert_eq!(list_scope(&employee, None, None).employee_id, Some(own));
        let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
        assert_eq!(list_scope(&hr, None, None), Resource::default());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required("title", "   ").is_err());
        assert_eq!(required("title", " Handbook ").unwrap(), "Handbook");
        assert_eq!(trimmed(Some("  ".into())), None);
    }
}

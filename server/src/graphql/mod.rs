mod attendance;
mod compliance;
mod departments;
mod documents;
mod employees;
mod enums;
mod leave;
mod me;
mod page;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, MergedObject, Result, Schema};
use entity::users;
use platform_api::ApiError;
use platform_authz::Actor;
use products_hr::{HrResult, HrService, PageRequest};

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    me::MeQuery,
    employees::EmployeeQuery,
    attendance::AttendanceQuery,
    leave::LeaveQuery,
    compliance::ComplianceQuery,
    documents::DocumentQuery,
    departments::DepartmentQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    employees::EmployeeMutation,
    attendance::AttendanceMutation,
    leave::LeaveMutation,
    compliance::ComplianceMutation,
    documents::DocumentMutation,
    departments::DepartmentMutation,
);

pub fn build_schema(service: HrService) -> SchemaType {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(service)
    .finish()
}

/// The authenticated user behind a request, attached as request data.
#[derive(Clone, Debug)]
pub struct Viewer {
    pub user: users::Model,
    pub actor: Actor,
}

pub(crate) fn viewer<'a>(ctx: &'a Context<'_>) -> Result<&'a Viewer> {
    ctx.data_opt::<Viewer>()
        .ok_or_else(|| ApiError::Unauthenticated.extend())
}

pub(crate) fn service<'a>(ctx: &'a Context<'_>) -> Result<&'a HrService> {
    ctx.data::<HrService>()
        .map_err(|_| platform_api::internal_error(anyhow::anyhow!("HR service missing from schema")))
}

/// Surface a service error with its GraphQL error code.
pub(crate) fn hr<T>(result: HrResult<T>) -> Result<T> {
    result.map_err(|err| ApiError::from(err).extend())
}

pub(crate) fn page_request(page: Option<u64>, per_page: Option<u64>) -> PageRequest {
    PageRequest { page, per_page }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use chrono::Utc;
    use platform_authz::Role;
    use platform_db::DbPool;
    use serde_json::json;
    use uuid::Uuid;

    fn schema() -> SchemaType {
        build_schema(HrService::new(DbPool::Disconnected))
    }

    fn viewer_with(role: Role) -> Viewer {
        let user = users::Model {
            id: Uuid::new_v4(),
            email: "viewer@example.test".to_string(),
            name: None,
            role: role.as_str().to_string(),
            department_id: None,
            employee_id: None,
            utc_offset_minutes: 0,
            is_active: true,
            created_at: Utc::now().into(),
        };
        let actor = Actor::new(user.id, role);
        Viewer { user, actor }
    }

    async fn ask(viewer: Viewer, query: &str) -> serde_json::Value {
        let response = schema().execute(Request::new(query).data(viewer)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    #[tokio::test]
    async fn queries_without_a_viewer_are_unauthenticated() {
        let response = schema().execute(Request::new("{ me { id } }")).await;
        assert_eq!(response.errors.len(), 1);
        let code = response.errors[0]
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(Value::from("UNAUTHENTICATED")));
    }

    #[tokio::test]
    async fn sdl_lists_the_hr_surface() {
        let sdl = schema().sdl();
        let fields = [
            "employees",
            "attendance",
            "leaveRequests",
            "complianceRecords",
            "documents",
            "departments",
            "authorize",
        ];
        for field in fields {
            assert!(sdl.contains(field), "missing {field}");
        }
        assert!(sdl.contains("reviewLeave"));
        assert!(sdl.contains("deleteDepartment"));
    }

    #[tokio::test]
    async fn authorize_denies_unknown_names() {
        let unknown_resource = ask(
            viewer_with(Role::Admin),
            r#"{ authorize(resourceType: "payroll", action: "read") { allowed reasonCode } }"#,
        )
        .await;
        assert_eq!(
            unknown_resource,
            json!({ "authorize": { "allowed": false, "reasonCode": "unknown-resource-or-action" } })
        );

        let unknown_action = ask(
            viewer_with(Role::Employee),
            r#"{ authorize(resourceType: "employee", action: "archive") { allowed reasonCode } }"#,
        )
        .await;
        assert_eq!(unknown_action["authorize"]["reasonCode"], "unknown-resource-or-action");
    }

    #[tokio::test]
    async fn authorize_reports_the_policy_reason() {
        let occupied = ask(
            viewer_with(Role::Admin),
            r#"{ authorize(resourceType: "department", action: "delete", resource: { employeeCount: 3 }) { allowed reasonCode } }"#,
        )
        .await;
        assert_eq!(
            occupied,
            json!({ "authorize": { "allowed": false, "reasonCode": "department-not-empty" } })
        );

        let granted = ask(
            viewer_with(Role::HrManager),
            r#"{ authorize(resourceType: "Employee", action: "update") { allowed reasonCode } }"#,
        )
        .await;
        assert_eq!(
            granted,
            json!({ "authorize": { "allowed": true, "reasonCode": "role-granted" } })
        );
    }
}

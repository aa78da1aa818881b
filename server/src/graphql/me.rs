use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use platform_authz::{Decision, Resource, decide_named};
use products_hr::policy_level;
use tracing::instrument;
use uuid::Uuid;

use super::{enums::AccessLevel, service, viewer};
use crate::graphql::Viewer;

#[derive(Clone, Debug, SimpleObject)]
pub struct MePayload {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Canonical role name, absent when the stored role is not recognised.
    pub role: Option<String>,
    pub department_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

impl From<&Viewer> for MePayload {
    fn from(viewer: &Viewer) -> Self {
        Self {
            id: viewer.user.id,
            email: viewer.user.email.clone(),
            name: viewer.user.name.clone(),
            role: viewer.actor.role.map(|role| role.as_str().to_string()),
            department_id: viewer.actor.department_id,
            employee_id: viewer.actor.employee_id,
        }
    }
}

/// Scoping attributes to evaluate a hypothetical request against.
#[derive(Clone, Debug, Default, InputObject)]
pub struct ResourceInput {
    pub department_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub access_level: Option<AccessLevel>,
    pub date: Option<chrono::NaiveDate>,
    pub employee_count: Option<u64>,
}

impl From<ResourceInput> for Resource {
    fn from(input: ResourceInput) -> Self {
        Resource {
            department_id: input.department_id,
            employee_id: input.employee_id,
            access_level: input
                .access_level
                .map(|level| policy_level(level.into())),
            date: input.date,
            employee_count: input.employee_count,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DecisionPayload {
    pub allowed: bool,
    pub reason_code: String,
}

impl From<Decision> for DecisionPayload {
    fn from(decision: Decision) -> Self {
        Self {
            allowed: decision.allowed,
            reason_code: decision.reason_code.as_str().to_string(),
        }
    }
}

#[derive(Default)]
pub struct MeQuery;

#[Object]
impl MeQuery {
    #[instrument(name = "graphql.me", skip_all)]
    async fn me(&self, ctx: &Context<'_>) -> Result<MePayload> {
        Ok(MePayload::from(viewer(ctx)?))
    }

    /// Ask the policy whether the viewer could perform `action` on a
    /// resource of `resource_type`. Unknown names are denied.
    #[instrument(name = "graphql.authorize", skip_all, fields(resource_type = %resource_type, action = %action))]
    async fn authorize(
        &self,
        ctx: &Context<'_>,
        resource_type: String,
        action: String,
        resource: Option<ResourceInput>,
    ) -> Result<DecisionPayload> {
        let viewer = viewer(ctx)?;
        let today = service(ctx)?.today_for(&viewer.actor);
        let resource = Resource::from(resource.unwrap_or_default());
        let decision = decide_named(&viewer.actor, &resource_type, &action, &resource, today);
        Ok(decision.into())
    }
}

use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};
use entity::departments;
use products_hr::{DepartmentPatch, DepartmentSummary, NewDepartment};
use tracing::instrument;
use uuid::Uuid;

use super::{hr, page::PagePayload, page_request, service, viewer};

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentNode {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    /// Absent on freshly written departments; listings always carry it.
    pub employee_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<departments::Model> for DepartmentNode {
    fn from(model: departments::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            manager_id: model.manager_id,
            employee_count: None,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<DepartmentSummary> for DepartmentNode {
    fn from(summary: DepartmentSummary) -> Self {
        Self {
            employee_count: Some(summary.employee_count),
            ..Self::from(summary.department)
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct NewDepartmentInput {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Clone, Debug, InputObject)]
pub struct UpdateDepartmentInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Default)]
pub struct DepartmentQuery;

#[Object]
impl DepartmentQuery {
    #[instrument(name = "graphql.departments", skip_all)]
    async fn departments(
        &self,
        ctx: &Context<'_>,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<PagePayload<DepartmentNode>> {
        let viewer = viewer(ctx)?;
        let page = hr(service(ctx)?
            .list_departments(&viewer.actor, page_request(page, per_page))
            .await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.department", skip_all, fields(id = %id))]
    async fn department(&self, ctx: &Context<'_>, id: Uuid) -> Result<DepartmentNode> {
        let viewer = viewer(ctx)?;
        let summary = hr(service(ctx)?.get_department(&viewer.actor, id).await)?;
        Ok(summary.into())
    }
}

#[derive(Default)]
pub struct DepartmentMutation;

#[Object]
impl DepartmentMutation {
    #[instrument(name = "graphql.create_department", skip_all)]
    async fn create_department(
        &self,
        ctx: &Context<'_>,
        input: NewDepartmentInput,
    ) -> Result<DepartmentNode> {
        let viewer = viewer(ctx)?;
        let input = NewDepartment {
            name: input.name,
            description: input.description,
            manager_id: input.manager_id,
        };
        let record = hr(service(ctx)?.create_department(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.update_department", skip_all, fields(id = %input.id))]
    async fn update_department(
        &self,
        ctx: &Context<'_>,
        input: UpdateDepartmentInput,
    ) -> Result<DepartmentNode> {
        let viewer = viewer(ctx)?;
        let patch = DepartmentPatch {
            name: input.name,
            description: input.description,
            manager_id: input.manager_id,
        };
        let record = hr(service(ctx)?
            .update_department(&viewer.actor, input.id, patch)
            .await)?;
        Ok(record.into())
    }

    /// Refused with reason `department-not-empty` while employees remain.
    #[instrument(name = "graphql.delete_department", skip_all, fields(id = %id))]
    async fn delete_department(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_department(&viewer.actor, id).await)?;
        Ok(true)
    }
}

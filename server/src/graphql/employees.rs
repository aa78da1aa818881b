use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::employees;
use products_hr::{EmployeeFilter, EmployeePatch, NewEmployee};
use tracing::instrument;
use uuid::Uuid;

use super::{
    enums::{EmploymentStatus, EmploymentType},
    hr, page::PagePayload, page_request, service, viewer,
};

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: EmploymentStatus,
    pub employment_type: EmploymentType,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employees::Model> for EmployeeNode {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            position: model.position,
            department_id: model.department_id,
            manager_id: model.manager_id,
            status: model.status.into(),
            employment_type: model.employment_type.into(),
            hire_date: model.hire_date,
            termination_date: model.termination_date,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct EmployeeFilterInput {
    pub department_id: Option<Uuid>,
    pub status: Option<EmploymentStatus>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, InputObject)]
pub struct NewEmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: Option<EmploymentStatus>,
    pub employment_type: Option<EmploymentType>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, InputObject)]
pub struct UpdateEmployeeInput {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: Option<EmploymentStatus>,
    pub employment_type: Option<EmploymentType>,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
}

#[derive(Default)]
pub struct EmployeeQuery;

#[Object]
impl EmployeeQuery {
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        filter: Option<EmployeeFilterInput>,
    ) -> Result<PagePayload<EmployeeNode>> {
        let viewer = viewer(ctx)?;
        let filter = filter.unwrap_or_default();
        let filter = EmployeeFilter {
            department_id: filter.department_id,
            status: filter.status.map(Into::into),
            search: filter.search,
            page: page_request(filter.page, filter.per_page),
        };
        let page = hr(service(ctx)?.list_employees(&viewer.actor, filter).await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.employee", skip_all, fields(id = %id))]
    async fn employee(&self, ctx: &Context<'_>, id: Uuid) -> Result<EmployeeNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.get_employee(&viewer.actor, id).await)?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct EmployeeMutation;

#[Object]
impl EmployeeMutation {
    #[instrument(name = "graphql.create_employee", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: NewEmployeeInput,
    ) -> Result<EmployeeNode> {
        let viewer = viewer(ctx)?;
        let input = NewEmployee {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            position: input.position,
            department_id: input.department_id,
            manager_id: input.manager_id,
            status: input.status.map(Into::into),
            employment_type: input.employment_type.map(Into::into),
            hire_date: input.hire_date,
        };
        let record = hr(service(ctx)?.create_employee(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.update_employee", skip_all, fields(id = %input.id))]
    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        input: UpdateEmployeeInput,
    ) -> Result<EmployeeNode> {
        let viewer = viewer(ctx)?;
        let patch = EmployeePatch {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            position: input.position,
            department_id: input.department_id,
            manager_id: input.manager_id,
            status: input.status.map(Into::into),
            employment_type: input.employment_type.map(Into::into),
            hire_date: input.hire_date,
            termination_date: input.termination_date,
        };
        let record = hr(service(ctx)?
            .update_employee(&viewer.actor, input.id, patch)
            .await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.delete_employee", skip_all, fields(id = %id))]
    async fn delete_employee(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_employee(&viewer.actor, id).await)?;
        Ok(true)
    }
}

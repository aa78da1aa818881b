use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::compliance_records;
use products_hr::{ComplianceFilter, CompliancePatch, NewCompliance};
use tracing::instrument;
use uuid::Uuid;

use super::{
    enums::{ComplianceKind, ComplianceStatus},
    hr, page::PagePayload, page_request, service, viewer,
};

#[derive(Clone, Debug, SimpleObject)]
pub struct ComplianceNode {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub title: String,
    pub kind: ComplianceKind,
    pub status: ComplianceStatus,
    pub description: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub license_number: Option<String>,
    pub verified_by_id: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<compliance_records::Model> for ComplianceNode {
    fn from(model: compliance_records::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            title: model.title,
            kind: model.kind.into(),
            status: model.status.into(),
            description: model.description,
            issue_date: model.issue_date,
            expiration_date: model.expiration_date,
            issuing_authority: model.issuing_authority,
            license_number: model.license_number,
            verified_by_id: model.verified_by_id,
            verified_at: model.verified_at.map(|at| at.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct ComplianceFilterInput {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<ComplianceStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, InputObject)]
pub struct NewComplianceInput {
    pub employee_id: Uuid,
    pub title: String,
    pub kind: ComplianceKind,
    pub status: Option<ComplianceStatus>,
    pub description: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Clone, Debug, InputObject)]
pub struct UpdateComplianceInput {
    pub id: Uuid,
    pub title: Option<String>,
    pub kind: Option<ComplianceKind>,
    pub status: Option<ComplianceStatus>,
    pub description: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub license_number: Option<String>,
    pub verified: Option<bool>,
}

#[derive(Default)]
pub struct ComplianceQuery;

#[Object]
impl ComplianceQuery {
    #[instrument(name = "graphql.compliance_records", skip_all)]
    async fn compliance_records(
        &self,
        ctx: &Context<'_>,
        filter: Option<ComplianceFilterInput>,
    ) -> Result<PagePayload<ComplianceNode>> {
        let viewer = viewer(ctx)?;
        let filter = filter.unwrap_or_default();
        let filter = ComplianceFilter {
            employee_id: filter.employee_id,
            department_id: filter.department_id,
            status: filter.status.map(Into::into),
            page: page_request(filter.page, filter.per_page),
        };
        let page = hr(service(ctx)?.list_compliance(&viewer.actor, filter).await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.compliance_record", skip_all, fields(id = %id))]
    async fn compliance_record(&self, ctx: &Context<'_>, id: Uuid) -> Result<ComplianceNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.get_compliance(&viewer.actor, id).await)?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct ComplianceMutation;

#[Object]
impl ComplianceMutation {
    #[instrument(name = "graphql.create_compliance_record", skip_all)]
    async fn create_compliance_record(
        &self,
        ctx: &Context<'_>,
        input: NewComplianceInput,
    ) -> Result<ComplianceNode> {
        let viewer = viewer(ctx)?;
        let input = NewCompliance {
            employee_id: input.employee_id,
            title: input.title,
            kind: input.kind.into(),
            status: input.status.map(Into::into),
            description: input.description,
            issue_date: input.issue_date,
            expiration_date: input.expiration_date,
            issuing_authority: input.issuing_authority,
            license_number: input.license_number,
        };
        let record = hr(service(ctx)?.create_compliance(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.update_compliance_record", skip_all, fields(id = %input.id))]
    async fn update_compliance_record(
        &self,
        ctx: &Context<'_>,
        input: UpdateComplianceInput,
    ) -> Result<ComplianceNode> {
        let viewer = viewer(ctx)?;
        let patch = CompliancePatch {
            title: input.title,
            kind: input.kind.map(Into::into),
            status: input.status.map(Into::into),
            description: input.description,
            issue_date: input.issue_date,
            expiration_date: input.expiration_date,
            issuing_authority: input.issuing_authority,
            license_number: input.license_number,
            verified: input.verified,
        };
        let record = hr(service(ctx)?
            .update_compliance(&viewer.actor, input.id, patch)
            .await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.delete_compliance_record", skip_all, fields(id = %id))]
    async fn delete_compliance_record(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_compliance(&viewer.actor, id).await)?;
        Ok(true)
    }
}

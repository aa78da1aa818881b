use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::leave_requests;
use products_hr::{LeaveFilter, LeaveReview, NewLeave};
use tracing::instrument;
use uuid::Uuid;

use super::{
    enums::{LeaveStatus, LeaveType},
    hr, page::PagePayload, page_request, service, viewer,
};

#[derive(Clone, Debug, SimpleObject)]
pub struct LeaveNode {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub total_days: f64,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approver_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<leave_requests::Model> for LeaveNode {
    fn from(model: leave_requests::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            start_date: model.start_date,
            end_date: model.end_date,
            leave_type: model.leave_type.into(),
            status: model.status.into(),
            reason: model.reason,
            total_days: model.total_days,
            approved_by_id: model.approved_by_id,
            approved_at: model.approved_at.map(|at| at.with_timezone(&Utc)),
            approver_notes: model.approver_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct LeaveFilterInput {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, InputObject)]
pub struct NewLeaveInput {
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, InputObject)]
pub struct ReviewLeaveInput {
    pub id: Uuid,
    pub approve: bool,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct LeaveQuery;

#[Object]
impl LeaveQuery {
    #[instrument(name = "graphql.leave_requests", skip_all)]
    async fn leave_requests(
        &self,
        ctx: &Context<'_>,
        filter: Option<LeaveFilterInput>,
    ) -> Result<PagePayload<LeaveNode>> {
        let viewer = viewer(ctx)?;
        let filter = filter.unwrap_or_default();
        let filter = LeaveFilter {
            employee_id: filter.employee_id,
            department_id: filter.department_id,
            status: filter.status.map(Into::into),
            page: page_request(filter.page, filter.per_page),
        };
        let page = hr(service(ctx)?.list_leave(&viewer.actor, filter).await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.leave_request", skip_all, fields(id = %id))]
    async fn leave_request(&self, ctx: &Context<'_>, id: Uuid) -> Result<LeaveNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.get_leave(&viewer.actor, id).await)?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct LeaveMutation;

#[Object]
impl LeaveMutation {
    #[instrument(name = "graphql.request_leave", skip_all)]
    async fn request_leave(&self, ctx: &Context<'_>, input: NewLeaveInput) -> Result<LeaveNode> {
        let viewer = viewer(ctx)?;
        let input = NewLeave {
            employee_id: input.employee_id,
            start_date: input.start_date,
            end_date: input.end_date,
            leave_type: input.leave_type.into(),
            reason: input.reason,
        };
        let record = hr(service(ctx)?.create_leave(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.review_leave", skip_all, fields(id = %input.id))]
    async fn review_leave(&self, ctx: &Context<'_>, input: ReviewLeaveInput) -> Result<LeaveNode> {
        let viewer = viewer(ctx)?;
        let review = LeaveReview {
            approve: input.approve,
            notes: input.notes,
        };
        let record = hr(service(ctx)?
            .review_leave(&viewer.actor, input.id, review)
            .await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.cancel_leave", skip_all, fields(id = %id))]
    async fn cancel_leave(&self, ctx: &Context<'_>, id: Uuid) -> Result<LeaveNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.cancel_leave(&viewer.actor, id).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.delete_leave", skip_all, fields(id = %id))]
    async fn delete_leave(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_leave(&viewer.actor, id).await)?;
        Ok(true)
    }
}

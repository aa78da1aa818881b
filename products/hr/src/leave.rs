use chrono::NaiveDate;
use entity::leave_requests::{self as leave, LeaveStatus, LeaveType};
use platform_authz::{Action, Actor, ReasonCode, Resource, ResourceType, Role, is_owner};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    prelude::DateTimeWithTimeZone,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    HrError, HrResult, HrService, PageRequest, Paginated, list_scope, pagination::fetch_page,
    scoped, trimmed,
};

#[derive(Clone, Debug, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub page: PageRequest,
}

#[derive(Clone, Debug)]
pub struct NewLeave {
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

/// Approver's verdict on a pending request.
#[derive(Clone, Debug)]
pub struct LeaveReview {
    pub approve: bool,
    pub notes: Option<String>,
}

fn total_days(start: NaiveDate, end: NaiveDate) -> HrResult<f64> {
    if end < start {
        return Err(HrError::invalid("end date must not be before start date"));
    }
    Ok(((end - start).num_days() + 1) as f64)
}

impl HrService {
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_leave(
        &self,
        actor: &Actor,
        filter: LeaveFilter,
    ) -> HrResult<Paginated<leave::Model>> {
        let scope = list_scope(actor, filter.department_id, filter.employee_id);
        self.authorize(actor, ResourceType::Leave, Action::List, &scope)?;

        let mut query = scoped(leave::Entity::find(), leave::Column::EmployeeId, &scope);
        if let Some(status) = filter.status {
            query = query.filter(leave::Column::Status.eq(status));
        }
        let query = query
            .order_by_desc(leave::Column::StartDate)
            .order_by_desc(leave::Column::CreatedAt);
        fetch_page(&self.db, query, filter.page, self.limits).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_leave(&self, actor: &Actor, id: Uuid) -> HrResult<leave::Model> {
        let (record, resource) = self.load_leave(id).await?;
        self.authorize(actor, ResourceType::Leave, Action::Read, &resource)?;
        Ok(record)
    }

    #[instrument(skip_all, fields(actor = %actor.id, employee_id = %input.employee_id))]
    pub async fn create_leave(&self, actor: &Actor, input: NewLeave) -> HrResult<leave::Model> {
        let resource = self.employee_scope(input.employee_id).await?;
        self.authorize(actor, ResourceType::Leave, Action::Create, &resource)?;
        let days = total_days(input.start_date, input.end_date)?;

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = leave::ActiveModel {
            id: Set(id),
            employee_id: Set(input.employee_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            leave_type: Set(input.leave_type),
            status: Set(LeaveStatus::Pending),
            reason: Set(trimmed(input.reason)),
            total_days: Set(days),
            approved_by_id: Set(None),
            approved_at: Set(None),
            approver_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        leave::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(leave_id = %id, days, "leave requested");
        self.find_leave(id).await
    }

    /// Approve or reject a pending request, stamping the reviewer.
    #[instrument(skip_all, fields(actor = %actor.id, id = %id, approve = review.approve))]
    pub async fn review_leave(
        &self,
        actor: &Actor,
        id: Uuid,
        review: LeaveReview,
    ) -> HrResult<leave::Model> {
        let (record, resource) = self.load_leave(id).await?;
        self.authorize(actor, ResourceType::Leave, Action::Update, &resource)?;
        // Requests are reviewed by someone other than the requester; admins excepted.
        if !actor.is(Role::Admin) && is_owner(actor.employee_id, Some(record.employee_id)) {
            warn!(actor = %actor.id, leave_id = %id, "reviewer attempted to review own leave");
            return Err(HrError::Forbidden(ReasonCode::InsufficientRole));
        }
        if record.status != LeaveStatus::Pending {
            return Err(HrError::conflict("only pending requests can be reviewed"));
        }

        let now: DateTimeWithTimeZone = self.now().into();
        let mut active: leave::ActiveModel = record.into();
        active.status = Set(if review.approve {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Rejected
        });
        active.approved_by_id = Set(Some(actor.id));
        active.approved_at = Set(Some(now));
        active.approver_notes = Set(trimmed(review.notes));
        active.updated_at = Set(now);
        let updated = active.update(&self.db).await?;
        info!(leave_id = %id, "leave reviewed");
        Ok(updated)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn cancel_leave(&self, actor: &Actor, id: Uuid) -> HrResult<leave::Model> {
        let (record, resource) = self.load_leave(id).await?;
        self.authorize(actor, ResourceType::Leave, Action::Update, &resource)?;
        if !matches!(record.status, LeaveStatus::Pending | LeaveStatus::Approved) {
            return Err(HrError::conflict("request can no longer be cancelled"));
        }
        let now: DateTimeWithTimeZone = self.now().into();
        let mut active: leave::ActiveModel = record.into();
        active.status = Set(LeaveStatus::Cancelled);
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_leave(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        let (_, resource) = self.load_leave(id).await?;
        self.authorize(actor, ResourceType::Leave, Action::Delete, &resource)?;
        leave::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_leave(&self, id: Uuid) -> HrResult<leave::Model> {
        leave::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("leave request"))
    }

    async fn load_leave(&self, id: Uuid) -> HrResult<(leave::Model, Resource)> {
        let record = self.find_leave(id).await?;
        let resource = self.employee_scope(record.employee_id).await?;
        Ok((record, resource))
    }
}

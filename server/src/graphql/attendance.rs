use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use entity::attendance;
use products_hr::{AttendanceFilter, AttendancePatch, NewAttendance};
use tracing::instrument;
use uuid::Uuid;

use super::{enums::AttendanceStatus, hr, page::PagePayload, page_request, service, viewer};

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendanceNode {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub hours_worked: f64,
    pub notes: Option<String>,
    pub recorded_by_id: Option<Uuid>,
    pub is_remote_work: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<attendance::Model> for AttendanceNode {
    fn from(model: attendance::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            date: model.date,
            time_in: model.time_in,
            time_out: model.time_out,
            status: model.status.into(),
            hours_worked: model.hours_worked,
            notes: model.notes,
            recorded_by_id: model.recorded_by_id,
            is_remote_work: model.is_remote_work,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct AttendanceFilterInput {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, InputObject)]
pub struct NewAttendanceInput {
    pub employee_id: Uuid,
    pub date: Option<NaiveDate>,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    #[graphql(default)]
    pub is_remote_work: bool,
}

#[derive(Clone, Debug, InputObject)]
pub struct UpdateAttendanceInput {
    pub id: Uuid,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub is_remote_work: Option<bool>,
}

#[derive(Default)]
pub struct AttendanceQuery;

#[Object]
impl AttendanceQuery {
    #[instrument(name = "graphql.attendance", skip_all)]
    async fn attendance(
        &self,
        ctx: &Context<'_>,
        filter: Option<AttendanceFilterInput>,
    ) -> Result<PagePayload<AttendanceNode>> {
        let viewer = viewer(ctx)?;
        let filter = filter.unwrap_or_default();
        let filter = AttendanceFilter {
            employee_id: filter.employee_id,
            department_id: filter.department_id,
            start_date: filter.start_date,
            end_date: filter.end_date,
            page: page_request(filter.page, filter.per_page),
        };
        let page = hr(service(ctx)?.list_attendance(&viewer.actor, filter).await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.attendance_record", skip_all, fields(id = %id))]
    async fn attendance_record(&self, ctx: &Context<'_>, id: Uuid) -> Result<AttendanceNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.get_attendance(&viewer.actor, id).await)?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct AttendanceMutation;

#[Object]
impl AttendanceMutation {
    #[instrument(name = "graphql.create_attendance", skip_all)]
    async fn create_attendance(
        &self,
        ctx: &Context<'_>,
        input: NewAttendanceInput,
    ) -> Result<AttendanceNode> {
        let viewer = viewer(ctx)?;
        let input = NewAttendance {
            employee_id: input.employee_id,
            date: input.date,
            time_in: input.time_in,
            time_out: input.time_out,
            status: input.status.map(Into::into),
            notes: input.notes,
            is_remote_work: input.is_remote_work,
        };
        let record = hr(service(ctx)?.create_attendance(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.update_attendance", skip_all, fields(id = %input.id))]
    async fn update_attendance(
        &self,
        ctx: &Context<'_>,
        input: UpdateAttendanceInput,
    ) -> Result<AttendanceNode> {
        let viewer = viewer(ctx)?;
        let patch = AttendancePatch {
            time_in: input.time_in,
            time_out: input.time_out,
            status: input.status.map(Into::into),
            notes: input.notes,
            is_remote_work: input.is_remote_work,
        };
        let record = hr(service(ctx)?
            .update_attendance(&viewer.actor, input.id, patch)
            .await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.delete_attendance", skip_all, fields(id = %id))]
    async fn delete_attendance(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_attendance(&viewer.actor, id).await)?;
        Ok(true)
    }
}

use chrono::{NaiveDate, NaiveTime};
use entity::attendance::{self, AttendanceStatus};
use platform_authz::{Action, Actor, ReasonCode, Resource, ResourceType, Role};
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
pub struct AttendanceFilter {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: PageRequest,
}

#[derive(Clone, Debug)]
pub struct NewAttendance {
    pub employee_id: Uuid,
    /// Defaults to today in the actor's locale.
    pub date: Option<NaiveDate>,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub is_remote_work: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AttendancePatch {
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub is_remote_work: Option<bool>,
}

impl AttendancePatch {
    fn touches_more_than_clock(&self) -> bool {
        self.status.is_some() || self.notes.is_some() || self.is_remote_work.is_some()
    }
}

/// Hours between clock-in and clock-out, rounded to minutes.
fn hours_worked(time_in: Option<NaiveTime>, time_out: Option<NaiveTime>) -> HrResult<f64> {
    match (time_in, time_out) {
        (Some(start), Some(end)) => {
            if end < start {
                return Err(HrError::invalid("time out must not be before time in"));
            }
            let minutes = (end - start).num_minutes();
            Ok((minutes as f64 / 60.0 * 100.0).round() / 100.0)
        }
        _ => Ok(0.0),
    }
}

impl HrService {
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_attendance(
        &self,
        actor: &Actor,
        filter: AttendanceFilter,
    ) -> HrResult<Paginated<attendance::Model>> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if end < start {
                return Err(HrError::invalid("end date must not be before start date"));
            }
        }
        let scope = list_scope(actor, filter.department_id, filter.employee_id);
        self.authorize(actor, ResourceType::Attendance, Action::List, &scope)?;

        let mut query = scoped(attendance::Entity::find(), attendance::Column::EmployeeId, &scope);
        if let Some(start) = filter.start_date {
            query = query.filter(attendance::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(attendance::Column::Date.lte(end));
        }
        let query = query
            .order_by_desc(attendance::Column::Date)
            .order_by_desc(attendance::Column::CreatedAt);
        fetch_page(&self.db, query, filter.page, self.limits).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_attendance(&self, actor: &Actor, id: Uuid) -> HrResult<attendance::Model> {
        let record = self.find_attendance(id).await?;
        let resource = self.attendance_resource(&record).await?;
        self.authorize(actor, ResourceType::Attendance, Action::Read, &resource)?;
        Ok(record)
    }

    #[instrument(skip_all, fields(actor = %actor.id, employee_id = %input.employee_id))]
    pub async fn create_attendance(
        &self,
        actor: &Actor,
        input: NewAttendance,
    ) -> HrResult<attendance::Model> {
        let date = input.date.unwrap_or_else(|| self.today_for(actor));
        let resource = self.employee_scope(input.employee_id).await?.with_date(date);
        self.authorize(actor, ResourceType::Attendance, Action::Create, &resource)?;
        let hours = hours_worked(input.time_in, input.time_out)?;

        let duplicate = attendance::Entity::find()
            .filter(attendance::Column::EmployeeId.eq(input.employee_id))
            .filter(attendance::Column::Date.eq(date))
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            return Err(HrError::conflict(format!(
                "attendance for {date} is already recorded"
            )));
        }

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = attendance::ActiveModel {
            id: Set(id),
            employee_id: Set(input.employee_id),
            date: Set(date),
            time_in: Set(input.time_in),
            time_out: Set(input.time_out),
            status: Set(input.status.unwrap_or(AttendanceStatus::Present)),
            hours_worked: Set(hours),
            notes: Set(trimmed(input.notes)),
            recorded_by_id: Set(Some(actor.id)),
            is_remote_work: Set(input.is_remote_work),
            created_at: Set(now),
            updated_at: Set(now),
        };
        attendance::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(attendance_id = %id, %date, "attendance recorded");
        self.find_attendance(id).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn update_attendance(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: AttendancePatch,
    ) -> HrResult<attendance::Model> {
        let existing = self.find_attendance(id).await?;
        let resource = self.attendance_resource(&existing).await?;
        self.authorize(actor, ResourceType::Attendance, Action::Update, &resource)?;
        if actor.is(Role::Employee) && patch.touches_more_than_clock() {
            warn!(actor = %actor.id, "employee attempted to edit more than clock times");
            return Err(HrError::Forbidden(ReasonCode::InsufficientRole));
        }

        let time_in = patch.time_in.or(existing.time_in);
        let time_out = patch.time_out.or(existing.time_out);
        let hours = hours_worked(time_in, time_out)?;
        let mut active: attendance::ActiveModel = existing.into();
        active.time_in = Set(time_in);
        active.time_out = Set(time_out);
        active.hours_worked = Set(hours);
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if patch.notes.is_some() {
            active.notes = Set(trimmed(patch.notes));
        }
        if let Some(remote) = patch.is_remote_work {
            active.is_remote_work = Set(remote);
        }
        let now: DateTimeWithTimeZone = self.now().into();
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_attendance(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        let existing = self.find_attendance(id).await?;
        let resource = self.attendance_resource(&existing).await?;
        self.authorize(actor, ResourceType::Attendance, Action::Delete, &resource)?;
        attendance::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_attendance(&self, id: Uuid) -> HrResult<attendance::Model> {
        attendance::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("attendance"))
    }

    async fn attendance_resource(&self, record: &attendance::Model) -> HrResult<Resource> {
        Ok(self
            .employee_scope(record.employee_id)
            .await?
            .with_date(record.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn hours_need_both_clock_times() {
        assert_eq!(hours_worked(at(9, 0), None).unwrap(), 0.0);
        assert_eq!(hours_worked(at(9, 0), at(17, 30)).unwrap(), 8.5);
        assert_eq!(hours_worked(at(9, 0), at(9, 20)).unwrap(), 0.33);
    }

    #[test]
    fn clock_out_before_clock_in_is_rejected() {
        assert!(matches!(
            hours_worked(at(17, 0), at(9, 0)),
            Err(HrError::InvalidInput(_))
        ));
    }

    #[test]
    fn clock_only_patch_is_recognised() {
        let patch = AttendancePatch {
            time_out: at(17, 0),
            ..AttendancePatch::default()
        };
        assert!(!patch.touches_more_than_clock());
        let patch = AttendancePatch {
            status: Some(AttendanceStatus::Absent),
            ..AttendancePatch::default()
        };
        assert!(patch.touches_more_than_clock());
    }
}

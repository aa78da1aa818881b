use chrono::NaiveDate;
use entity::compliance_records::{self as compliance, ComplianceKind, ComplianceStatus};
use platform_authz::{Action, Actor, Resource, ResourceType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    prelude::DateTimeWithTimeZone,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    HrError, HrResult, HrService, PageRequest, Paginated, list_scope, pagination::fetch_page,
    required, scoped, trimmed,
};

#[derive(Clone, Debug, Default)]
pub struct ComplianceFilter {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<ComplianceStatus>,
    pub page: PageRequest,
}

#[derive(Clone, Debug)]
pub struct NewCompliance {
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

#[derive(Clone, Debug, Default)]
pub struct CompliancePatch {
    pub title: Option<String>,
    pub kind: Option<ComplianceKind>,
    pub status: Option<ComplianceStatus>,
    pub description: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub issuing_authority: Option<String>,
    pub license_number: Option<String>,
    /// Marks the record as verified by the acting user.
    pub verified: Option<bool>,
}

fn check_dates(issue: Option<NaiveDate>, expiration: Option<NaiveDate>) -> HrResult<()> {
    match (issue, expiration) {
        (Some(issue), Some(expiration)) if expiration < issue => Err(HrError::invalid(
            "expiration date must not be before issue date",
        )),
        _ => Ok(()),
    }
}

impl HrService {
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_compliance(
        &self,
        actor: &Actor,
        filter: ComplianceFilter,
    ) -> HrResult<Paginated<compliance::Model>> {
        let scope = list_scope(actor, filter.department_id, filter.employee_id);
        self.authorize(actor, ResourceType::Compliance, Action::List, &scope)?;

        let mut query = scoped(
            compliance::Entity::find(),
            compliance::Column::EmployeeId,
            &scope,
        );
        if let Some(status) = filter.status {
            query = query.filter(compliance::Column::Status.eq(status));
        }
        let query = query
            .order_by_asc(compliance::Column::ExpirationDate)
            .order_by_asc(compliance::Column::Title);
        fetch_page(&self.db, query, filter.page, self.limits).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_compliance(&self, actor: &Actor, id: Uuid) -> HrResult<compliance::Model> {
        let (record, resource) = self.load_compliance(id).await?;
        self.authorize(actor, ResourceType::Compliance, Action::Read, &resource)?;
        Ok(record)
    }

    #[instrument(skip_all, fields(actor = %actor.id, employee_id = %input.employee_id))]
    pub async fn create_compliance(
        &self,
        actor: &Actor,
        input: NewCompliance,
    ) -> HrResult<compliance::Model> {
        let resource = self.employee_scope(input.employee_id).await?;
        self.authorize(actor, ResourceType::Compliance, Action::Create, &resource)?;
        let title = required("title", &input.title)?;
        check_dates(input.issue_date, input.expiration_date)?;

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = compliance::ActiveModel {
            id: Set(id),
            employee_id: Set(input.employee_id),
            title: Set(title),
            kind: Set(input.kind),
            status: Set(input.status.unwrap_or(ComplianceStatus::Pending)),
            description: Set(trimmed(input.description)),
            issue_date: Set(input.issue_date),
            expiration_date: Set(input.expiration_date),
            issuing_authority: Set(trimmed(input.issuing_authority)),
            license_number: Set(trimmed(input.license_number)),
            verified_by_id: Set(None),
            verified_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        compliance::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(compliance_id = %id, "compliance record created");
        self.find_compliance(id).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn update_compliance(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: CompliancePatch,
    ) -> HrResult<compliance::Model> {
        let (record, resource) = self.load_compliance(id).await?;
        self.authorize(actor, ResourceType::Compliance, Action::Update, &resource)?;
        check_dates(
            patch.issue_date.or(record.issue_date),
            patch.expiration_date.or(record.expiration_date),
        )?;

        let now: DateTimeWithTimeZone = self.now().into();
        let mut active: compliance::ActiveModel = record.into();
        if let Some(title) = &patch.title {
            active.title = Set(required("title", title)?);
        }
        if let Some(kind) = patch.kind {
            active.kind = Set(kind);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if patch.description.is_some() {
            active.description = Set(trimmed(patch.description));
        }
        if patch.issue_date.is_some() {
            active.issue_date = Set(patch.issue_date);
        }
        if patch.expiration_date.is_some() {
            active.expiration_date = Set(patch.expiration_date);
        }
        if patch.issuing_authority.is_some() {
            active.issuing_authority = Set(trimmed(patch.issuing_authority));
        }
        if patch.license_number.is_some() {
            active.license_number = Set(trimmed(patch.license_number));
        }
        match patch.verified {
            Some(true) => {
                active.verified_by_id = Set(Some(actor.id));
                active.verified_at = Set(Some(now));
            }
            Some(false) => {
                active.verified_by_id = Set(None);
                active.verified_at = Set(None);
            }
            None => {}
        }
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_compliance(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        let (_, resource) = self.load_compliance(id).await?;
        self.authorize(actor, ResourceType::Compliance, Action::Delete, &resource)?;
        compliance::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_compliance(&self, id: Uuid) -> HrResult<compliance::Model> {
        compliance::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("compliance record"))
    }

    async fn load_compliance(&self, id: Uuid) -> HrResult<(compliance::Model, Resource)> {
        let record = self.find_compliance(id).await?;
        let resource = self.employee_scope(record.employee_id).await?;
        Ok((record, resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_cannot_precede_issue() {
        let issue = NaiveDate::from_ymd_opt(2024, 1, 10);
        let before = NaiveDate::from_ymd_opt(2023, 12, 31);
        assert!(check_dates(issue, before).is_err());
        assert!(check_dates(issue, None).is_ok());
        assert!(check_dates(before, issue).is_ok());
    }
}

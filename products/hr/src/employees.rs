use chrono::NaiveDate;
use entity::{
    departments as department,
    employees::{self as employee, EmploymentStatus, EmploymentType},
};
use platform_authz::{Action, Actor, Resource, ResourceType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, SimpleExpr},
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    HrError, HrResult, HrService, PageRequest, Paginated, list_scope, pagination::fetch_page,
    required, trimmed,
};

#[derive(Clone, Debug, Default)]
pub struct EmployeeFilter {
    pub department_id: Option<Uuid>,
    pub status: Option<EmploymentStatus>,
    /// Case-insensitive match on first name, last name or email.
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Clone, Debug)]
pub struct NewEmployee {
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

#[derive(Clone, Debug, Default)]
pub struct EmployeePatch {
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

fn employee_resource(record: &employee::Model) -> Resource {
    Resource::owned_by(Some(record.id), record.department_id)
}

fn normalize_email(email: &str) -> HrResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(HrError::invalid("email is not a valid address")),
    }
}

fn lower_like(column: employee::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

impl HrService {
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_employees(
        &self,
        actor: &Actor,
        filter: EmployeeFilter,
    ) -> HrResult<Paginated<employee::Model>> {
        let scope = list_scope(actor, filter.department_id, None);
        self.authorize(actor, ResourceType::Employee, Action::List, &scope)?;

        let mut query = employee::Entity::find();
        if let Some(employee_id) = scope.employee_id {
            query = query.filter(employee::Column::Id.eq(employee_id));
        }
        if let Some(department_id) = scope.department_id {
            query = query.filter(employee::Column::DepartmentId.eq(department_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(employee::Column::Status.eq(status));
        }
        if let Some(term) = trimmed(filter.search) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(lower_like(employee::Column::FirstName, &pattern))
                    .add(lower_like(employee::Column::LastName, &pattern))
                    .add(lower_like(employee::Column::Email, &pattern)),
            );
        }
        let query = query
            .order_by_asc(employee::Column::LastName)
            .order_by_asc(employee::Column::FirstName);
        fetch_page(&self.db, query, filter.page, self.limits).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_employee(&self, actor: &Actor, id: Uuid) -> HrResult<employee::Model> {
        let record = self.find_employee(id).await?;
        self.authorize(actor, ResourceType::Employee, Action::Read, &employee_resource(&record))?;
        Ok(record)
    }

    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn create_employee(
        &self,
        actor: &Actor,
        input: NewEmployee,
    ) -> HrResult<employee::Model> {
        self.authorize(
            actor,
            ResourceType::Employee,
            Action::Create,
            &Resource::in_department(input.department_id),
        )?;
        let first_name = required("first name", &input.first_name)?;
        let last_name = required("last name", &input.last_name)?;
        let email = normalize_email(&input.email)?;
        if let Some(department_id) = input.department_id {
            self.ensure_department(department_id).await?;
        }
        self.ensure_email_free(&email, None).await?;

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = employee::ActiveModel {
            id: Set(id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            phone: Set(trimmed(input.phone)),
            position: Set(trimmed(input.position)),
            department_id: Set(input.department_id),
            manager_id: Set(input.manager_id),
            status: Set(input.status.unwrap_or(EmploymentStatus::Active)),
            employment_type: Set(input.employment_type.unwrap_or(EmploymentType::FullTime)),
            hire_date: Set(input.hire_date),
            termination_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        employee::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(employee_id = %id, "employee created");
        self.find_employee(id).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn update_employee(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: EmployeePatch,
    ) -> HrResult<employee::Model> {
        let existing = self.find_employee(id).await?;
        self.authorize(actor, ResourceType::Employee, Action::Update, &employee_resource(&existing))?;

        let transfer = patch
            .department_id
            .filter(|target| existing.department_id != Some(*target));
        if let Some(target) = transfer {
            // Moving someone requires authority over the destination too.
            self.authorize(
                actor,
                ResourceType::Employee,
                Action::Update,
                &Resource::owned_by(Some(id), Some(target)),
            )?;
            self.ensure_department(target).await?;
        }

        let mut active: employee::ActiveModel = existing.into();
        if let Some(first_name) = &patch.first_name {
            active.first_name = Set(required("first name", first_name)?);
        }
        if let Some(last_name) = &patch.last_name {
            active.last_name = Set(required("last name", last_name)?);
        }
        if let Some(email) = &patch.email {
            let email = normalize_email(email)?;
            self.ensure_email_free(&email, Some(id)).await?;
            active.email = Set(email);
        }
        if patch.phone.is_some() {
            active.phone = Set(trimmed(patch.phone));
        }
        if patch.position.is_some() {
            active.position = Set(trimmed(patch.position));
        }
        if let Some(target) = transfer {
            active.department_id = Set(Some(target));
        }
        if patch.manager_id.is_some() {
            active.manager_id = Set(patch.manager_id);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(employment_type) = patch.employment_type {
            active.employment_type = Set(employment_type);
        }
        if patch.hire_date.is_some() {
            active.hire_date = Set(patch.hire_date);
        }
        if patch.termination_date.is_some() {
            active.termination_date = Set(patch.termination_date);
        }
        let now: DateTimeWithTimeZone = self.now().into();
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_employee(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        let existing = self.find_employee(id).await?;
        self.authorize(actor, ResourceType::Employee, Action::Delete, &employee_resource(&existing))?;
        employee::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }

    pub(crate) async fn find_employee(&self, id: Uuid) -> HrResult<employee::Model> {
        employee::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("employee"))
    }

    pub(crate) async fn ensure_department(&self, id: Uuid) -> HrResult<()> {
        department::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| HrError::invalid("department does not exist"))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> HrResult<()> {
        let mut query = employee::Entity::find().filter(employee::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(employee::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(HrError::conflict(format!("email {email} is already in use")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email(" Ada@Example.TEST ").unwrap(), "ada@example.test");
        assert!(normalize_email("ada").is_err());
        assert!(normalize_email("@example.test").is_err());
        assert!(normalize_email("ada@localhost").is_err());
    }
}

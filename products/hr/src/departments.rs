use std::collections::HashMap;

use entity::{departments as department, employees as employee};
use platform_authz::{Action, Actor, Resource, ResourceType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func},
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{HrError, HrResult, HrService, PageRequest, Paginated, pagination::fetch_page, required, trimmed};

#[derive(Clone, Debug)]
pub struct DepartmentSummary {
    pub department: department::Model,
    pub employee_count: u64,
}

#[derive(Clone, Debug)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

impl HrService {
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_departments(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> HrResult<Paginated<DepartmentSummary>> {
        self.authorize(actor, ResourceType::Department, Action::List, &Resource::default())?;
        let query = department::Entity::find().order_by_asc(department::Column::Name);
        let page = fetch_page(&self.db, query, page, self.limits).await?;

        let ids: Vec<Uuid> = page.items.iter().map(|d| d.id).collect();
        let counts: HashMap<Uuid, u64> = employee::Entity::find()
            .select_only()
            .column(employee::Column::DepartmentId)
            .column_as(employee::Column::Id.count(), "employee_count")
            .filter(employee::Column::DepartmentId.is_in(ids))
            .group_by(employee::Column::DepartmentId)
            .into_tuple::<(Option<Uuid>, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(id, count)| id.map(|id| (id, count.max(0) as u64)))
            .collect();

        Ok(page.map(|department| DepartmentSummary {
            employee_count: counts.get(&department.id).copied().unwrap_or(0),
            department,
        }))
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_department(&self, actor: &Actor, id: Uuid) -> HrResult<DepartmentSummary> {
        let record = self.find_department(id).await?;
        let employee_count = self.count_employees(id).await?;
        self.authorize(
            actor,
            ResourceType::Department,
            Action::Read,
            &Resource::department(id, employee_count),
        )?;
        Ok(DepartmentSummary {
            department: record,
            employee_count,
        })
    }

    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn create_department(
        &self,
        actor: &Actor,
        input: NewDepartment,
    ) -> HrResult<department::Model> {
        self.authorize(actor, ResourceType::Department, Action::Create, &Resource::default())?;
        let name = required("name", &input.name)?;
        self.ensure_name_free(&name, None).await?;
        if let Some(manager_id) = input.manager_id {
            self.find_employee(manager_id).await?;
        }

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = department::ActiveModel {
            id: Set(id),
            name: Set(name),
            description: Set(trimmed(input.description)),
            manager_id: Set(input.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        department::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(department_id = %id, "department created");
        self.find_department(id).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn update_department(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: DepartmentPatch,
    ) -> HrResult<department::Model> {
        let record = self.find_department(id).await?;
        self.authorize(
            actor,
            ResourceType::Department,
            Action::Update,
            &Resource::in_department(Some(id)),
        )?;

        let mut active: department::ActiveModel = record.into();
        if let Some(name) = &patch.name {
            let name = required("name", name)?;
            self.ensure_name_free(&name, Some(id)).await?;
            active.name = Set(name);
        }
        if patch.description.is_some() {
            active.description = Set(trimmed(patch.description));
        }
        if let Some(manager_id) = patch.manager_id {
            self.find_employee(manager_id).await?;
            active.manager_id = Set(Some(manager_id));
        }
        let now: DateTimeWithTimeZone = self.now().into();
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Departments that still have employees are never removed.
    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_department(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        self.find_department(id).await?;
        let employee_count = self.count_employees(id).await?;
        self.authorize(
            actor,
            ResourceType::Department,
            Action::Delete,
            &Resource::department(id, employee_count),
        )?;
        department::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(department_id = %id, "department deleted");
        Ok(())
    }

    async fn find_department(&self, id: Uuid) -> HrResult<department::Model> {
        department::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("department"))
    }

    async fn count_employees(&self, department_id: Uuid) -> HrResult<u64> {
        Ok(employee::Entity::find()
            .filter(employee::Column::DepartmentId.eq(department_id))
            .count(&self.db)
            .await?)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> HrResult<()> {
        let mut query = department::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(department::Column::Name))).eq(name.to_lowercase()),
        );
        if let Some(id) = except {
            query = query.filter(department::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(HrError::conflict(format!("department {name} already exists")));
        }
        Ok(())
    }
}

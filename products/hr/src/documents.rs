use chrono::NaiveDate;
use entity::documents::{self as document, AccessLevel as StoredAccessLevel, DocumentType};
use platform_authz::{AccessLevel, Action, Actor, Resource, ResourceType, access_level_permits};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, Iterable, QueryFilter, QueryOrder, Set,
    prelude::DateTimeWithTimeZone,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    HrError, HrResult, HrService, PageRequest, Paginated, list_scope, required, trimmed,
};

#[derive(Clone, Debug, Default)]
pub struct DocumentFilter {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub document_type: Option<DocumentType>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Clone, Debug)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub document_type: DocumentType,
    pub access_level: Option<StoredAccessLevel>,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub document_type: Option<DocumentType>,
    pub access_level: Option<StoredAccessLevel>,
    pub expiration_date: Option<NaiveDate>,
}

/// Policy view of a stored document access level.
pub fn policy_level(level: StoredAccessLevel) -> AccessLevel {
    match level {
        StoredAccessLevel::Public => AccessLevel::Public,
        StoredAccessLevel::Department => AccessLevel::Department,
        StoredAccessLevel::Manager => AccessLevel::Manager,
        StoredAccessLevel::Hr => AccessLevel::Hr,
        StoredAccessLevel::Admin => AccessLevel::Admin,
        StoredAccessLevel::Individual => AccessLevel::Individual,
    }
}

fn document_resource(record: &document::Model) -> Resource {
    Resource::owned_by(record.employee_id, record.department_id)
        .with_access_level(policy_level(record.access_level))
}

/// Stored levels the actor could read on at least one row, judged against
/// their own department and employee id. `None` when every level qualifies.
fn readable_levels(actor: &Actor) -> Option<Vec<StoredAccessLevel>> {
    let best_case = Resource::owned_by(actor.employee_id, actor.department_id);
    let all: Vec<_> = StoredAccessLevel::iter().collect();
    let readable: Vec<_> = all
        .iter()
        .copied()
        .filter(|level| access_level_permits(policy_level(*level), actor, &best_case))
        .collect();
    (readable.len() < all.len()).then_some(readable)
}

impl HrService {
    /// Documents visible to the actor. The listing scope is checked first,
    /// then every row passes the read check so access levels are honoured.
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_documents(
        &self,
        actor: &Actor,
        filter: DocumentFilter,
    ) -> HrResult<Paginated<document::Model>> {
        let scope = list_scope(actor, filter.department_id, filter.employee_id);
        // Row levels are checked below; the scope itself is level-neutral.
        let gate = scope.clone().with_access_level(AccessLevel::Public);
        self.authorize(actor, ResourceType::Document, Action::List, &gate)?;

        let mut query = document::Entity::find();
        if let Some(employee_id) = scope.employee_id {
            query = query.filter(document::Column::EmployeeId.eq(employee_id));
        }
        if let Some(department_id) = scope.department_id {
            query = query.filter(document::Column::DepartmentId.eq(department_id));
        }
        if let Some(document_type) = filter.document_type {
            query = query.filter(document::Column::DocumentType.eq(document_type));
        }
        if let Some(levels) = readable_levels(actor) {
            query = query.filter(document::Column::AccessLevel.is_in(levels));
        }
        let rows = query
            .order_by_desc(document::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let term = trimmed(filter.search).map(|t| t.to_lowercase());
        let fetched = rows.len();
        let visible: Vec<_> = rows
            .into_iter()
            .filter(|row| {
                term.as_ref()
                    .is_none_or(|t| row.title.to_lowercase().contains(t.as_str()))
            })
            .filter(|row| {
                self.permits(actor, ResourceType::Document, Action::Read, &document_resource(row))
            })
            .collect();
        debug!(fetched, visible = visible.len(), "documents filtered by access level");

        let (page, per_page) = filter.page.resolve(self.limits);
        Ok(Paginated::from_vec(visible, page, per_page))
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn get_document(&self, actor: &Actor, id: Uuid) -> HrResult<document::Model> {
        let record = self.find_document(id).await?;
        self.authorize(actor, ResourceType::Document, Action::Read, &document_resource(&record))?;
        Ok(record)
    }

    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn create_document(
        &self,
        actor: &Actor,
        input: NewDocument,
    ) -> HrResult<document::Model> {
        // A document about an employee inherits their department when none is given.
        let department_id = match (input.department_id, input.employee_id) {
            (Some(department_id), _) => Some(department_id),
            (None, Some(employee_id)) => self.employee_scope(employee_id).await?.department_id,
            (None, None) => None,
        };
        let access_level = input.access_level.unwrap_or(StoredAccessLevel::Hr);
        let resource = Resource::owned_by(input.employee_id, department_id)
            .with_access_level(policy_level(access_level));
        self.authorize(actor, ResourceType::Document, Action::Create, &resource)?;

        let title = required("title", &input.title)?;
        let file_name = required("file name", &input.file_name)?;
        let file_path = required("file path", &input.file_path)?;
        if let Some(employee_id) = input.employee_id {
            self.find_employee(employee_id).await?;
        }
        if let Some(department_id) = department_id {
            self.ensure_department(department_id).await?;
        }

        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = self.now().into();
        let active = document::ActiveModel {
            id: Set(id),
            title: Set(title),
            description: Set(trimmed(input.description)),
            document_type: Set(input.document_type),
            access_level: Set(access_level),
            file_name: Set(file_name),
            file_path: Set(file_path),
            mime_type: Set(trimmed(input.mime_type)),
            employee_id: Set(input.employee_id),
            department_id: Set(department_id),
            expiration_date: Set(input.expiration_date),
            uploaded_by_id: Set(actor.id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        document::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;
        info!(document_id = %id, "document stored");
        self.find_document(id).await
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn update_document(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: DocumentPatch,
    ) -> HrResult<document::Model> {
        let record = self.find_document(id).await?;
        self.authorize(actor, ResourceType::Document, Action::Update, &document_resource(&record))?;

        let mut active: document::ActiveModel = record.into();
        if let Some(title) = &patch.title {
            active.title = Set(required("title", title)?);
        }
        if patch.description.is_some() {
            active.description = Set(trimmed(patch.description));
        }
        if let Some(document_type) = patch.document_type {
            active.document_type = Set(document_type);
        }
        if let Some(level) = patch.access_level {
            active.access_level = Set(level);
        }
        if patch.expiration_date.is_some() {
            active.expiration_date = Set(patch.expiration_date);
        }
        let now: DateTimeWithTimeZone = self.now().into();
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    #[instrument(skip_all, fields(actor = %actor.id, id = %id))]
    pub async fn delete_document(&self, actor: &Actor, id: Uuid) -> HrResult<()> {
        let record = self.find_document(id).await?;
        self.authorize(actor, ResourceType::Document, Action::Delete, &document_resource(&record))?;
        document::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(document_id = %id, "document removed");
        Ok(())
    }

    async fn find_document(&self, id: Uuid) -> HrResult<document::Model> {
        document::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HrError::NotFound("document"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_levels_map_one_to_one() {
        assert_eq!(policy_level(StoredAccessLevel::Public), AccessLevel::Public);
        assert_eq!(policy_level(StoredAccessLevel::Individual), AccessLevel::Individual);
        assert_eq!(policy_level(StoredAccessLevel::Hr), AccessLevel::default());
    }

    #[test]
    fn readable_levels_follow_role() {
        use platform_authz::Role;

        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert_eq!(readable_levels(&admin), None);

        let hr = Actor::new(Uuid::new_v4(), Role::HrManager);
        let levels = readable_levels(&hr).unwrap();
        assert!(!levels.contains(&StoredAccessLevel::Admin));
        assert_eq!(levels.len(), 5);

        let staff = Actor::new(Uuid::new_v4(), Role::Employee)
            .with_department(Uuid::new_v4())
            .with_employee(Uuid::new_v4());
        assert_eq!(
            readable_levels(&staff).unwrap(),
            [
                StoredAccessLevel::Public,
                StoredAccessLevel::Department,
                StoredAccessLevel::Individual
            ]
        );
    }
}

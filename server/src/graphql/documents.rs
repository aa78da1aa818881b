use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::documents;
use products_hr::{DocumentFilter, DocumentPatch, NewDocument};
use tracing::instrument;
use uuid::Uuid;

use super::{
    enums::{AccessLevel, DocumentType},
    hr, page::PagePayload, page_request, service, viewer,
};

#[derive(Clone, Debug, SimpleObject)]
pub struct DocumentNode {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub document_type: DocumentType,
    pub access_level: AccessLevel,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub expiration_date: Option<NaiveDate>,
    pub uploaded_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<documents::Model> for DocumentNode {
    fn from(model: documents::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            document_type: model.document_type.into(),
            access_level: model.access_level.into(),
            file_name: model.file_name,
            file_path: model.file_path,
            mime_type: model.mime_type,
            employee_id: model.employee_id,
            department_id: model.department_id,
            expiration_date: model.expiration_date,
            uploaded_by_id: model.uploaded_by_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct DocumentFilterInput {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub document_type: Option<DocumentType>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Clone, Debug, InputObject)]
pub struct NewDocumentInput {
    pub title: String,
    pub description: Option<String>,
    pub document_type: DocumentType,
    pub access_level: Option<AccessLevel>,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, InputObject)]
pub struct UpdateDocumentInput {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub document_type: Option<DocumentType>,
    pub access_level: Option<AccessLevel>,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Default)]
pub struct DocumentQuery;

#[Object]
impl DocumentQuery {
    /// Only documents whose access level admits the viewer are returned.
    #[instrument(name = "graphql.documents", skip_all)]
    async fn documents(
        &self,
        ctx: &Context<'_>,
        filter: Option<DocumentFilterInput>,
    ) -> Result<PagePayload<DocumentNode>> {
        let viewer = viewer(ctx)?;
        let filter = filter.unwrap_or_default();
        let filter = DocumentFilter {
            employee_id: filter.employee_id,
            department_id: filter.department_id,
            document_type: filter.document_type.map(Into::into),
            search: filter.search,
            page: page_request(filter.page, filter.per_page),
        };
        let page = hr(service(ctx)?.list_documents(&viewer.actor, filter).await)?;
        Ok(page.into())
    }

    #[instrument(name = "graphql.document", skip_all, fields(id = %id))]
    async fn document(&self, ctx: &Context<'_>, id: Uuid) -> Result<DocumentNode> {
        let viewer = viewer(ctx)?;
        let record = hr(service(ctx)?.get_document(&viewer.actor, id).await)?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct DocumentMutation;

#[Object]
impl DocumentMutation {
    #[instrument(name = "graphql.create_document", skip_all)]
    async fn create_document(
        &self,
        ctx: &Context<'_>,
        input: NewDocumentInput,
    ) -> Result<DocumentNode> {
        let viewer = viewer(ctx)?;
        let input = NewDocument {
            title: input.title,
            description: input.description,
            document_type: input.document_type.into(),
            access_level: input.access_level.map(Into::into),
            file_name: input.file_name,
            file_path: input.file_path,
            mime_type: input.mime_type,
            employee_id: input.employee_id,
            department_id: input.department_id,
            expiration_date: input.expiration_date,
        };
        let record = hr(service(ctx)?.create_document(&viewer.actor, input).await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.update_document", skip_all, fields(id = %input.id))]
    async fn update_document(
        &self,
        ctx: &Context<'_>,
        input: UpdateDocumentInput,
    ) -> Result<DocumentNode> {
        let viewer = viewer(ctx)?;
        let patch = DocumentPatch {
            title: input.title,
            description: input.description,
            document_type: input.document_type.map(Into::into),
            access_level: input.access_level.map(Into::into),
            expiration_date: input.expiration_date,
        };
        let record = hr(service(ctx)?
            .update_document(&viewer.actor, input.id, patch)
            .await)?;
        Ok(record.into())
    }

    #[instrument(name = "graphql.delete_document", skip_all, fields(id = %id))]
    async fn delete_document(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let viewer = viewer(ctx)?;
        hr(service(ctx)?.delete_document(&viewer.actor, id).await)?;
        Ok(true)
    }
}

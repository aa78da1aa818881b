use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub document_type: DocumentType,
    pub access_level: AccessLevel,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    #[sea_orm(indexed)]
    pub employee_id: Option<Uuid>,
    #[sea_orm(indexed)]
    pub department_id: Option<Uuid>,
    pub expiration_date: Option<Date>,
    pub uploaded_by_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_delete = "SetNull"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_delete = "SetNull"
    )]
    Department,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum DocumentType {
    #[sea_orm(string_value = "employee_record")]
    EmployeeRecord,
    #[sea_orm(string_value = "policy")]
    Policy,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "handbook")]
    Handbook,
    #[sea_orm(string_value = "license")]
    License,
    #[sea_orm(string_value = "certification")]
    Certification,
    #[sea_orm(string_value = "medical")]
    Medical,
    #[sea_orm(string_value = "performance_review")]
    PerformanceReview,
    #[sea_orm(string_value = "tax_form")]
    TaxForm,
    #[sea_orm(string_value = "training")]
    Training,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum AccessLevel {
    #[sea_orm(string_value = "public")]
    Public,
    #[sea_orm(string_value = "department")]
    Department,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "hr")]
    Hr,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "individual")]
    Individual,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compliance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub employee_id: Uuid,
    pub title: String,
    pub kind: ComplianceKind,
    pub status: ComplianceStatus,
    pub description: Option<String>,
    pub issue_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub issuing_authority: Option<String>,
    pub license_number: Option<String>,
    pub verified_by_id: Option<Uuid>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum ComplianceKind {
    #[sea_orm(string_value = "license")]
    License,
    #[sea_orm(string_value = "certification")]
    Certification,
    #[sea_orm(string_value = "training")]
    Training,
    #[sea_orm(string_value = "background_check")]
    BackgroundCheck,
    #[sea_orm(string_value = "policy_acknowledgement")]
    PolicyAcknowledgement,
    #[sea_orm(string_value = "health_screening")]
    HealthScreening,
    #[sea_orm(string_value = "hipaa_training")]
    HipaaTraining,
    #[sea_orm(string_value = "review")]
    Review,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum ComplianceStatus {
    #[sea_orm(string_value = "valid")]
    Valid,
    #[sea_orm(string_value = "expiring_soon")]
    ExpiringSoon,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "incomplete")]
    Incomplete,
    #[sea_orm(string_value = "not_required")]
    NotRequired,
}

impl ActiveModelBehavior for ActiveModel {}

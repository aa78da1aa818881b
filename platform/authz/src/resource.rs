use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthzError, Role};

/// The authenticated party behind a request, as handed over by the session
/// provider.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Actor {
    pub id: Uuid,
    /// `None` when the session carried a role outside the hierarchy.
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    /// Offset of the actor's locale from UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role: Some(role),
            department_id: None,
            employee_id: None,
            utc_offset_minutes: 0,
        }
    }

    pub fn with_department(mut self, department_id: Uuid) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_employee(mut self, employee_id: Uuid) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Calendar date at `now` in the actor's locale.
    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::minutes(i64::from(self.utc_offset_minutes))).date_naive()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Employee,
    Attendance,
    Leave,
    Compliance,
    Document,
    Department,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Employee,
        ResourceType::Attendance,
        ResourceType::Leave,
        ResourceType::Compliance,
        ResourceType::Document,
        ResourceType::Department,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Employee => "employee",
            ResourceType::Attendance => "attendance",
            ResourceType::Leave => "leave",
            ResourceType::Compliance => "compliance",
            ResourceType::Document => "document",
            ResourceType::Department => "department",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AuthzError::UnknownResourceType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    List,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::List,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, Action::Read | Action::List)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
    }
}

/// Who may read a document, on top of the role and scope checks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Public,
    Department,
    Manager,
    #[default]
    Hr,
    Admin,
    Individual,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 6] = [
        AccessLevel::Public,
        AccessLevel::Department,
        AccessLevel::Manager,
        AccessLevel::Hr,
        AccessLevel::Admin,
        AccessLevel::Individual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Department => "department",
            AccessLevel::Manager => "manager",
            AccessLevel::Hr => "hr",
            AccessLevel::Admin => "admin",
            AccessLevel::Individual => "individual",
        }
    }
}

impl FromStr for AccessLevel {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AuthzError::UnknownAccessLevel(s.to_string()))
    }
}

/// Scoping attributes of the targeted resource. For `list`, these describe
/// the slice being listed rather than a single row.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    pub department_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub access_level: Option<AccessLevel>,
    pub date: Option<NaiveDate>,
    pub employee_count: Option<u64>,
}

impl Resource {
    /// A resource that belongs to an employee, who in turn sits in a department.
    pub fn owned_by(employee_id: Option<Uuid>, department_id: Option<Uuid>) -> Self {
        Self {
            employee_id,
            department_id,
            ..Self::default()
        }
    }

    pub fn in_department(department_id: Option<Uuid>) -> Self {
        Self {
            department_id,
            ..Self::default()
        }
    }

    pub fn attendance(employee_id: Uuid, department_id: Option<Uuid>, date: NaiveDate) -> Self {
        Self {
            employee_id: Some(employee_id),
            department_id,
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn department(department_id: Uuid, employee_count: u64) -> Self {
        Self {
            department_id: Some(department_id),
            employee_count: Some(employee_count),
            ..Self::default()
        }
    }

    pub fn with_access_level(mut self, level: AccessLevel) -> Self {
        self.access_level = Some(level);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Attendance".parse::<ResourceType>().unwrap(), ResourceType::Attendance);
        assert_eq!(" DELETE ".parse::<Action>().unwrap(), Action::Delete);
        assert_eq!("individual".parse::<AccessLevel>().unwrap(), AccessLevel::Individual);
        assert!("payroll".parse::<ResourceType>().is_err());
        assert!("approve".parse::<Action>().is_err());
    }

    #[test]
    fn local_today_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let actor = Actor::new(Uuid::new_v4(), Role::Employee);
        assert_eq!(actor.local_today(now), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        let east = actor.clone().with_utc_offset(60);
        assert_eq!(east.local_today(now), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        let west = actor.with_utc_offset(-24 * 60);
        assert_eq!(west.local_today(now), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::AuthzError;

/// Roles known to the HR suite, ordered by privilege.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    HrManager,
    DepartmentHead,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::HrManager,
        Role::DepartmentHead,
        Role::Employee,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::HrManager => "hr_manager",
            Role::DepartmentHead => "department_head",
            Role::Employee => "employee",
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::HrManager => 3,
            Role::DepartmentHead => 2,
            Role::Employee => 1,
        }
    }

    /// Parse a session role name. Older sessions still carry `hr` and
    /// `manager`/`department_manager`, so those map onto the current names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "hr_manager" | "hr" => Some(Role::HrManager),
            "department_head" | "department_manager" | "manager" => Some(Role::DepartmentHead),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

/// Rank of an optional role; an unrecognised role ranks 0.
pub fn rank_of(role: Option<Role>) -> u8 {
    role.map(Role::rank).unwrap_or(0)
}

/// Rank of a role name as carried by a session. Unknown names rank 0.
pub fn rank(name: &str) -> u8 {
    rank_of(Role::parse(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_hierarchy() {
        assert!(rank("admin") > rank("hr_manager"));
        assert!(rank("hr_manager") > rank("department_head"));
        assert!(rank("department_head") > rank("employee"));
        assert!(rank("employee") > rank("contractor"));
        assert_eq!(rank("contractor"), 0);
        assert_eq!(rank(""), 0);
    }

    #[test]
    fn legacy_names_map_to_current_roles() {
        assert_eq!(Role::parse("hr"), Some(Role::HrManager));
        assert_eq!(Role::parse("manager"), Some(Role::DepartmentHead));
        assert_eq!(Role::parse(" Department_Manager "), Some(Role::DepartmentHead));
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role owner");
    }
}

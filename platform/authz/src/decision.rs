use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable tag explaining a verdict, used in logs and audit trails.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    Admin,
    RoleGranted,
    DepartmentScope,
    SelfOwned,
    InsufficientRole,
    StaleRecord,
    DepartmentNotEmpty,
    AccessLevelRestricted,
    UnknownResourceOrAction,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::Admin => "admin",
            ReasonCode::RoleGranted => "role-granted",
            ReasonCode::DepartmentScope => "department-scope",
            ReasonCode::SelfOwned => "self-owned",
            ReasonCode::InsufficientRole => "insufficient-role",
            ReasonCode::StaleRecord => "stale-record",
            ReasonCode::DepartmentNotEmpty => "department-not-empty",
            ReasonCode::AccessLevelRestricted => "access-level-restricted",
            ReasonCode::UnknownResourceOrAction => "unknown-resource-or-action",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub allowed: bool,
    pub reason_code: ReasonCode,
}

impl Decision {
    pub fn allow(reason_code: ReasonCode) -> Self {
        Self {
            allowed: true,
            reason_code,
        }
    }

    pub fn deny(reason_code: ReasonCode) -> Self {
        Self {
            allowed: false,
            reason_code,
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_kebab_reason() {
        let value = serde_json::to_value(Decision::deny(ReasonCode::StaleRecord)).unwrap();
        assert_eq!(value, json!({"allowed": false, "reasonCode": "stale-record"}));
    }
}

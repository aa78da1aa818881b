//! GraphQL mirrors of the stored enums.

use async_graphql::Enum;
use entity::{attendance, compliance_records, documents, employees, leave_requests};

macro_rules! mirror_enum {
    ($name:ident => $module:ident :: $stored:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
        pub enum $name {
            $($variant),+
        }

        impl From<$name> for $module::$stored {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $module::$stored::$variant),+
                }
            }
        }

        impl From<$module::$stored> for $name {
            fn from(value: $module::$stored) -> Self {
                match value {
                    $($module::$stored::$variant => $name::$variant),+
                }
            }
        }
    };
}

mirror_enum!(EmploymentStatus => employees::EmploymentStatus {
    Active, Onboarding, OnLeave, Terminated, Suspended,
});

mirror_enum!(EmploymentType => employees::EmploymentType {
    FullTime, PartTime, Contract, Temporary, Intern,
});

mirror_enum!(AttendanceStatus => attendance::AttendanceStatus {
    Present, Absent, Tardy, HalfDay, OnLeave, Holiday, Weekend,
});

mirror_enum!(LeaveType => leave_requests::LeaveType {
    Vacation, Sick, Personal, Bereavement, JuryDuty, Maternity, Paternity, Unpaid, Other,
});

mirror_enum!(LeaveStatus => leave_requests::LeaveStatus {
    Pending, Approved, Rejected, Cancelled, Completed,
});

mirror_enum!(ComplianceKind => compliance_records::ComplianceKind {
    License, Certification, Training, BackgroundCheck, PolicyAcknowledgement,
    HealthScreening, HipaaTraining, Review, Other,
});

mirror_enum!(ComplianceStatus => compliance_records::ComplianceStatus {
    Valid, ExpiringSoon, Expired, Pending, Incomplete, NotRequired,
});

mirror_enum!(DocumentType => documents::DocumentType {
    EmployeeRecord, Policy, Contract, Handbook, License, Certification, Medical,
    PerformanceReview, TaxForm, Training, Other,
});

mirror_enum!(AccessLevel => documents::AccessLevel {
    Public, Department, Manager, Hr, Admin, Individual,
});

use async_graphql::{OutputType, SimpleObject};
use products_hr::Paginated;

use super::{
    attendance::AttendanceNode, compliance::ComplianceNode, departments::DepartmentNode,
    documents::DocumentNode, employees::EmployeeNode, leave::LeaveNode,
};

#[derive(SimpleObject)]
#[graphql(concrete(name = "EmployeePage", params(EmployeeNode)))]
#[graphql(concrete(name = "AttendancePage", params(AttendanceNode)))]
#[graphql(concrete(name = "LeavePage", params(LeaveNode)))]
#[graphql(concrete(name = "CompliancePage", params(ComplianceNode)))]
#[graphql(concrete(name = "DocumentPage", params(DocumentNode)))]
#[graphql(concrete(name = "DepartmentPage", params(DepartmentNode)))]
pub struct PagePayload<T: OutputType> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
}

impl<T: OutputType, M> From<Paginated<M>> for PagePayload<T>
where
    T: From<M>,
{
    fn from(value: Paginated<M>) -> Self {
        Self {
            items: value.items.into_iter().map(T::from).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            pages: value.pages,
        }
    }
}

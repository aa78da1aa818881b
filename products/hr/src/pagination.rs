use platform_db::DbPool;
use sea_orm::{EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

use crate::HrResult;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Page size bounds applied to every listing.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PageLimits {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

/// Caller-supplied paging, 1-based.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn resolve(&self, limits: PageLimits) -> (u64, u64) {
        let max = limits.max_per_page.max(1);
        let per_page = self
            .per_page
            .unwrap_or(limits.default_per_page)
            .clamp(1, max);
        // Offsets are bound as signed 64-bit values by the database drivers.
        let last_page = i64::MAX as u64 / per_page;
        (self.page.unwrap_or(1).clamp(1, last_page), per_page)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
            pages: total.div_ceil(per_page),
        }
    }

    /// Slice an already-filtered, ordered collection.
    pub fn from_vec(all: Vec<T>, page: u64, per_page: u64) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(page.saturating_sub(1).saturating_mul(per_page))
            .unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(per_page as usize).collect();
        Self::new(items, total, page, per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            pages: self.pages,
        }
    }
}

pub(crate) async fn fetch_page<E>(
    db: &DbPool,
    query: Select<E>,
    request: PageRequest,
    limits: PageLimits,
) -> HrResult<Paginated<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
{
    let (page, per_page) = request.resolve(limits);
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;
    Ok(Paginated::new(items, total, page, per_page))
}

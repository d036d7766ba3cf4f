use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContactListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.normalize(), (1, 20, 0));
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }
}

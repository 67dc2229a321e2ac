//! List query inputs and their wire encoding

use std::collections::BTreeMap;
use std::str::FromStr;

use shared::models::OrderStatus;

use crate::config::ApiGroup;
use crate::error::ClientError;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ClientError::InvalidQuery(format!("unknown sort direction '{}'", other))),
        }
    }
}

/// Allowed page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(self) -> u64 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<u64> for PageSize {
    type Error = ClientError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|p| p.get() == value)
            .ok_or_else(|| ClientError::InvalidQuery(format!("page size must be 10, 20 or 50, got {}", value)))
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// How an endpoint expects pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `limit` + `offset`
    LimitOffset,
    /// 1-based `page` + `pageSize`
    Page,
}

/// Where a resource's list lives and how to read it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEndpoint {
    pub group: ApiGroup,
    pub path: &'static str,
    /// Resource-specific row key, tried before the generic ones
    pub rows_key: &'static str,
    pub pagination: Pagination,
}

/// Which values the status filter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    None,
    /// `1` active, `0` suspended
    Active,
    Order,
}

impl StatusFilter {
    /// Normalise a status value to its wire form
    pub fn normalize(self, value: &str) -> Result<String, ClientError> {
        let value = value.trim();
        match self {
            StatusFilter::None => Err(ClientError::InvalidQuery(
                "this list has no status filter".into(),
            )),
            StatusFilter::Active => value
                .parse::<shared::models::ActiveStatus>()
                .map(|s| s.code().to_string())
                .map_err(|_| ClientError::InvalidQuery(format!("invalid status '{}'", value))),
            StatusFilter::Order => value
                .parse::<OrderStatus>()
                .map(|s| s.as_str().to_string())
                .map_err(|_| ClientError::InvalidQuery(format!("invalid order status '{}'", value))),
        }
    }
}

/// Declared filter/sort capabilities of a resource list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSchema {
    pub sortable: &'static [&'static str],
    pub default_sort: Option<(&'static str, SortDirection)>,
    pub status_filter: StatusFilter,
    /// Extra filter keys accepted besides q/status (orders: payment, vendorId...)
    pub extra_filters: &'static [&'static str],
}

impl ListSchema {
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.contains(&field)
    }
}

/// Full set of list inputs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub filter_text: String,
    pub status: Option<String>,
    pub sort: Option<SortSpec>,
    pub page_size: PageSize,
    pub offset: u64,
    pub extra: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn for_schema(schema: &ListSchema) -> Self {
        Self {
            sort: schema.default_sort.map(|(field, direction)| SortSpec {
                field: field.to_string(),
                direction,
            }),
            ..Self::default()
        }
    }

    /// 1-based page number
    pub fn page_number(&self) -> u64 {
        self.offset / self.page_size.get() + 1
    }

    /// Query string for the endpoint; empty inputs are omitted
    pub fn to_params(&self, endpoint: &ListEndpoint) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let size = self.page_size.get();
        match endpoint.pagination {
            Pagination::LimitOffset => {
                params.push(("limit".to_string(), size.to_string()));
                params.push(("offset".to_string(), self.offset.to_string()));
            }
            Pagination::Page => {
                params.push(("page".to_string(), self.page_number().to_string()));
                params.push(("pageSize".to_string(), size.to_string()));
            }
        }

        let q = self.filter_text.trim();
        if !q.is_empty() {
            params.push(("q".to_string(), q.to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status".to_string(), status.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sortBy".to_string(), sort.field.clone()));
            params.push(("sortDir".to_string(), sort.direction.as_str().to_string()));
        }
        for (key, value) in &self.extra {
            if !value.trim().is_empty() {
                params.push((key.clone(), value.trim().to_string()));
            }
        }
        params
    }
}

/// `max(1, ceil(total / page_size))`
pub fn page_count(total: u64, page_size: PageSize) -> u64 {
    total.div_ceil(page_size.get()).max(1)
}

/// Offset of the last page
pub fn last_page_offset(total: u64, page_size: PageSize) -> u64 {
    (page_count(total, page_size) - 1) * page_size.get()
}

/// Clamp an offset onto a page boundary inside `[0, last page]`
pub fn clamp_offset(offset: u64, total: u64, page_size: PageSize) -> u64 {
    let size = page_size.get();
    (offset / size * size).min(last_page_offset(total, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: ListEndpoint = ListEndpoint {
        group: ApiGroup::Primary,
        path: "/affiliate/list-affiliate",
        rows_key: "affiliates",
        pagination: Pagination::LimitOffset,
    };

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_page_count_and_clamp() {
        for size in PageSize::ALL {
            for total in [0u64, 1, 9, 10, 11, 28, 49, 50, 51, 1000] {
                let count = page_count(total, size);
                assert_eq!(count, std::cmp::max(1, total.div_ceil(size.get())));
                for offset in [0u64, 3, 10, 20, 40, 50, 999, 5000] {
                    let clamped = clamp_offset(offset, total, size);
                    assert_eq!(clamped % size.get(), 0);
                    assert!(clamped <= (count - 1) * size.get());
                }
            }
        }
    }

    #[test]
    fn test_limit_offset_params() {
        let query = ListQuery {
            filter_text: "  budi ".into(),
            status: Some("1".into()),
            sort: Some(SortSpec {
                field: "name_affiliate".into(),
                direction: SortDirection::Desc,
            }),
            page_size: PageSize::Twenty,
            offset: 40,
            extra: BTreeMap::new(),
        };
        let params = query.to_params(&ENDPOINT);
        assert_eq!(param(&params, "limit"), Some("20"));
        assert_eq!(param(&params, "offset"), Some("40"));
        assert_eq!(param(&params, "q"), Some("budi"));
        assert_eq!(param(&params, "status"), Some("1"));
        assert_eq!(param(&params, "sortBy"), Some("name_affiliate"));
        assert_eq!(param(&params, "sortDir"), Some("desc"));
    }

    #[test]
    fn test_page_params_and_empty_inputs_omitted() {
        let endpoint = ListEndpoint {
            pagination: Pagination::Page,
            ..ENDPOINT
        };
        let mut query = ListQuery {
            offset: 20,
            ..ListQuery::default()
        };
        query.extra.insert("payment".into(), "qris".into());
        query.extra.insert("vendorId".into(), " ".into());

        let params = query.to_params(&endpoint);
        assert_eq!(param(&params, "page"), Some("3"));
        assert_eq!(param(&params, "pageSize"), Some("10"));
        assert_eq!(param(&params, "payment"), Some("qris"));
        assert_eq!(param(&params, "q"), None);
        assert_eq!(param(&params, "vendorId"), None);
        assert_eq!(param(&params, "offset"), None);
    }

    #[test]
    fn test_status_filter_normalization() {
        assert_eq!(StatusFilter::Active.normalize("active").unwrap(), "1");
        assert_eq!(StatusFilter::Active.normalize("0").unwrap(), "0");
        assert_eq!(StatusFilter::Order.normalize("Paid").unwrap(), "paid");
        assert!(StatusFilter::Order.normalize("lost").is_err());
        assert!(StatusFilter::None.normalize("1").is_err());
    }

    #[test]
    fn test_page_size_from_number() {
        assert_eq!(PageSize::try_from(50).unwrap(), PageSize::Fifty);
        assert!(PageSize::try_from(25).is_err());
    }
}

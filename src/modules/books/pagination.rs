//! Page windowing and navigation links for the list endpoint.

use serde::{Deserialize, Serialize};

use shelf_kernel::settings::{LinkPolicy, PaginationSettings};

use super::links::LinkBuilder;

/// Raw `page`/`limit` query parameters, kept as text so that garbage input
/// falls back to defaults instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Coerce raw query values; never fails.
    ///
    /// `page` falls back to 1 and is at least 1. `limit` falls back to the
    /// configured default and is clamped to `1..=max_limit`.
    pub fn from_query(query: &PageQuery, settings: &PaginationSettings) -> Self {
        let page = parse_number(query.page.as_deref()).map_or(1, |page| page.max(1) as u64);
        let limit = parse_number(query.limit.as_deref())
            .map_or(settings.default_limit, |limit| {
                (limit.max(1) as u64).min(settings.max_limit)
            });

        Self { page, limit }
    }

    /// Number of records preceding this page, capped at `i64::MAX` since
    /// document stores encode offsets as signed 64-bit integers.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(MAX_SKIP)
    }
}

const MAX_SKIP: u64 = i64::MAX as u64;

impl PageQuery {
    /// Build from raw query pairs, keeping the first value of a repeated key.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };

        Self {
            page: first("page"),
            limit: first("limit"),
        }
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok()
}

/// A link to a specific page of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    pub first: PageLink,
    pub last: PageLink,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// Navigation metadata returned alongside a page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub current_items: u64,
    pub total_pages: u64,
    pub total_items: u64,
    #[serde(rename = "_links")]
    pub links: PaginationLinks,
}

/// Compute page metadata for `request` given the collection size and the
/// number of records the store actually returned.
pub fn compute(
    request: PageRequest,
    total_items: u64,
    returned: usize,
    links: &LinkBuilder,
    policy: LinkPolicy,
) -> Pagination {
    let PageRequest { page, limit } = request;
    let limit = limit.max(1);
    let total_pages = total_items.div_ceil(limit);

    let page_link = |page: u64| PageLink {
        page,
        href: links.href_with_query(
            &["books"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
        ),
    };

    let (previous, next) = match policy {
        LinkPolicy::Legacy => (None, Some(page_link(page + 1))),
        LinkPolicy::Bounded => (
            (page > 1).then(|| page_link(page - 1)),
            (page < total_pages).then(|| page_link(page + 1)),
        ),
    };

    Pagination {
        current_page: page,
        current_items: returned as u64,
        total_pages,
        total_items,
        links: PaginationLinks {
            first: page_link(1),
            last: page_link(total_pages),
            previous,
            next,
        },
    }
}

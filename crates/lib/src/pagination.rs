//! Pagination parameters passed through to backends.
//!
//! The service never interprets these values; it forwards them to
//! [`Backend::load`](crate::backend::Backend::load) unchanged.

use serde::{Deserialize, Serialize};

/// Paging and ordering hints for a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Number of records per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Field name to sort by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Pagination {
    /// Request one page of `per_page` records.
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            sort: None,
        }
    }

    /// Set the sort field.
    pub fn sorted_by(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    /// Render as URL query pairs, omitting unset fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("perPage", per_page.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }

    /// The half-open index range selected within a collection of `len` items.
    ///
    /// Returns `None` when no window is requested (either `page` or
    /// `per_page` unset), meaning the whole collection.
    pub fn window(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let (page, per_page) = (self.page?, self.per_page?);
        let start = (page.max(1) as usize - 1).saturating_mul(per_page as usize);
        let start = start.min(len);
        let end = start.saturating_add(per_page as usize).min(len);
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_unset_fields() {
        assert!(Pagination::default().query_pairs().is_empty());

        let pairs = Pagination::page(2, 10).sorted_by("username").query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "2".to_string()),
                ("perPage", "10".to_string()),
                ("sort", "username".to_string()),
            ]
        );
    }

    #[test]
    fn window_clamps_to_len() {
        assert_eq!(Pagination::default().window(5), None);
        assert_eq!(Pagination::page(1, 2).window(5), Some(0..2));
        assert_eq!(Pagination::page(3, 2).window(5), Some(4..5));
        assert_eq!(Pagination::page(9, 2).window(5), Some(5..5));
        // Page 0 is treated as the first page
        assert_eq!(Pagination::page(0, 2).window(5), Some(0..2));
    }

    #[test]
    fn deserializes_camel_case() {
        let p: Pagination = serde_json::from_str(r#"{"page":1,"perPage":25}"#).unwrap();
        assert_eq!(p, Pagination::page(1, 25));
    }
}

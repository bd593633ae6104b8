use serde::{Deserialize, Serialize};

/// One page of a collection plus the metadata needed to navigate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub data: Vec<T>,
}

impl<T> PageEnvelope<T> {
    /// Last page that holds at least one record, or `1` for an empty collection.
    pub const fn last_page(&self) -> usize {
        last_page(self.total_count, self.page_size)
    }
}

/// `max(1, ceil(total_count / page_size))`.
pub const fn last_page(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 || total_count == 0 {
        return 1;
    }
    total_count.div_ceil(page_size)
}

/// Result of running a collection through the interceptor.
///
/// Serializes as the envelope object when paginated, otherwise as a bare array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome<T> {
    Paged(PageEnvelope<T>),
    Full(Vec<T>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_page_rounds_up_and_never_drops_below_one() {
        assert_eq!(last_page(10, 3), 4);
        assert_eq!(last_page(9, 3), 3);
        assert_eq!(last_page(0, 3), 1);
    }

    #[test]
    fn outcome_serializes_as_envelope_or_array() {
        let paged = QueryOutcome::Paged(PageEnvelope {
            page: 2,
            page_size: 1,
            total_count: 3,
            data: vec!["b"],
        });
        assert_eq!(
            serde_json::to_value(&paged).unwrap(),
            json!({"page": 2, "pageSize": 1, "totalCount": 3, "data": ["b"]})
        );

        let full = QueryOutcome::Full(vec![1, 2]);
        assert_eq!(serde_json::to_value(&full).unwrap(), json!([1, 2]));
    }
}

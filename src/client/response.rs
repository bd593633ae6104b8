//! Decoding of page envelopes and detection of stale page numbers.

use serde::de::DeserializeOwned;

use crate::client::transport::{TransportError, TransportResponse};
use crate::client::{ClientError, ClientResult};
use crate::domain::page::{PageEnvelope, last_page};

/// A decoded envelope and the page the client should move to, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interpreted<T> {
    pub envelope: PageEnvelope<T>,
    pub corrected_page: Option<usize>,
}

/// Suggests the last page holding data when `envelope` came back empty
/// although the collection is not.
pub fn page_correction<T>(envelope: &PageEnvelope<T>) -> Option<usize> {
    if !envelope.data.is_empty()
        || envelope.page == 1
        || envelope.total_count == 0
        || envelope.page_size == 0
    {
        return None;
    }
    let last = last_page(envelope.total_count, envelope.page_size);
    (last != envelope.page).then_some(last)
}

/// Decodes a successful response into an envelope.
pub fn interpret<T: DeserializeOwned>(response: &TransportResponse) -> ClientResult<Interpreted<T>> {
    if !response.is_success() {
        return Err(ClientError::Transport(TransportError::Status(response.status)));
    }
    let envelope: PageEnvelope<T> = serde_json::from_slice(&response.body)?;
    let corrected_page = page_correction(&envelope);
    Ok(Interpreted {
        envelope,
        corrected_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(page: usize, page_size: usize, total_count: usize, len: usize) -> PageEnvelope<u8> {
        PageEnvelope {
            page,
            page_size,
            total_count,
            data: vec![0; len],
        }
    }

    #[test]
    fn empty_page_beyond_the_end_is_corrected() {
        assert_eq!(page_correction(&envelope(5, 3, 10, 0)), Some(4));
    }

    #[test]
    fn no_correction_when_page_has_data_or_collection_is_empty() {
        assert_eq!(page_correction(&envelope(5, 3, 10, 1)), None);
        assert_eq!(page_correction(&envelope(5, 3, 0, 0)), None);
        assert_eq!(page_correction(&envelope(1, 3, 10, 0)), None);
        assert_eq!(page_correction(&envelope(2, 0, 10, 0)), None);
    }

    #[test]
    fn no_correction_when_already_on_last_page() {
        assert_eq!(page_correction(&envelope(4, 3, 10, 0)), None);
    }

    #[test]
    fn decodes_camel_case_envelope() {
        let response = TransportResponse::ok(
            r#"{"page":2,"pageSize":1,"totalCount":2,"data":["b"]}"#,
        );
        let interpreted = interpret::<String>(&response).unwrap();
        assert_eq!(interpreted.envelope.data, vec!["b".to_string()]);
        assert_eq!(interpreted.corrected_page, None);
    }

    #[test]
    fn rejects_failures_and_malformed_bodies() {
        let failed = TransportResponse {
            status: 500,
            body: Vec::new(),
        };
        assert!(matches!(
            interpret::<String>(&failed),
            Err(ClientError::Transport(TransportError::Status(500)))
        ));
        let malformed = TransportResponse::ok("[1, 2]");
        assert!(matches!(
            interpret::<String>(&malformed),
            Err(ClientError::Decode(_))
        ));
    }
}

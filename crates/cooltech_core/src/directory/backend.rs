//! User directory backend contract.

use crate::model::ids::UserId;
use crate::model::record::{DivisionRecord, UserRecord, UserUpdatePayload};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TransportResult<T> = Result<T, TransportError>;

/// Failure of one backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Backend rejected the caller's credentials (401).
    Unauthorized,
    /// Backend answered with a non-success status other than 401.
    Status(u16),
    /// Request never produced a response.
    Network(String),
    /// Response body is missing expected fields or does not decode.
    Malformed(String),
}

impl TransportError {
    /// Maps an HTTP-like status code to an error, `None` for 2xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(Self::Unauthorized),
            other => Some(Self::Status(other)),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "request unauthorized"),
            Self::Status(status) => write!(f, "request failed with status {status}"),
            Self::Network(message) => write!(f, "network failure: {message}"),
            Self::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl Error for TransportError {}

impl From<serde_json::Error> for TransportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}

/// Decodes a JSON response body, reporting decode failures as `Malformed`.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> TransportResult<T> {
    serde_json::from_str(body).map_err(Into::into)
}

/// Request surface of the user directory.
///
/// Implementations perform exactly one request per call; retry and
/// redirect policy belong to the edit session.
pub trait DirectoryBackend {
    /// Reads one user with populated division/OU references.
    fn fetch_user(&self, id: &UserId) -> TransportResult<UserRecord>;
    /// Reads the flat division list, each carrying its OU inline.
    fn fetch_divisions(&self) -> TransportResult<Vec<DivisionRecord>>;
    /// Writes one user and returns the stored record.
    fn update_user(&self, id: &UserId, payload: &UserUpdatePayload)
        -> TransportResult<UserRecord>;
}

impl<T: DirectoryBackend + ?Sized> DirectoryBackend for &T {
    fn fetch_user(&self, id: &UserId) -> TransportResult<UserRecord> {
        (**self).fetch_user(id)
    }

    fn fetch_divisions(&self) -> TransportResult<Vec<DivisionRecord>> {
        (**self).fetch_divisions()
    }

    fn update_user(
        &self,
        id: &UserId,
        payload: &UserUpdatePayload,
    ) -> TransportResult<UserRecord> {
        (**self).update_user(id, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_body, TransportError};
    use crate::model::record::{DivisionRecord, UserRecord};

    #[test]
    fn status_mapping_distinguishes_unauthorized() {
        assert_eq!(TransportError::from_status(204), None);
        assert_eq!(
            TransportError::from_status(401),
            Some(TransportError::Unauthorized)
        );
        assert_eq!(
            TransportError::from_status(500),
            Some(TransportError::Status(500))
        );
    }

    #[test]
    fn decode_reports_missing_fields_as_malformed() {
        let err = decode_body::<UserRecord>(r#"{"_id": "u1", "username": "ann", "role": "Normal"}"#)
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn decode_keeps_division_without_ou_for_taxonomy_validation() {
        let items: Vec<DivisionRecord> =
            decode_body(r#"[{"_id": "d1", "name": "Finance"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].ou.is_none());
    }
}

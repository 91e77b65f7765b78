//! Remote collaborator contracts for the nutrilog engine: the favorites
//! store and the authenticated-user provider, plus a reqwest-based REST
//! implementation of the store.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn from_status(status: u16, body: String) -> Self {
        RemoteError::Status { status, body }
    }

    /// Whether an idempotent call may be retried after this error.
    /// Transport failures and server-side statuses qualify; auth and
    /// validation rejections will not get better on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Http(_) => true,
            RemoteError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type UserId = String;
pub type PlaceId = String;

/// A place as surfaced by the map screen; the subset of its fields that gets
/// snapshotted onto a favorite record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Place {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: PlaceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One row of the remote `favorite_places` table. The store enforces at most
/// one row per `(user_id, place_id)` pair; `id` and `created_at` are assigned
/// remotely and absent from upsert payloads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FavoriteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<uuid::Uuid>,
    pub user_id: UserId,
    #[serde(deserialize_with = "deserialize_id")]
    pub place_id: PlaceId,
    pub place_name: Option<String>,
    pub place_type: Option<String>,
    pub place_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl FavoriteRecord {
    /// Build the upsert payload for marking `place` a favorite of `user_id`.
    pub fn from_place(user_id: impl Into<UserId>, place: &Place) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            place_id: place.id.clone(),
            place_name: Some(place.name.clone()),
            place_type: Some(place.kind.clone()),
            place_address: place.address.clone(),
            latitude: place.latitude,
            longitude: place.longitude,
            created_at: None,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// The remote favorites table. Writes must be idempotent on
/// `(user_id, place_id)`: re-upserting an existing favorite succeeds without
/// duplication, deleting an absent one succeeds with no effect.
#[async_trait]
pub trait FavoritesStore: Send + Sync + 'static {
    async fn upsert(&self, record: &FavoriteRecord) -> Result<(), RemoteError>;
    async fn delete(&self, user_id: &str, place_id: &str) -> Result<(), RemoteError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, RemoteError>;
}

/// Source of the currently authenticated user, owned by the login flow.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    async fn current_user_id(&self) -> Option<UserId>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn deserialize_place_id_from_number() {
        let payload = json!({"id": 42, "name": "Green Bowl", "type": "restaurant",
            "address": null, "latitude": null, "longitude": null});
        let p: super::Place = serde_json::from_value(payload).expect("deserialize number id");
        assert_eq!(p.id, "42");
    }

    #[test]
    fn deserialize_place_id_invalid_type_errors() {
        let payload = json!({"id": {"nested": true}, "name": "x", "type": "cafe",
            "address": null, "latitude": null, "longitude": null});
        let res: Result<super::Place, _> = serde_json::from_value(payload);
        assert!(res.is_err());
    }

    #[test]
    fn from_place_snapshots_fields_and_omits_remote_columns() {
        let place = super::Place {
            id: "p1".into(),
            name: "Green Bowl".into(),
            kind: "restaurant".into(),
            address: Some("12 Oak St".into()),
            latitude: Some(-23.55),
            longitude: Some(-46.63),
        };
        let record = super::FavoriteRecord::from_place("u1", &place);
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.place_id, "p1");
        assert_eq!(record.place_name.as_deref(), Some("Green Bowl"));

        let payload = serde_json::to_value(&record).expect("serialize");
        let obj = payload.as_object().expect("object");
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("created_at"));
    }

    #[test]
    fn server_statuses_are_retryable_client_errors_are_not() {
        assert!(super::RemoteError::from_status(503, "down".into()).is_retryable());
        assert!(!super::RemoteError::from_status(409, "conflict".into()).is_retryable());
        assert!(!super::RemoteError::Auth("bad key".into()).is_retryable());
    }
}

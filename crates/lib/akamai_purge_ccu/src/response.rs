use crate::PurgeChunk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body of one CCU purge call.
///
/// ```json
/// {
///   "httpStatus": 201,
///   "detail": "Request accepted",
///   "supportId": "17PY1321286429616716-211907680",
///   "purgeId": "edcp-AkSMjrAbJfqXQ5GuxdfY2a",
///   "estimatedSeconds": 5
/// }
/// ```
///
/// Fields we don't know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub support_id: Option<String>,
    #[serde(default)]
    pub purge_id: Option<String>,
    #[serde(default)]
    pub estimated_seconds: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chunk that was accepted by the API, together with the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurgeOutcome {
    pub chunk: PurgeChunk,
    pub response: PurgeResponse,
}

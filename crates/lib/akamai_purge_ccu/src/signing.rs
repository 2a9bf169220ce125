//! EdgeGrid `EG1-HMAC-SHA256` request signing.
//!
//! see https://techdocs.akamai.com/developer/docs/authenticate-with-edgegrid
use crate::Credential;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac as _};
use http::Method;
use sha2::{Digest as _, Sha256};
use url::Url;

const ALGORITHM: &str = "EG1-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// `yyyyMMddTHH:mm:ss+0000`, always in UTC.
pub(crate) fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

/// random, uuid-formatted nonce.
pub(crate) fn nonce() -> String {
    let n: u128 = rand::random();
    let hex = format!("{n:032x}");
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

fn hmac_base64(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    BASE64.encode(mac.finalize().into_bytes())
}

fn content_hash(method: &Method, body: &[u8], max_body: usize) -> String {
    if *method != Method::POST || body.is_empty() {
        return String::new();
    }
    let body = &body[..body.len().min(max_body)];
    BASE64.encode(Sha256::digest(body))
}

/// Build the `Authorization` header value for one request.
pub(crate) fn authorization_header(
    credential: &Credential,
    method: &Method,
    url: &Url,
    body: &[u8],
    timestamp: &str,
    nonce: &str,
) -> String {
    let auth_prefix = format!(
        "{ALGORITHM} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
        credential.client_token, credential.access_token,
    );

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let path_and_query = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };

    // we never sign any headers, so the canonicalized header field stays empty.
    let data_to_sign = [
        method.as_str(),
        url.scheme(),
        &host,
        &path_and_query,
        "",
        &content_hash(method, body, credential.max_body),
        &auth_prefix,
    ]
    .join("\t");

    let signing_key = hmac_base64(credential.client_secret.as_bytes(), timestamp.as_bytes());
    let signature = hmac_base64(signing_key.as_bytes(), data_to_sign.as_bytes());

    format!("{auth_prefix}signature={signature}")
}

use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::StatusResponse;
use crate::http_server::api::client::{endpoint, ApiRequest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LivezRequest {}

impl ApiRequest for LivezRequest {
    type Response = StatusResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(endpoint(base_url, &["_status", "livez"]))
    }
}

/// Answers as long as the process can route a request. Storage trouble shows
/// up on readyz instead.
pub async fn handler() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

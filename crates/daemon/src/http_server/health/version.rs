use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{endpoint, ApiRequest};
use crate::{build_info, BuildInfo};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRequest {}

impl ApiRequest for VersionRequest {
    type Response = BuildInfo;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(endpoint(base_url, &["_status", "version"]))
    }
}

pub async fn handler() -> Json<BuildInfo> {
    Json(build_info())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_this_build() {
        let Json(info) = handler().await;
        assert_eq!(info.name, "docsvc-daemon");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_request_targets_status_path() {
        let base = Url::parse("http://localhost:8000/").unwrap();
        let request = VersionRequest {}
            .build_request(&base, &Client::new())
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/_status/version");
    }
}

//! Mock HTTP endpoints for command tests.
//!
//! Commands drive their own runtime, so the mock servers are started on a
//! separate runtime that the test keeps alive.

use serde_json::{Value, json};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::Config;

pub struct MockEndpoint {
    pub server: MockServer,
    _runtime: Runtime,
}

impl MockEndpoint {
    fn start(mock: Mock) -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            mock.mount(&server).await;
            server
        });
        Self {
            server,
            _runtime: runtime,
        }
    }

    /// A messages endpoint that grades every request with `score`.
    pub fn scorer(score: u8) -> Self {
        let body = json!({
            "content": [{"type": "text", "text": format!("{{\"score\": {score}}}")}]
        });
        Self::start(
            Mock::given(method("POST"))
                .and(path("/v1/messages"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body)),
        )
    }

    /// A sheet endpoint at `/exec` returning `rows`.
    pub fn sheet(rows: Value) -> Self {
        Self::start(
            Mock::given(method("GET"))
                .and(path("/exec"))
                .respond_with(ResponseTemplate::new(200).set_body_json(rows)),
        )
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Config that sends scoring requests to this endpoint.
    pub fn scorer_config(&self) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            api_base_url: Some(self.uri()),
            ..Config::default()
        }
    }

    /// Config that syncs from this endpoint.
    pub fn sheet_config(&self) -> Config {
        Config {
            sheet_url: Some(format!("{}/exec", self.uri())),
            ..Config::default()
        }
    }
}

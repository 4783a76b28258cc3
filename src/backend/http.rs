use super::{BackendError, BackendResult, ClusterBackend};
use crate::config::ConfigError;
use crate::domain::cluster::{HealthLevel, ResourceList};
use crate::domain::reroute::{RerouteCommand, RerouteRequest};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub struct HttpBackend {
    client: Client,
    target: Url,
}

impl HttpBackend {
    pub fn new(target: Url, verify_certs: bool) -> Result<Self, ConfigError> {
        if target.cannot_be_a_base() {
            return Err(ConfigError::UnusableTarget(target));
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_certs)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self { client, target })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.target.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::with_status(status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::transport(format!("unreadable response from cluster: {e}")))
    }
}

#[async_trait]
impl ClusterBackend for HttpBackend {
    async fn index_exists(&self, name: &str) -> BackendResult<bool> {
        let url = self.url(&[name]);
        debug!("HEAD {}", url);

        let response = self.client.head(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(BackendError::with_status(
                status.as_u16(),
                format!("index existence check for [{name}] failed with {status}"),
            )),
        }
    }

    async fn cluster_health(
        &self,
        indices: &ResourceList,
        level: HealthLevel,
    ) -> BackendResult<Value> {
        let url = if indices.is_empty() {
            self.url(&["_cluster", "health"])
        } else {
            self.url(&["_cluster", "health", &indices.joined()])
        };
        debug!("GET {} level={:?}", url, level);

        let mut request = self.client.get(url);
        if let Some(level) = level.as_param() {
            request = request.query(&[("level", level)]);
        }
        self.send(request).await
    }

    async fn create_index(&self, name: &str) -> BackendResult<Value> {
        let url = self.url(&[name]);
        debug!("PUT {}", url);
        self.send(self.client.put(url)).await
    }

    async fn delete_index(&self, name: &str) -> BackendResult<Value> {
        let url = self.url(&[name]);
        debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await
    }

    async fn nodes_info(&self) -> BackendResult<Value> {
        let url = self.url(&["_nodes"]);
        debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn reroute(&self, commands: &[RerouteCommand]) -> BackendResult<Value> {
        let url = self.url(&["_cluster", "reroute"]);
        debug!("POST {} ({} commands)", url, commands.len());
        self.send(self.client.post(url).json(&RerouteRequest { commands }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(server.uri().parse().unwrap(), true).unwrap()
    }

    // Nothing listens on the returned port once the listener is dropped.
    fn closed_port_url() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}").parse().unwrap()
    }

    #[tokio::test]
    async fn should_report_index_existence_from_head_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/absent"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        assert!(backend.index_exists("present").await.unwrap());
        assert!(!backend.index_exists("absent").await.unwrap());
    }

    #[tokio::test]
    async fn should_request_filtered_health_with_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_cluster/health/a,b"))
            .and(query_param("level", "shards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "green" })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let health = backend
            .cluster_health(&ResourceList::parse("a,b"), HealthLevel::Shards)
            .await
            .unwrap();

        assert_eq!(health["status"], "green");
    }

    #[tokio::test]
    async fn should_request_cluster_health_without_level_or_indices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_cluster/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "yellow" })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let health = backend
            .cluster_health(&ResourceList::default(), HealthLevel::Cluster)
            .await
            .unwrap();

        assert_eq!(health["status"], "yellow");
        let received = server.received_requests().await.unwrap();
        assert_eq!(received[0].url.query(), None);
    }

    #[tokio::test]
    async fn should_surface_cluster_status_and_body_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/taken"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("resource_already_exists_exception"),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let err = backend.create_index("taken").await.unwrap_err();

        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "resource_already_exists_exception");
    }

    #[tokio::test]
    async fn should_post_reroute_commands_as_one_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_cluster/reroute"))
            .and(body_json(json!({
                "commands": [{ "allocate": { "index": "idx", "shard": 0, "node": "node1" } }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let res = backend
            .reroute(&[RerouteCommand::Allocate {
                index: "idx".to_string(),
                shard: 0,
                node: "node1".to_string(),
            }])
            .await
            .unwrap();

        assert_eq!(res, json!({ "acknowledged": true }));
    }

    #[tokio::test]
    async fn should_delete_index_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/old-logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let res = backend.delete_index("old-logs").await.unwrap();

        assert_eq!(res, json!({ "acknowledged": true }));
    }

    #[tokio::test]
    async fn should_fetch_nodes_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_nodes"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "_nodes": { "total": 3 }, "nodes": {} })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let res = backend.nodes_info().await.unwrap();

        assert_eq!(res["_nodes"]["total"], 3);
    }

    #[tokio::test]
    async fn should_fail_existence_check_on_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/locked"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let err = backend.index_exists("locked").await.unwrap_err();

        assert_eq!(err.status, Some(403));
        assert!(err.message.contains("[locked]"));
    }

    #[tokio::test]
    async fn should_report_transport_failure_without_status() {
        let backend = HttpBackend::new(closed_port_url(), true).unwrap();
        let err = backend.nodes_info().await.unwrap_err();

        assert_eq!(err.status, None);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn should_reject_target_without_path() {
        let err = HttpBackend::new("mailto:ops@example.com".parse().unwrap(), true)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::UnusableTarget(_)));
    }

    #[test]
    fn should_keep_target_path_prefix() {
        let backend =
            HttpBackend::new("http://cluster:9200/es/".parse().unwrap(), false).unwrap();
        assert_eq!(
            backend.url(&["_nodes"]).as_str(),
            "http://cluster:9200/es/_nodes"
        );
    }
}

/// Higher-level worker pool workflows built on the API client
use anyhow::{Context, Result};
use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

use super::models::{WorkerPool, WorkerPoolState};
use super::worker_pool::WorkerPoolClient;
use crate::utils::Poller;

/// Worker pool manager
pub struct WorkerPoolManager {
    client: WorkerPoolClient,
    timeout: Duration,
    interval: Duration,
}

impl WorkerPoolManager {
    /// Create a new worker pool manager
    pub fn new(client: WorkerPoolClient) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(1800),
            interval: Duration::from_secs(10),
        }
    }

    /// Override how long and how often the wait helpers poll
    pub fn with_polling(mut self, timeout: Duration, interval: Duration) -> Self {
        self.timeout = timeout;
        self.interval = interval;
        self
    }

    pub fn client(&self) -> &WorkerPoolClient {
        &self.client
    }

    /// List the worker pools of several clusters concurrently
    ///
    /// Results are returned in the order the clusters were given.
    pub async fn list_for_clusters(
        &self,
        clusters: &[String],
    ) -> Vec<(String, Result<Vec<WorkerPool>>)> {
        let lists = join_all(clusters.iter().map(|cluster| async move {
            self.client
                .list_worker_pools(cluster)
                .await
                .with_context(|| format!("Failed to list worker pools of cluster {}", cluster))
        }))
        .await;

        clusters.iter().cloned().zip(lists).collect()
    }

    /// Wait until a worker pool reports the normal state
    pub async fn wait_until_normal(&self, cluster: &str, pool: &str) -> Result<WorkerPool> {
        Poller::new(
            self.timeout,
            self.interval,
            format!("Waiting for worker pool {} to become normal", pool),
        )
        .until(|| self.check_normal(cluster, pool))
        .await
    }

    /// Wait until a worker pool is gone
    pub async fn wait_until_deleted(&self, cluster: &str, pool: &str) -> Result<()> {
        Poller::new(
            self.timeout,
            self.interval,
            format!("Waiting for worker pool {} to be deleted", pool),
        )
        .until(|| self.check_deleted(cluster, pool))
        .await
    }

    async fn check_normal(&self, cluster: &str, pool: &str) -> Result<Option<WorkerPool>> {
        let current = self
            .client
            .get_worker_pool(cluster, pool)
            .await
            .context("Failed to get worker pool")?;

        match &current.state {
            WorkerPoolState::Normal => Ok(Some(current)),
            WorkerPoolState::Deleting | WorkerPoolState::Deleted => {
                anyhow::bail!(
                    "Worker pool {} is being deleted: {}",
                    pool,
                    current.reason_for_delete
                )
            }
            state => {
                info!("Worker pool {} is {}", pool, state);
                Ok(None)
            }
        }
    }

    async fn check_deleted(&self, cluster: &str, pool: &str) -> Result<Option<()>> {
        match self.client.get_worker_pool(cluster, pool).await {
            Err(e) if e.is_not_found() => Ok(Some(())),
            Err(e) => Err(e).context("Failed to get worker pool"),
            Ok(current) if current.state == WorkerPoolState::Deleted => Ok(Some(())),
            Ok(current) => {
                if current.state != WorkerPoolState::Deleting {
                    warn!(
                        "Worker pool {} is {} while waiting for deletion",
                        pool, current.state
                    );
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containerv1::ContainerClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pool_json(state: &str) -> serde_json::Value {
        serde_json::json!({
            "Name": "testpool", "Size": 5, "MachineType": "u2c.2x4",
            "Isolation": "public", "ID": "rtr4tg5", "Region": "us-south",
            "State": state, "WorkerVersion": "1.9.0", "MasterEOS": "1.9.0",
            "ReasonForDelete": "", "IsBalanced": true
        })
    }

    fn manager(server: &MockServer) -> WorkerPoolManager {
        let client =
            ContainerClient::with_http_client(reqwest::Client::new(), &server.uri()).unwrap();
        WorkerPoolManager::new(WorkerPoolClient::new(client))
            .with_polling(Duration::from_secs(5), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_wait_until_normal() {
        let mock_server = MockServer::start().await;
        let route = "/v1/clusters/test/workerpools/rtr4tg5";

        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json("resizing")))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json("normal")))
            .mount(&mock_server)
            .await;

        let pool = manager(&mock_server)
            .wait_until_normal("test", "rtr4tg5")
            .await
            .unwrap();

        assert_eq!(pool.state, WorkerPoolState::Normal);
    }

    #[tokio::test]
    async fn test_wait_until_normal_fails_on_deletion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/clusters/test/workerpools/rtr4tg5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json("deleting")))
            .mount(&mock_server)
            .await;

        let result = manager(&mock_server)
            .wait_until_normal("test", "rtr4tg5")
            .await;

        assert!(result.unwrap_err().to_string().contains("being deleted"));
    }

    #[tokio::test]
    async fn test_wait_until_deleted() {
        let mock_server = MockServer::start().await;
        let route = "/v1/clusters/test/workerpools/rtr4tg5";

        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json("deleting")))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"code":"G0004","description":"The specified worker pool could not be found."}"#,
            ))
            .mount(&mock_server)
            .await;

        tokio_test::assert_ok!(
            manager(&mock_server)
                .wait_until_deleted("test", "rtr4tg5")
                .await
        );
    }

    #[tokio::test]
    async fn test_list_for_clusters_keeps_order_and_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/clusters/a/workerpools"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([pool_json("normal")])),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/clusters/b/workerpools"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let clusters = vec!["a".to_string(), "b".to_string()];
        let results = manager(&mock_server).list_for_clusters(&clusters).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert_eq!(results[0].1.as_ref().unwrap().len(), 1);
        assert_eq!(results[1].0, "b");
        assert!(results[1].1.is_err());
    }
}

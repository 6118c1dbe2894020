/// Worker pool operations of the containerv1 API
use std::collections::HashMap;

use super::client::ContainerClient;
use super::error::ApiError;
use super::models::{
    LabelsRequest, ResizeRequest, WorkerPool, WorkerPoolRequest, WorkerPoolZone,
    WorkerPoolZoneNetwork,
};

/// Client for the worker pools of a cluster
#[derive(Clone)]
pub struct WorkerPoolClient {
    client: ContainerClient,
}

impl WorkerPoolClient {
    pub fn new(client: ContainerClient) -> Self {
        Self { client }
    }

    /// Create a worker pool in a cluster
    pub async fn create_worker_pool(
        &self,
        cluster: &str,
        request: &WorkerPoolRequest,
    ) -> Result<WorkerPool, ApiError> {
        self.client
            .post(&["v1", "clusters", cluster, "workerpools"], request)
            .await
    }

    /// List the worker pools of a cluster
    pub async fn list_worker_pools(&self, cluster: &str) -> Result<Vec<WorkerPool>, ApiError> {
        self.client
            .get(&["v1", "clusters", cluster, "workerpools"])
            .await
    }

    /// Get a worker pool by ID
    pub async fn get_worker_pool(&self, cluster: &str, pool: &str) -> Result<WorkerPool, ApiError> {
        self.client
            .get(&["v1", "clusters", cluster, "workerpools", pool])
            .await
    }

    /// Delete a worker pool
    pub async fn delete_worker_pool(&self, cluster: &str, pool: &str) -> Result<(), ApiError> {
        self.client
            .delete(&["v1", "clusters", cluster, "workerpools", pool])
            .await
    }

    /// Set the number of workers per zone
    pub async fn resize_worker_pool(
        &self,
        cluster: &str,
        pool: &str,
        size: u32,
    ) -> Result<(), ApiError> {
        let request = ResizeRequest {
            state: "resizing",
            size,
        };
        self.client
            .patch(&["v1", "clusters", cluster, "workerpools", pool], &request)
            .await
    }

    /// Replace the labels applied to the workers of a pool
    pub async fn update_labels(
        &self,
        cluster: &str,
        pool: &str,
        labels: &HashMap<String, String>,
    ) -> Result<(), ApiError> {
        let request = LabelsRequest {
            state: "labels",
            labels,
        };
        self.client
            .patch(&["v1", "clusters", cluster, "workerpools", pool], &request)
            .await
    }

    /// Add a zone to a worker pool
    pub async fn add_zone(
        &self,
        cluster: &str,
        pool: &str,
        zone: &WorkerPoolZone,
    ) -> Result<(), ApiError> {
        self.client
            .post_no_content(&["v1", "clusters", cluster, "workerpools", pool, "zones"], zone)
            .await
    }

    /// Remove a zone from a worker pool.
    ///
    /// Note the argument order: the zone comes before the pool.
    pub async fn remove_zone(&self, cluster: &str, zone: &str, pool: &str) -> Result<(), ApiError> {
        self.client
            .delete(&["v1", "clusters", cluster, "workerpools", pool, "zones", zone])
            .await
    }

    /// Change the VLANs a worker pool uses in one zone
    pub async fn update_zone_network(
        &self,
        cluster: &str,
        zone: &str,
        pool: &str,
        private_vlan: &str,
        public_vlan: &str,
    ) -> Result<(), ApiError> {
        let request = WorkerPoolZoneNetwork {
            private_vlan: private_vlan.to_string(),
            public_vlan: public_vlan.to_string(),
        };
        self.client
            .patch(
                &["v1", "clusters", cluster, "workerpools", pool, "zones", zone],
                &request,
            )
            .await
    }
}

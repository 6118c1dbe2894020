/// Client for the containerv1 cluster management API
pub mod client;
pub mod error;
pub mod manager;
pub mod models;
pub mod worker_pool;

pub use client::ContainerClient;
pub use manager::WorkerPoolManager;
pub use worker_pool::WorkerPoolClient;

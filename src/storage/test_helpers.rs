//! Test database utilities for in-library tests.
//!
//! Provides MySQL test database infrastructure using Testcontainers. Each
//! `TestDatabase` instance starts a fresh MySQL container, so tables created
//! lazily by one test never leak into another.
//!
//! This module is only available in test builds with the `mysql_tests` feature.

use crate::config::{ClusterCredentials, DatabaseConfig};
use crate::storage::{create_pool, DbPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mysql::Mysql;

/// A test database backed by a Testcontainers MySQL instance.
///
/// The container is stopped and removed when this struct is dropped. Keep it
/// alive for the duration of the test.
pub struct TestDatabase {
    pub pool: DbPool,
    _container: ContainerAsync<Mysql>,
}

impl TestDatabase {
    /// Start a MySQL container and return a pool connected to its `test` database.
    ///
    /// `prefix` only labels panic messages so failures point at the right test.
    pub async fn new(prefix: &str) -> Self {
        let container = Mysql::default()
            .start()
            .await
            .unwrap_or_else(|e| panic!("Failed to start MySQL container for {}: {}", prefix, e));

        let host = container
            .get_host()
            .await
            .unwrap_or_else(|e| panic!("Failed to get container host for {}: {}", prefix, e));

        let port = container
            .get_host_port_ipv4(3306)
            .await
            .unwrap_or_else(|e| panic!("Failed to get container port for {}: {}", prefix, e));

        let config = DatabaseConfig {
            url: Some(format!("mysql://root@{}:{}/test", host, port)),
            max_connections: 5,
            ..Default::default()
        };

        let pool = create_pool(&config, &ClusterCredentials::default())
            .unwrap_or_else(|e| panic!("Failed to create test pool for {}: {}", prefix, e));

        Self { pool, _container: container }
    }
}

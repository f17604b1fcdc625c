//! Test server harness for E2E testing
//!
//! Provides `TestMedicaServer` for spawning real Medica server instances in tests.

use crate::test_ids::TEST_JWT_SECRET;
use medica_service::config::Config;
use medica_service::routes::{self, AppState};
use medica_service::services::attachments::memory::InMemoryAttachmentStore;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Upload limit used by the harness, small enough to test 413 cheaply.
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Test harness for spawning the Medica server in E2E tests.
///
/// Attachments go to an in-memory store reachable through
/// [`TestMedicaServer::attachments`].
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_health_flow_e2e(pool: PgPool) -> Result<()> {
///     let server = TestMedicaServer::spawn(pool).await?;
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestMedicaServer {
    addr: SocketAddr,
    pool: PgPool,
    attachments: Arc<InMemoryAttachmentStore>,
    _handle: JoinHandle<()>,
}

impl TestMedicaServer {
    /// Spawn a new test server instance on a random local port.
    ///
    /// # Arguments
    /// * `pool` - Database connection pool (typically from `#[sqlx::test]`)
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            (
                "MAX_UPLOAD_BYTES".to_string(),
                TEST_MAX_UPLOAD_BYTES.to_string(),
            ),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let attachments = Arc::new(InMemoryAttachmentStore::new());
        let state = Arc::new(AppState {
            pool: pool.clone(),
            config,
            attachments: attachments.clone(),
        });

        // Not installed globally; each test server gets its own handle.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            attachments,
            _handle: handle,
        })
    }

    /// Get reference to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Attachments saved by the server.
    pub fn attachments(&self) -> &InMemoryAttachmentStore {
        &self.attachments
    }
}

impl Drop for TestMedicaServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

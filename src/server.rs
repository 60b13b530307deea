//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, store
//! selection (SQLite or in-memory), migrations, the REST API and graceful
//! shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{CredentialVerifier, RoleService};
use crate::config::AppConfig;
use crate::domain::{AccountStore, RoleStore};
use crate::infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryIdentityStore, PasswordHasher,
    SeaOrmAccountStore, SeaOrmRoleStore,
};
use crate::interfaces::http::modules::auth::AuthState;
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the identity API.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global metrics recorder can only be installed once per process;
/// later starts reuse the first handle.
fn prometheus_handle() -> Result<PrometheusHandle, BuildError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Account and role stores plus the database they live in, if any.
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub roles: Arc<dyn RoleStore>,
    pub db: Option<DatabaseConnection>,
}

/// Pick the backing store from `database.url`.
pub async fn open_stores(config: &AppConfig, auto_migrate: bool) -> Result<Stores, sea_orm::DbErr> {
    if config.database.is_memory() {
        info!("Using in-memory identity store");
        let store = Arc::new(InMemoryIdentityStore::new());
        return Ok(Stores {
            accounts: store.clone(),
            roles: store,
            db: None,
        });
    }

    let db = init_database(&DatabaseConfig {
        url: config.database.url.clone(),
    })
    .await?;

    if auto_migrate {
        info!("Running database migrations...");
        run_migrations(&db).await?;
    }

    Ok(Stores {
        accounts: Arc::new(SeaOrmAccountStore::new(db.clone())),
        roles: Arc::new(SeaOrmRoleStore::new(db.clone())),
        db: Some(db),
    })
}

/// Wire services and HTTP state from configuration and opened stores.
pub fn build_api_state(
    config: &AppConfig,
    stores: &Stores,
    metrics: PrometheusHandle,
) -> Result<ApiState, Box<dyn std::error::Error>> {
    let verifier = CredentialVerifier::new(
        stores.accounts.clone(),
        PasswordHasher::new(config.security.bcrypt_cost),
        config.password.clone(),
        config.lockout.clone(),
    );
    let roles = RoleService::new(stores.accounts.clone(), stores.roles.clone());

    Ok(ApiState {
        auth: AuthState {
            verifier: Arc::new(verifier),
            roles: Arc::new(roles),
            messages: Arc::new(config.messages()?),
        },
        health: HealthState {
            db: stores.db.clone(),
            started_at: Arc::new(Instant::now()),
        },
        metrics: MetricsState { handle: metrics },
    })
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running identity API.
///
/// ```rust,no_run
/// use identity_api::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is bound to (resolves port 0).
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting identity API...");

        let metrics = prometheus_handle()?;
        let stores = open_stores(&app_cfg, opts.auto_migrate).await?;
        let state = build_api_state(&app_cfg, &stores, metrics)?;
        let api_router = create_api_router(state);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            db: stores.db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        info!("Waiting for server tasks to complete...");
        shutdown
            .run_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
                if let Some(db) = db {
                    if let Err(e) = db.close().await {
                        warn!("Error closing database connection: {}", e);
                    } else {
                        info!("Database connection closed");
                    }
                }
            })
            .await;

        info!("Identity API shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down identity API...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

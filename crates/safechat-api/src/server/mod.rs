//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use safechat_common::{AppConfig, AppError, JwtService, ModerationConfig};
use safechat_core::entities::User;
use safechat_core::traits::UserRepository;
use safechat_core::{KeywordClassifier, Snowflake, SnowflakeGenerator};
use safechat_db::{
    create_pool, run_migrations, DatabaseConfig, MemoryStore, PgChatRepository,
    PgContactRepository, PgFlagRepository, PgLinkRepository, PgMessageRepository,
    PgUserRepository,
};
use safechat_service::moderation::scanner_from_config;
use safechat_service::{
    ModerationPipeline, ModerationQueue, ModerationWorker, ServiceContextBuilder,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState.
///
/// With `DATABASE_URL` set the PostgreSQL store is used (migrations run on
/// startup); otherwise everything lives in an in-process store.
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = match DatabaseConfig::from_app(&config.database) {
        Some(db_config) => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            let users = Arc::new(PgUserRepository::new(pool.clone()));
            seed_system_accounts(users.as_ref(), &config.moderation).await?;

            ServiceContextBuilder::new()
                .pool(pool.clone())
                .user_repo(users)
                .link_repo(Arc::new(PgLinkRepository::new(pool.clone())))
                .chat_repo(Arc::new(PgChatRepository::new(pool.clone())))
                .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
                .flag_repo(Arc::new(PgFlagRepository::new(pool.clone())))
                .contact_repo(Arc::new(PgContactRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-process store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            seed_system_accounts(store.as_ref(), &config.moderation).await?;
            ServiceContextBuilder::new().store(store)
        }
    };

    build_state(config, builder)
}

/// AppState over a caller-owned in-process store
pub async fn create_app_state_with_store(
    config: AppConfig,
    store: Arc<MemoryStore>,
) -> Result<AppState, AppError> {
    seed_system_accounts(store.as_ref(), &config.moderation).await?;
    build_state(config, ServiceContextBuilder::new().store(store))
}

/// Finish the context and start the moderation worker. Must run inside the
/// Tokio runtime.
fn build_state(config: AppConfig, builder: ServiceContextBuilder) -> Result<AppState, AppError> {
    let classifier = load_classifier(&config.moderation)?;
    let (queue, jobs) = ModerationQueue::bounded(config.moderation.queue_capacity);

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = builder
        .classifier(Arc::new(classifier))
        .moderation(Arc::new(queue))
        .moderation_config(&config.moderation)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let scanner =
        scanner_from_config(&config.moderation).map_err(|e| AppError::Config(e.to_string()))?;
    let pipeline = Arc::new(ModerationPipeline::new(service_context.clone(), scanner));
    ModerationWorker::new(jobs, pipeline, config.moderation.max_concurrent_scans).spawn();
    info!(
        capacity = config.moderation.queue_capacity,
        max_concurrent = config.moderation.max_concurrent_scans,
        "Moderation worker started"
    );

    Ok(AppState::new(service_context, config))
}

/// Keyword list from `KEYWORD_LIST_PATH`, or the built-in one
fn load_classifier(config: &ModerationConfig) -> Result<KeywordClassifier, AppError> {
    let Some(path) = config.keyword_list_path.as_deref() else {
        let classifier = KeywordClassifier::builtin();
        info!(terms = classifier.term_count(), "Using built-in keyword list");
        return Ok(classifier);
    };

    let raw = std::fs::read_to_string(Path::new(path))
        .map_err(|e| AppError::Config(format!("Failed to read keyword list {path}: {e}")))?;
    let classifier = KeywordClassifier::from_json(&raw)
        .map_err(|e| AppError::Config(format!("Invalid keyword list {path}: {e}")))?;

    info!(path, terms = classifier.term_count(), "Keyword list loaded");
    Ok(classifier)
}

/// The counselor and the system flagger must exist as accounts: the
/// counselor takes part in chats and the flagger appears on flags
async fn seed_system_accounts(
    users: &dyn UserRepository,
    config: &ModerationConfig,
) -> Result<(), AppError> {
    let accounts: [(Snowflake, &str, &str); 2] = [
        (config.counselor_account_id, "SafeChat", "Counselor"),
        (config.system_flagger_id, "SafeChat", "Moderation"),
    ];

    for (id, first_name, last_name) in accounts {
        if users.find_by_id(id).await?.is_none() {
            users
                .create(&User::new_parent(id, first_name.into(), last_name.into()))
                .await?;
            info!(user_id = %id, "System account created");
        }
    }
    Ok(())
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}

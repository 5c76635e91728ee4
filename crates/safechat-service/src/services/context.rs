//! Service context - dependency container for services
//!
//! Holds the repositories, the fixed system identities, the keyword
//! classifier and the moderation queue handle.

use std::sync::Arc;

use safechat_common::auth::JwtService;
use safechat_common::ModerationConfig;
use safechat_core::traits::{
    ChatRepository, ContactRepository, FlagRepository, LinkRepository, MessageRepository,
    UserRepository,
};
use safechat_core::{KeywordClassifier, Snowflake, SnowflakeGenerator, SystemAccounts};
use safechat_db::PgPool;
use tracing::instrument;

use crate::moderation::ModerationDispatch;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Entity store repositories (PostgreSQL or the in-process store)
/// - JWT service for bearer-token verification
/// - Snowflake generator for ID generation
/// - The counselor and system flagger identities
/// - The keyword classifier and the moderation queue
#[derive(Clone)]
pub struct ServiceContext {
    // Present only when running on PostgreSQL
    pool: Option<PgPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    link_repo: Arc<dyn LinkRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    message_repo: Arc<dyn MessageRepository>,
    flag_repo: Arc<dyn FlagRepository>,
    contact_repo: Arc<dyn ContactRepository>,

    // Moderation
    classifier: Arc<KeywordClassifier>,
    moderation: Arc<dyn ModerationDispatch>,
    system_accounts: SystemAccounts,
    counselor_message: Arc<str>,

    // Services
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Database Pool ===

    /// Get the PostgreSQL connection pool, if one is configured
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Readiness check for the entity store
    #[instrument(skip(self))]
    pub async fn ping_store(&self) -> ServiceResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map_err(|e| ServiceError::internal(format!("database ping failed: {e}")))?;
        }
        Ok(())
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn link_repo(&self) -> &dyn LinkRepository {
        self.link_repo.as_ref()
    }

    pub fn chat_repo(&self) -> &dyn ChatRepository {
        self.chat_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn flag_repo(&self) -> &dyn FlagRepository {
        self.flag_repo.as_ref()
    }

    pub fn contact_repo(&self) -> &dyn ContactRepository {
        self.contact_repo.as_ref()
    }

    // === Moderation ===

    pub fn classifier(&self) -> &KeywordClassifier {
        self.classifier.as_ref()
    }

    /// Handle the send path uses to hand jobs to the moderation worker
    pub fn moderation(&self) -> &dyn ModerationDispatch {
        self.moderation.as_ref()
    }

    pub fn system_accounts(&self) -> SystemAccounts {
        self.system_accounts
    }

    /// Text the counselor account sends after a keyword flag
    pub fn counselor_message(&self) -> &str {
        &self.counselor_message
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("repositories", &"...")
            .field("system_accounts", &self.system_accounts)
            .field("keyword_terms", &self.classifier.term_count())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    link_repo: Option<Arc<dyn LinkRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    flag_repo: Option<Arc<dyn FlagRepository>>,
    contact_repo: Option<Arc<dyn ContactRepository>>,
    classifier: Option<Arc<KeywordClassifier>>,
    moderation: Option<Arc<dyn ModerationDispatch>>,
    system_accounts: Option<SystemAccounts>,
    counselor_message: Option<String>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Use one store for every repository
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: UserRepository
            + LinkRepository
            + ChatRepository
            + MessageRepository
            + FlagRepository
            + ContactRepository
            + 'static,
    {
        self.user_repo(store.clone())
            .link_repo(store.clone())
            .chat_repo(store.clone())
            .message_repo(store.clone())
            .flag_repo(store.clone())
            .contact_repo(store)
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn link_repo(mut self, repo: Arc<dyn LinkRepository>) -> Self {
        self.link_repo = Some(repo);
        self
    }

    pub fn chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn flag_repo(mut self, repo: Arc<dyn FlagRepository>) -> Self {
        self.flag_repo = Some(repo);
        self
    }

    pub fn contact_repo(mut self, repo: Arc<dyn ContactRepository>) -> Self {
        self.contact_repo = Some(repo);
        self
    }

    /// Defaults to [`KeywordClassifier::builtin`]
    pub fn classifier(mut self, classifier: Arc<KeywordClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn moderation(mut self, dispatch: Arc<dyn ModerationDispatch>) -> Self {
        self.moderation = Some(dispatch);
        self
    }

    /// Fixed identities and counselor text from the moderation config
    pub fn moderation_config(mut self, config: &ModerationConfig) -> Self {
        self.system_accounts = Some(SystemAccounts::new(
            config.counselor_account_id,
            config.system_flagger_id,
        ));
        self.counselor_message = Some(config.counselor_message.clone());
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            user_repo: required(self.user_repo, "user_repo")?,
            link_repo: required(self.link_repo, "link_repo")?,
            chat_repo: required(self.chat_repo, "chat_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            flag_repo: required(self.flag_repo, "flag_repo")?,
            contact_repo: required(self.contact_repo, "contact_repo")?,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(KeywordClassifier::builtin())),
            moderation: required(self.moderation, "moderation")?,
            system_accounts: required(self.system_accounts, "system_accounts")?,
            counselor_message: required(self.counselor_message, "counselor_message")?.into(),
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
        })
    }
}

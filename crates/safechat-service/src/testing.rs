//! Fixtures shared by the service unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use safechat_common::auth::JwtService;
use safechat_common::ModerationConfig;
use safechat_core::entities::{
    ApprovedContact, Chat, Flag, Message, ParentChildLink, SurveillanceLevel, User,
};
use safechat_core::traits::{
    ChatRepository, ContactRepository, FlagRepository, LinkRepository, MessageRepository,
    UserRepository,
};
use safechat_core::{Snowflake, SnowflakeGenerator, SystemAccounts};
use safechat_db::MemoryStore;

use crate::moderation::{
    ImageScanRequest, ImageScanner, ImageVerdict, ModerationDispatch, ModerationJob,
    ModerationPipeline, ScanError,
};
use crate::services::ServiceContext;

/// Dispatcher that only remembers what it was given
#[derive(Debug, Default)]
pub struct RecordingDispatch {
    jobs: Mutex<Vec<ModerationJob>>,
}

impl RecordingDispatch {
    pub fn jobs(&self) -> Vec<ModerationJob> {
        self.jobs.lock().clone()
    }
}

impl ModerationDispatch for RecordingDispatch {
    fn enqueue(&self, job: ModerationJob) {
        self.jobs.lock().push(job);
    }
}

/// Scanner with a canned answer
pub struct FakeScanner {
    verdict: Option<ImageVerdict>,
}

impl FakeScanner {
    pub fn clean() -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(ImageVerdict {
                flagged: false,
                reason: None,
            }),
        })
    }

    pub fn flagging(reason: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(ImageVerdict {
                flagged: true,
                reason: reason.map(String::from),
            }),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { verdict: None })
    }
}

#[async_trait]
impl ImageScanner for FakeScanner {
    async fn scan(&self, _request: &ImageScanRequest) -> Result<ImageVerdict, ScanError> {
        self.verdict.clone().ok_or_else(|| ScanError::Status {
            status: 503,
            body: "scanner down".into(),
        })
    }
}

/// Clean scanner that takes its time and records how many scans overlap
#[derive(Debug, Default)]
pub struct SlowScanner {
    delay: std::time::Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

impl SlowScanner {
    pub fn new(delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageScanner for SlowScanner {
    async fn scan(&self, _request: &ImageScanRequest) -> Result<ImageVerdict, ScanError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(ImageVerdict {
            flagged: false,
            reason: None,
        })
    }
}

/// Service context over a fresh in-process store
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub dispatch: Arc<RecordingDispatch>,
    pub accounts: SystemAccounts,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let dispatch = Arc::new(RecordingDispatch::default());
        let config = ModerationConfig::new(Snowflake::new(900), Snowflake::new(901));
        let accounts = SystemAccounts::new(config.counselor_account_id, config.system_flagger_id);

        let ctx = ServiceContext::builder()
            .store(Arc::clone(&store))
            .moderation(dispatch.clone())
            .moderation_config(&config)
            .jwt_service(Arc::new(JwtService::new("test-secret", 900)))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .build()
            .expect("complete context");

        Self {
            store,
            dispatch,
            accounts,
            ctx,
        }
    }

    pub fn pipeline(&self, scanner: Arc<dyn ImageScanner>) -> ModerationPipeline {
        ModerationPipeline::new(self.ctx.clone(), scanner)
    }

    pub async fn parent(&self, first_name: &str) -> Snowflake {
        let user = User::new_parent(self.ctx.generate_id(), first_name.into(), "Parent".into());
        UserRepository::create(self.store.as_ref(), &user).await.unwrap();
        user.id
    }

    pub async fn child(&self, username: &str) -> Snowflake {
        let user = User::new_child(
            self.ctx.generate_id(),
            username.into(),
            username.into(),
            "Kid".into(),
        );
        UserRepository::create(self.store.as_ref(), &user).await.unwrap();
        user.id
    }

    pub async fn link(&self, parent: Snowflake, child: Snowflake, level: SurveillanceLevel) {
        LinkRepository::create(self.store.as_ref(), &ParentChildLink::new(parent, child, level))
            .await
            .unwrap();
    }

    pub async fn chat(&self, a: Snowflake, b: Snowflake) -> Chat {
        let chat = Chat::new(self.ctx.generate_id(), a, b);
        ChatRepository::create(self.store.as_ref(), &chat).await.unwrap();
        chat
    }

    pub async fn message(&self, chat: &Chat, sender: Snowflake, text: &str) -> Message {
        let message =
            Message::new(self.ctx.generate_id(), chat.id, sender, Some(text.into()), None).unwrap();
        MessageRepository::create(self.store.as_ref(), &message).await.unwrap();
        message
    }

    pub async fn flag(&self, message_id: Snowflake, flagged_by: Snowflake) {
        let flag = Flag::new(self.ctx.generate_id(), message_id, flagged_by, None);
        FlagRepository::create(self.store.as_ref(), &flag).await.unwrap();
    }

    /// Approve `a` and `b` for each other
    pub async fn approve(&self, a: Snowflake, b: Snowflake, parent: Snowflake) {
        for (child, contact) in [(a, b), (b, a)] {
            self.store
                .insert_approval(&ApprovedContact::new(child, contact, parent))
                .await
                .unwrap();
        }
    }
}

//! Shared fixtures for thumbnail-service integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use thumbnail_service::db::{CreditLedger, GenerationStore};
use thumbnail_service::error::{Result, ThumbnailError};
use thumbnail_service::models::{
    Account, ChargedGeneration, GenerationRecord, GenerationStats, NewAccount, NewGeneration,
    StatsRange, TypeStats,
};
use thumbnail_service::providers::{
    ChatCompletion, ChatRequest, ImageGenerationRequest, ImageGenerator,
};
use thumbnail_service::services::{
    ArtifactStore, ImageAnalyzer, ImagePipeline, PromptEnhancer, StoredArtifact,
    ThumbnailGenerator,
};
use thumbnail_service::models::CreditCosts;

pub const STORAGE_BASE: &str = "https://storage.test.local";
pub const PRIMARY_URL: &str = "https://primary.provider.example/out/abc.png";
pub const FALLBACK_URL: &str = "https://replicate.delivery/out/xyz.png";

// ============================================
// Mocks
// ============================================

mock! {
    pub Chat {}

    #[async_trait]
    impl ChatCompletion for Chat {
        async fn complete(&self, request: ChatRequest) -> anyhow::Result<String>;
    }
}

mock! {
    pub Generator {}

    #[async_trait]
    impl ImageGenerator for Generator {
        fn name(&self) -> &'static str;
        async fn generate(&self, request: &ImageGenerationRequest) -> anyhow::Result<String>;
    }
}

/// Chat mock that answers every call with `reply`
pub fn chat_replying(reply: &'static str) -> MockChat {
    let mut chat = MockChat::new();
    chat.expect_complete()
        .returning(move |_| Ok(reply.to_string()));
    chat
}

/// Generator mock named `name` that must be called exactly `times` times
pub fn generator(name: &'static str, times: usize, result: std::result::Result<&'static str, &'static str>) -> MockGenerator {
    let mut generator = MockGenerator::new();
    generator.expect_name().return_const(name);
    generator
        .expect_generate()
        .times(times)
        .returning(move |_| result.map(str::to_string).map_err(|e| anyhow::anyhow!(e)));
    generator
}

// ============================================
// In-memory ledger and record store
// ============================================

#[derive(Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<Uuid, i64>>,
}

impl InMemoryLedger {
    pub fn with_account(account_id: Uuid, credits: i64) -> Arc<Self> {
        let ledger = Self::default();
        ledger.set_balance(account_id, credits);
        Arc::new(ledger)
    }

    pub fn set_balance(&self, account_id: Uuid, credits: i64) {
        self.balances.lock().unwrap().insert(account_id, credits);
    }

    pub fn current(&self, account_id: Uuid) -> Option<i64> {
        self.balances.lock().unwrap().get(&account_id).copied()
    }

    fn try_deduct(&self, account_id: Uuid, cost: i64) -> Result<i64> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances
            .get_mut(&account_id)
            .ok_or(ThumbnailError::AccountNotFound(account_id))?;
        if *balance < cost {
            return Err(ThumbnailError::InsufficientCredits { required: cost });
        }
        *balance -= cost;
        Ok(*balance)
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, account_id: Uuid) -> Result<i64> {
        self.current(account_id)
            .ok_or(ThumbnailError::AccountNotFound(account_id))
    }

    async fn deduct(&self, account_id: Uuid, cost: i64) -> Result<i64> {
        if cost <= 0 {
            return Err(ThumbnailError::Validation("non-positive deduction".into()));
        }
        self.try_deduct(account_id, cost)
    }

    async fn add(&self, account_id: Uuid, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(ThumbnailError::Validation("non-positive grant".into()));
        }
        let mut balances = self.balances.lock().unwrap();
        let balance = balances
            .get_mut(&account_id)
            .ok_or(ThumbnailError::AccountNotFound(account_id))?;
        *balance += amount;
        Ok(*balance)
    }

    async fn provision(&self, account: NewAccount, trial_credits: i64) -> Result<Account> {
        let credits = *self
            .balances
            .lock()
            .unwrap()
            .entry(account.id)
            .or_insert(trial_credits);
        Ok(Account {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            credits,
            subscription_tier: "free".to_string(),
            subscription_status: "inactive".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Record store that charges through the shared in-memory ledger
pub struct InMemoryGenerationStore {
    ledger: Arc<InMemoryLedger>,
    records: Mutex<Vec<GenerationRecord>>,
}

impl InMemoryGenerationStore {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Arc<Self> {
        Arc::new(Self {
            ledger,
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn records(&self) -> Vec<GenerationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationStore for InMemoryGenerationStore {
    async fn record_and_charge(&self, generation: NewGeneration) -> Result<ChargedGeneration> {
        let remaining = self
            .ledger
            .try_deduct(generation.account_id, generation.credit_cost)?;

        let record = GenerationRecord {
            id: Uuid::new_v4(),
            account_id: generation.account_id,
            generation_type: generation.generation_type,
            output_image_url: generation.output_image_url,
            credit_cost: generation.credit_cost,
            metadata: serde_json::to_value(&generation.metadata)
                .map_err(|e| ThumbnailError::Internal(e.to_string()))?,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());

        Ok(ChargedGeneration {
            record,
            remaining_credits: remaining,
        })
    }

    async fn list_for_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>> {
        let mut records: Vec<_> = self
            .records()
            .into_iter()
            .filter(|r| r.account_id == account_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn stats(&self, range: StatsRange) -> Result<GenerationStats> {
        let mut by_type: Vec<TypeStats> = Vec::new();
        for record in self.records() {
            match by_type
                .iter_mut()
                .find(|t| t.generation_type == record.generation_type)
            {
                Some(entry) => {
                    entry.generations += 1;
                    entry.credits_charged += record.credit_cost;
                }
                None => by_type.push(TypeStats {
                    generation_type: record.generation_type,
                    generations: 1,
                    credits_charged: record.credit_cost,
                }),
            }
        }
        let balances = self.ledger.balances.lock().unwrap();
        Ok(GenerationStats {
            from: range.from,
            to: range.to,
            total_generations: by_type.iter().map(|t| t.generations).sum(),
            total_credits_charged: by_type.iter().map(|t| t.credits_charged).sum(),
            by_type,
            total_accounts: balances.len() as i64,
            outstanding_credits: balances.values().sum(),
        })
    }
}

// ============================================
// Artifact store
// ============================================

#[derive(Default)]
pub struct InMemoryArtifactStore {
    pub fail: bool,
    pub persisted: Mutex<Vec<(String, StoredArtifact)>>,
    pub discarded: Mutex<Vec<StoredArtifact>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn sources(&self) -> Vec<String> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .map(|(source, _)| source.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn persist(&self, source_url: &str, owner_id: Uuid) -> Result<StoredArtifact> {
        if self.fail {
            return Err(ThumbnailError::ArtifactPersist("bucket unavailable".into()));
        }
        let key = format!("thumbnails/{}/{}.png", owner_id, Uuid::new_v4().simple());
        let artifact = StoredArtifact {
            url: format!("{}/{}", STORAGE_BASE, key),
            key,
        };
        self.persisted
            .lock()
            .unwrap()
            .push((source_url.to_string(), artifact.clone()));
        Ok(artifact)
    }

    async fn discard(&self, artifact: &StoredArtifact) -> Result<()> {
        self.discarded.lock().unwrap().push(artifact.clone());
        Ok(())
    }
}

// ============================================
// Wiring
// ============================================

pub struct Harness {
    pub account_id: Uuid,
    pub ledger: Arc<InMemoryLedger>,
    pub store: Arc<InMemoryGenerationStore>,
    pub artifacts: Arc<InMemoryArtifactStore>,
    pub generator: Arc<ThumbnailGenerator>,
}

pub fn harness(
    credits: i64,
    chat: MockChat,
    primary: MockGenerator,
    fallback: MockGenerator,
) -> Harness {
    harness_with(
        credits,
        Arc::new(chat),
        Arc::new(primary),
        Arc::new(fallback),
        InMemoryArtifactStore::new(),
    )
}

pub fn harness_with(
    credits: i64,
    chat: Arc<dyn ChatCompletion>,
    primary: Arc<dyn ImageGenerator>,
    fallback: Arc<dyn ImageGenerator>,
    artifacts: Arc<InMemoryArtifactStore>,
) -> Harness {
    let account_id = Uuid::new_v4();
    let ledger = InMemoryLedger::with_account(account_id, credits);
    harness_on(account_id, ledger, chat, primary, fallback, artifacts)
}

/// Wire a generator around an existing ledger
pub fn harness_on(
    account_id: Uuid,
    ledger: Arc<InMemoryLedger>,
    chat: Arc<dyn ChatCompletion>,
    primary: Arc<dyn ImageGenerator>,
    fallback: Arc<dyn ImageGenerator>,
    artifacts: Arc<InMemoryArtifactStore>,
) -> Harness {
    let store = InMemoryGenerationStore::new(ledger.clone());

    let generator = Arc::new(ThumbnailGenerator::new(
        ledger.clone(),
        store.clone(),
        PromptEnhancer::new(chat.clone(), "prompt-model"),
        ImageAnalyzer::new(chat, "vision-model"),
        ImagePipeline::new(primary, fallback, Duration::from_secs(30)),
        artifacts.clone(),
        CreditCosts::default(),
    ));

    Harness {
        account_id,
        ledger,
        store,
        artifacts,
        generator,
    }
}

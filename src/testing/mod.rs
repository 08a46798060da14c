//! In-memory store doubles for exercising the tracker and migration runner
//! without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::database::articles::ArticleLookup;
use crate::database::migration_records::MigrationStore;
use crate::database::models::{
    ArticleProjection, AuthorProjection, MigrationRecord, MigrationStatus, UserViewHistory,
};
use crate::database::view_history::ViewHistoryStore;
use crate::database::StoreError;
use crate::migrate::MigrationUnit;

/// Mutex-guarded map of view history documents; the lock plays the role the
/// Postgres row lock plays in production
#[derive(Clone, Default)]
pub struct InMemoryViewHistoryStore {
    inner: Arc<ViewHistoryInner>,
}

#[derive(Default)]
struct ViewHistoryInner {
    docs: Mutex<HashMap<Uuid, UserViewHistory>>,
    fail_writes: AtomicBool,
}

impl InMemoryViewHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document verbatim, bypassing push_view invariants
    pub fn seed(&self, history: UserViewHistory) {
        self.inner
            .docs
            .lock()
            .unwrap()
            .insert(history.user_id, history);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ViewHistoryStore for InMemoryViewHistoryStore {
    async fn record_view(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        let mut docs = self.inner.docs.lock().unwrap();
        let history = docs
            .entry(user_id)
            .or_insert_with(|| UserViewHistory::new(user_id));
        history.push_view(article_id, viewed_at);
        Ok(())
    }

    async fn load(&self, user_id: Uuid) -> Result<Option<UserViewHistory>, StoreError> {
        Ok(self.inner.docs.lock().unwrap().get(&user_id).cloned())
    }
}

/// Fixed set of article projections keyed by id; absent ids model deleted
/// articles
#[derive(Clone, Default)]
pub struct StaticArticleLookup {
    articles: HashMap<Uuid, ArticleProjection>,
}

impl StaticArticleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.articles.insert(
            id,
            ArticleProjection {
                id,
                title: title.to_string(),
                summary: format!("summary of {}", title),
                document_type: "bank_statement".to_string(),
                author: AuthorProjection {
                    user_name: "analyst".to_string(),
                    full_name: "Test Analyst".to_string(),
                },
                created_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl ArticleLookup for StaticArticleLookup {
    async fn projections(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ArticleProjection>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.articles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}

/// Migration record store over a BTreeMap (free ascending-version ordering)
/// that counts mutations, so tests can assert "no writes happened"
#[derive(Clone, Default)]
pub struct InMemoryMigrationStore {
    inner: Arc<MigrationInner>,
}

#[derive(Default)]
struct MigrationInner {
    records: Mutex<BTreeMap<String, MigrationRecord>>,
    writes: AtomicUsize,
}

impl InMemoryMigrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating store operations performed so far
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn status_of(&self, version: &str) -> Option<MigrationStatus> {
        self.inner
            .records
            .lock()
            .unwrap()
            .get(version)
            .map(|r| r.status)
    }

    pub fn find_record(&self, version: &str) -> Option<MigrationRecord> {
        self.inner.records.lock().unwrap().get(version).cloned()
    }
}

#[async_trait]
impl MigrationStore for InMemoryMigrationStore {
    async fn successful_versions(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .inner
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == MigrationStatus::Success)
            .map(|r| r.version.clone())
            .collect())
    }

    async fn find(&self, version: &str) -> Result<Option<MigrationRecord>, StoreError> {
        Ok(self.inner.records.lock().unwrap().get(version).cloned())
    }

    async fn insert(&self, record: &MigrationRecord) -> Result<(), StoreError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .records
            .lock()
            .unwrap()
            .insert(record.version.clone(), record.clone());
        Ok(())
    }

    async fn set_status(&self, version: &str, status: MigrationStatus) -> Result<(), StoreError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(record) = self.inner.records.lock().unwrap().get_mut(version) {
            record.status = status;
        }
        Ok(())
    }

    async fn delete(&self, version: &str) -> Result<(), StoreError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.records.lock().unwrap().remove(version);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<MigrationRecord>, StoreError> {
        Ok(self
            .inner
            .records
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect())
    }
}

static APPLY_SEQ: AtomicUsize = AtomicUsize::new(1);

/// Migration unit double with call counters and switchable failure
pub struct FakeUnit {
    version: String,
    name: String,
    failing: AtomicBool,
    invertible: AtomicBool,
    applied: AtomicUsize,
    rolled_back: AtomicUsize,
    apply_order: AtomicUsize,
}

impl FakeUnit {
    fn new(version: &str, failing: bool) -> Arc<Self> {
        Arc::new(Self {
            version: version.to_string(),
            name: format!("{}.sql", version),
            failing: AtomicBool::new(failing),
            invertible: AtomicBool::new(false),
            applied: AtomicUsize::new(0),
            rolled_back: AtomicUsize::new(0),
            apply_order: AtomicUsize::new(0),
        })
    }

    pub fn succeeding(version: &str) -> Arc<Self> {
        Self::new(version, false)
    }

    pub fn failing(version: &str) -> Arc<Self> {
        Self::new(version, true)
    }

    pub fn with_rollback(self: Arc<Self>) -> Arc<Self> {
        self.invertible.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn rolled_back(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }

    /// Global sequence number of the most recent apply call
    pub fn apply_order(&self) -> usize {
        self.apply_order.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MigrationUnit for FakeUnit {
    fn version(&self) -> &str {
        &self.version
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self) -> anyhow::Result<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        self.apply_order
            .store(APPLY_SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("apply blew up");
        }
        Ok(())
    }

    fn has_rollback(&self) -> bool {
        self.invertible.load(Ordering::SeqCst)
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        self.rolled_back.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

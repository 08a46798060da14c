use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::articles::ArticleLookup;
use crate::database::models::ArticleProjection;
use crate::database::view_history::ViewHistoryStore;
use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid user id: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A view-history entry resolved to its article
#[derive(Debug, Clone, Serialize)]
pub struct RecentlyViewedEntry {
    pub article: ArticleProjection,
    pub viewed_at: DateTime<Utc>,
}

/// Maintains the bounded, de-duplicated, recency-ordered list of articles each
/// user has viewed. Both collaborators are injected so the tracker can run
/// against any store implementation.
pub struct RecentlyViewedTracker<S, A> {
    views: S,
    articles: A,
}

impl<S, A> RecentlyViewedTracker<S, A>
where
    S: ViewHistoryStore,
    A: ArticleLookup,
{
    pub fn new(views: S, articles: A) -> Self {
        Self { views, articles }
    }

    /// Record that a user viewed an article. Best-effort: tracking is a side
    /// effect of a read path, so persistence failure is logged and swallowed
    /// rather than surfaced to the caller.
    pub async fn record_view(&self, user_id: Uuid, article_id: Uuid) {
        if let Err(e) = self.views.record_view(user_id, article_id, Utc::now()).await {
            tracing::error!(
                "failed to record view of article {} for user {}: {}",
                article_id,
                user_id,
                e
            );
        }
    }

    /// The user's recently-viewed articles, most recent first. Entries whose
    /// article has since been deleted are dropped silently.
    pub async fn list_recently_viewed(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecentlyViewedEntry>, TrackerError> {
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| TrackerError::InvalidArgument(format!("malformed user id '{}'", user_id)))?;

        let history = match self.views.load(user_id).await? {
            Some(history) => history,
            None => return Ok(Vec::new()),
        };
        if history.recently_viewed.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = history
            .recently_viewed
            .iter()
            .map(|record| record.article_id)
            .collect();
        let projections = self.articles.projections(&ids).await?;

        let mut entries: Vec<RecentlyViewedEntry> = history
            .recently_viewed
            .into_iter()
            .filter_map(|record| {
                projections.get(&record.article_id).map(|article| RecentlyViewedEntry {
                    article: article.clone(),
                    viewed_at: record.viewed_at,
                })
            })
            .collect();

        // Insertion order should already guarantee this; re-sort in case a
        // document was persisted out of order
        entries.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{UserViewHistory, ViewRecord, MAX_RECENTLY_VIEWED};
    use crate::testing::{InMemoryViewHistoryStore, StaticArticleLookup};
    use chrono::Duration;

    fn tracker_with(
        articles: StaticArticleLookup,
    ) -> RecentlyViewedTracker<InMemoryViewHistoryStore, StaticArticleLookup> {
        RecentlyViewedTracker::new(InMemoryViewHistoryStore::new(), articles)
    }

    #[tokio::test]
    async fn list_is_capped_at_ten_entries() {
        let mut articles = StaticArticleLookup::new();
        let user = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..15).map(|i| articles.add(&format!("article {}", i))).collect();
        let tracker = tracker_with(articles);

        for id in &ids {
            tracker.record_view(user, *id).await;
            let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
            assert!(entries.len() <= MAX_RECENTLY_VIEWED);
        }
    }

    #[tokio::test]
    async fn reviewing_an_article_moves_it_to_the_front_once() {
        let mut articles = StaticArticleLookup::new();
        let a = articles.add("article a");
        let b = articles.add("article b");
        let user = Uuid::new_v4();
        let tracker = tracker_with(articles);

        tracker.record_view(user, a).await;
        tracker.record_view(user, b).await;
        tracker.record_view(user, a).await;

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        let ids: Vec<Uuid> = entries.iter().map(|e| e.article.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn entries_come_back_most_recent_first() {
        let mut articles = StaticArticleLookup::new();
        let user = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..5).map(|i| articles.add(&format!("article {}", i))).collect();
        let tracker = tracker_with(articles);

        for id in &ids {
            tracker.record_view(user, *id).await;
        }

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].viewed_at >= pair[1].viewed_at));
        assert_eq!(entries[0].article.id, *ids.last().unwrap());
    }

    #[tokio::test]
    async fn eleven_views_evict_the_first() {
        let mut articles = StaticArticleLookup::new();
        let user = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..11).map(|i| articles.add(&format!("article {}", i))).collect();
        let tracker = tracker_with(articles);

        for id in &ids {
            tracker.record_view(user, *id).await;
        }

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        assert_eq!(entries.len(), MAX_RECENTLY_VIEWED);
        assert!(entries.iter().all(|e| e.article.id != ids[0]));
    }

    #[tokio::test]
    async fn malformed_user_id_is_invalid_argument() {
        let tracker = tracker_with(StaticArticleLookup::new());
        let err = tracker.list_recently_viewed("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn user_without_history_gets_empty_list() {
        let tracker = tracker_with(StaticArticleLookup::new());
        let entries = tracker
            .list_recently_viewed(&Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn deleted_articles_are_filtered_out() {
        let mut articles = StaticArticleLookup::new();
        let kept = articles.add("still here");
        let user = Uuid::new_v4();
        let deleted = Uuid::new_v4(); // never added to the lookup
        let tracker = tracker_with(articles);

        tracker.record_view(user, deleted).await;
        tracker.record_view(user, kept).await;

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].article.id, kept);
    }

    #[tokio::test]
    async fn out_of_order_persisted_entries_are_resorted() {
        let mut articles = StaticArticleLookup::new();
        let older = articles.add("older");
        let newer = articles.add("newer");
        let user = Uuid::new_v4();
        let now = Utc::now();

        // Seed a document whose order contradicts its timestamps
        let store = InMemoryViewHistoryStore::new();
        store.seed(UserViewHistory {
            user_id: user,
            recently_viewed: vec![
                ViewRecord {
                    article_id: older,
                    viewed_at: now - Duration::minutes(5),
                },
                ViewRecord {
                    article_id: newer,
                    viewed_at: now,
                },
            ],
        });
        let tracker = RecentlyViewedTracker::new(store, articles);

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        let ids: Vec<Uuid> = entries.iter().map(|e| e.article.id).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn persistence_failure_is_swallowed_on_the_write_path() {
        let mut articles = StaticArticleLookup::new();
        let a = articles.add("article a");
        let user = Uuid::new_v4();
        let store = InMemoryViewHistoryStore::new();
        store.fail_writes(true);
        let tracker = RecentlyViewedTracker::new(store, articles);

        // Must return normally despite the store rejecting the write
        tracker.record_view(user, a).await;

        let entries = tracker.list_recently_viewed(&user.to_string()).await.unwrap();
        assert!(entries.is_empty());
    }
}

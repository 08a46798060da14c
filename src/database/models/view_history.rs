use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on entries kept per user
pub const MAX_RECENTLY_VIEWED: usize = 10;

/// One view event inside a user's history document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub article_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

/// Per-user recently-viewed document, most-recent-first.
/// Invariants after every mutation: at most [`MAX_RECENTLY_VIEWED`] entries,
/// no duplicate article_id, viewed_at strictly descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserViewHistory {
    pub user_id: Uuid,
    pub recently_viewed: Vec<ViewRecord>,
}

impl UserViewHistory {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            recently_viewed: Vec::new(),
        }
    }

    /// Record a view: drop any existing entry for the article, insert a fresh
    /// record at the front, truncate to the cap. A re-view promotes an item
    /// to the front rather than duplicating it.
    pub fn push_view(&mut self, article_id: Uuid, viewed_at: DateTime<Utc>) {
        self.recently_viewed
            .retain(|record| record.article_id != article_id);
        self.recently_viewed.insert(
            0,
            ViewRecord {
                article_id,
                viewed_at,
            },
        );
        self.recently_viewed.truncate(MAX_RECENTLY_VIEWED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_time() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn never_exceeds_cap() {
        let mut history = UserViewHistory::new(Uuid::new_v4());
        let start = base_time();
        for i in 0..50 {
            history.push_view(Uuid::new_v4(), start + Duration::seconds(i));
            assert!(history.recently_viewed.len() <= MAX_RECENTLY_VIEWED);
        }
    }

    #[test]
    fn reviewing_promotes_instead_of_duplicating() {
        let mut history = UserViewHistory::new(Uuid::new_v4());
        let article = Uuid::new_v4();
        let start = base_time();

        history.push_view(article, start);
        history.push_view(Uuid::new_v4(), start + Duration::seconds(1));
        history.push_view(article, start + Duration::seconds(2));

        let matches: Vec<_> = history
            .recently_viewed
            .iter()
            .filter(|r| r.article_id == article)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(history.recently_viewed[0].article_id, article);
        assert_eq!(history.recently_viewed[0].viewed_at, start + Duration::seconds(2));
    }

    #[test]
    fn stays_strictly_descending_by_viewed_at() {
        let mut history = UserViewHistory::new(Uuid::new_v4());
        let start = base_time();
        for i in 0..20 {
            history.push_view(Uuid::new_v4(), start + Duration::seconds(i));
            assert!(history
                .recently_viewed
                .windows(2)
                .all(|pair| pair[0].viewed_at > pair[1].viewed_at));
        }
    }

    #[test]
    fn eleventh_view_evicts_the_oldest() {
        let mut history = UserViewHistory::new(Uuid::new_v4());
        let start = base_time();
        let first = Uuid::new_v4();
        history.push_view(first, start);
        for i in 1..=10 {
            history.push_view(Uuid::new_v4(), start + Duration::seconds(i));
        }

        assert_eq!(history.recently_viewed.len(), MAX_RECENTLY_VIEWED);
        assert!(history
            .recently_viewed
            .iter()
            .all(|r| r.article_id != first));
    }
}

use sqlx::PgPool;
use std::sync::Arc;

use crate::migrate::units::{AddArticleViewsField, CreateCoreTables};
use crate::migrate::MigrationUnit;

/// The ordered set of migration units known to this build. Units are
/// registered here at compile time; there is no runtime discovery. Versions
/// carry zero-padded numeric prefixes so lexicographic order is the
/// application order.
pub fn registry(pool: &PgPool) -> Vec<Arc<dyn MigrationUnit>> {
    vec![
        Arc::new(CreateCoreTables::new(pool.clone())),
        Arc::new(AddArticleViewsField::new(pool.clone())),
    ]
}

pub mod article;
pub mod migration;
pub mod user;
pub mod view_history;

pub use article::{Article, ArticleContent, ArticleProjection, AuthorProjection, DocumentType};
pub use migration::{MigrationRecord, MigrationStatus};
pub use user::User;
pub use view_history::{UserViewHistory, ViewRecord, MAX_RECENTLY_VIEWED};

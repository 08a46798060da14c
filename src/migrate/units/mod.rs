mod m001_create_core_tables;
mod m002_add_article_views_field;

pub use m001_create_core_tables::CreateCoreTables;
pub use m002_add_article_views_field::AddArticleViewsField;

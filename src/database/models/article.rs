use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of financial document an article summarizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BankStatement,
    PayStub,
    TaxReturn,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "bank_statement",
            DocumentType::PayStub => "pay_stub",
            DocumentType::TaxReturn => "tax_return",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bank_statement" => Some(DocumentType::BankStatement),
            "pay_stub" => Some(DocumentType::PayStub),
            "tax_return" => Some(DocumentType::TaxReturn),
            _ => None,
        }
    }
}

/// Analysis figures carried by every article, stored as a JSONB column.
/// Unknown fields are rejected so clients cannot smuggle extra keys in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArticleContent {
    pub average_monthly_balance: Decimal,
    pub monthly_deposits: Vec<Decimal>,
    pub cash_flow_score: Decimal,
    pub recommended_loan_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub author_id: Uuid,
    pub document_type: String,
    pub title: String,
    pub summary: String,
    pub content: sqlx::types::Json<ArticleContent>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author fields exposed alongside article listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProjection {
    pub user_name: String,
    pub full_name: String,
}

/// Read-only article shape returned by the recently-viewed listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleProjection {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub document_type: String,
    pub author: AuthorProjection,
    pub created_at: DateTime<Utc>,
}

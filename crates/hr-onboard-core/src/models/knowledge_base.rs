//! Employee helpdesk knowledge-base documents (SOPs, benefits, IT how-tos).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::check_len;
use crate::error::HrResult;
use crate::store::Document;

pub const TITLE_MAX: usize = 200;
pub const CONTENT_MAX: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub effective_from: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for KnowledgeBaseDocument {
    const COLLECTION: &'static str = "employee_kb_docs";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseCreate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub effective_from: Option<DateTime<Utc>>,
}

impl KnowledgeBaseCreate {
    pub fn validate(&self) -> HrResult<()> {
        check_len("title", &self.title, 1, TITLE_MAX)?;
        check_len("content", &self.content, 1, CONTENT_MAX)
    }

    /// `effective_from` defaults to the creation time.
    pub fn into_document(self, id: String, now: DateTime<Utc>) -> HrResult<KnowledgeBaseDocument> {
        self.validate()?;
        Ok(KnowledgeBaseDocument {
            id,
            title: self.title,
            content: self.content,
            effective_from: self.effective_from.unwrap_or(now),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeBaseUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub effective_from: Option<DateTime<Utc>>,
}

impl KnowledgeBaseUpdate {
    pub fn validate(&self) -> HrResult<()> {
        if let Some(title) = &self.title {
            check_len("title", title, 1, TITLE_MAX)?;
        }
        if let Some(content) = &self.content {
            check_len("content", content, 1, CONTENT_MAX)?;
        }
        Ok(())
    }

    pub fn apply(&self, doc: &mut KnowledgeBaseDocument, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(content) = &self.content {
            doc.content = content.clone();
        }
        if let Some(effective_from) = self.effective_from {
            doc.effective_from = effective_from;
        }
        doc.updated_at = now;
    }
}

/// Aggregate view served by `/employee-kb/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBaseStats {
    pub total_documents: usize,
}

//! Helpdesk knowledge-base documents.

use chrono::Utc;
use uuid::Uuid;

use super::duplicate_or_store;
use crate::error::{HrError, HrResult};
use crate::models::knowledge_base::{
    KnowledgeBaseCreate, KnowledgeBaseDocument, KnowledgeBaseStats, KnowledgeBaseUpdate,
};
use crate::store::{Collection, DocumentStore};

#[derive(Clone)]
pub struct KnowledgeBaseService {
    documents: Collection<KnowledgeBaseDocument>,
}

fn not_found() -> HrError {
    HrError::NotFound("Employee KB document not found".to_string())
}

impl KnowledgeBaseService {
    pub fn new(store: &DocumentStore) -> HrResult<Self> {
        Ok(Self {
            documents: store.collection()?,
        })
    }

    pub fn corpus(&self) -> &Collection<KnowledgeBaseDocument> {
        &self.documents
    }

    pub fn create(&self, input: KnowledgeBaseCreate) -> HrResult<KnowledgeBaseDocument> {
        let doc = input.into_document(Uuid::new_v4().to_string(), Utc::now())?;
        self.documents.insert_one(&doc).map_err(duplicate_or_store)?;
        tracing::info!("Created KB document {} ({})", doc.id, doc.title);
        Ok(doc)
    }

    pub fn get(&self, id: &str) -> HrResult<KnowledgeBaseDocument> {
        self.documents.find_one(id)?.ok_or_else(not_found)
    }

    /// Oldest first.
    pub fn list(&self, limit: usize) -> HrResult<Vec<KnowledgeBaseDocument>> {
        let mut docs = self
            .documents
            .find_sorted(|_| true, |d| (d.created_at, d.id.clone()))?;
        docs.truncate(limit);
        Ok(docs)
    }

    pub fn update(&self, id: &str, patch: KnowledgeBaseUpdate) -> HrResult<KnowledgeBaseDocument> {
        patch.validate()?;
        let now = Utc::now();
        let updated = self
            .documents
            .update_one(id, |d| patch.apply(d, now))?
            .ok_or_else(not_found)?;
        tracing::info!("Updated KB document {}", id);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> HrResult<()> {
        self.documents.delete_one(id)?.ok_or_else(not_found)?;
        tracing::info!("Deleted KB document {}", id);
        Ok(())
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        KnowledgeBaseStats {
            total_documents: self.documents.count(),
        }
    }
}

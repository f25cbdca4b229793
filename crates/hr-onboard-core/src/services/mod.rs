//! Record services: the operations behind each HTTP route, one service per collection.

pub mod ask;
pub mod employee;
pub mod feedback;
pub mod knowledge_base;
pub mod policy;

pub use ask::AskService;
pub use employee::EmployeeService;
pub use feedback::FeedbackService;
pub use knowledge_base::KnowledgeBaseService;
pub use policy::PolicyService;

use std::sync::Arc;

use crate::ai_gateway::AnswerEngine;
use crate::error::{HrError, HrResult};
use crate::spreadsheet::SpreadsheetExporter;
use crate::store::{DocumentStore, StoreError};

pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Every service, wired to one store.
pub struct Services {
    pub policies: PolicyService,
    pub knowledge_base: KnowledgeBaseService,
    pub employees: EmployeeService,
    pub feedback: FeedbackService,
    pub ask: AskService,
}

impl Services {
    pub fn new(
        store: &DocumentStore,
        exporter: SpreadsheetExporter,
        engine: Arc<dyn AnswerEngine>,
        ask_max_tokens: u32,
    ) -> HrResult<Self> {
        Ok(Self {
            policies: PolicyService::new(store)?,
            knowledge_base: KnowledgeBaseService::new(store)?,
            employees: EmployeeService::new(store, exporter)?,
            feedback: FeedbackService::new(store)?,
            ask: AskService::new(store, engine, ask_max_tokens)?,
        })
    }
}

/// Store constraint violation -> `DuplicateIdentifier`; anything else stays a store fault.
pub(crate) fn duplicate_or_store(err: StoreError) -> HrError {
    match err {
        StoreError::ConstraintViolation { field, value } => {
            HrError::DuplicateIdentifier { field, value }
        }
        other => HrError::Store(other),
    }
}

pub(crate) fn page<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

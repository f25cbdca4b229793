//! HR Onboarding Desk core library.
//! Policy sections, helpdesk knowledge base, employee onboarding and the AI ask flow.

pub mod ai_gateway;
pub mod ask;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod prompts;
pub mod services;
pub mod spreadsheet;
pub mod store;

pub use ai_gateway::{AnswerEngine, ChatCompletionGateway, PromptTemplate};
pub use ask::{resolve_target, validate_ask, AskRequest, AskResponse, AskTarget, OnboardingMode, Scope};
pub use config::{AiSettings, HrConfig};
pub use context::{ContextAssembler, KnowledgeCorpus, PolicyCorpus};
pub use error::{HrError, HrResult, UpstreamFailure};
pub use services::Services;
pub use spreadsheet::SpreadsheetExporter;
pub use store::{Collection, Document, DocumentStore, StoreError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

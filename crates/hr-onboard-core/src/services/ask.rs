//! Ask flow: validate, assemble context, ask the answer engine.
//!
//! Onboarding scope fails loud on a missing section or empty corpus. Employee scope never
//! fails after validation: any context problem yields the fixed helpdesk notice.

use chrono::Utc;
use std::sync::Arc;

use crate::ai_gateway::{AnswerEngine, PromptTemplate};
use crate::ask::{validate_ask, AskRequest, AskResponse, AskTarget, OnboardingMode};
use crate::context::{format_guided, ContextAssembler};
use crate::error::{HrError, HrResult};
use crate::models::knowledge_base::KnowledgeBaseDocument;
use crate::models::policy::PolicySection;
use crate::store::{Collection, DocumentStore};

pub const HELPDESK_FALLBACK: &str =
    "Employee Helpdesk Mode is active. Ask about insurance, payroll, holidays, IT, reimbursements, etc.";

#[derive(Clone)]
pub struct AskService {
    policies: Collection<PolicySection>,
    knowledge: Collection<KnowledgeBaseDocument>,
    engine: Arc<dyn AnswerEngine>,
    max_tokens: u32,
}

impl AskService {
    pub fn new(
        store: &DocumentStore,
        engine: Arc<dyn AnswerEngine>,
        max_tokens: u32,
    ) -> HrResult<Self> {
        Ok(Self {
            policies: store.collection()?,
            knowledge: store.collection()?,
            engine,
            max_tokens,
        })
    }

    pub async fn ask(&self, request: AskRequest) -> HrResult<AskResponse> {
        let validated = validate_ask(&request, &self.policies)?;
        let assembler = ContextAssembler::new(&self.policies, &self.knowledge);

        let answer = match &validated.target {
            AskTarget::Helpdesk => match assembler.assemble(&validated.target) {
                Ok(context) => {
                    self.engine
                        .answer(&validated.message, &context, &PromptTemplate::Helpdesk, self.max_tokens)
                        .await
                }
                Err(e) => {
                    tracing::warn!("Helpdesk context unavailable ({}); answering with notice", e);
                    HELPDESK_FALLBACK.to_string()
                }
            },
            AskTarget::Onboarding(OnboardingMode::Guided { section_id }) => {
                let section = self.policies.find_one(section_id)?.ok_or_else(|| {
                    HrError::NotFound(format!("Policy section '{}' not found", section_id))
                })?;
                let template = match &validated.session_id {
                    Some(session_id) => PromptTemplate::OnboardingSession {
                        session_id: session_id.clone(),
                        current_step: section.order,
                        policy_id: section.section_id.clone(),
                    },
                    None => PromptTemplate::Policy {
                        mode: "guided".to_string(),
                    },
                };
                let context = format_guided(&section);
                self.engine
                    .answer(&validated.message, &context, &template, self.max_tokens)
                    .await
            }
            AskTarget::Onboarding(OnboardingMode::Global) => {
                let context = assembler.assemble(&validated.target)?;
                let template = PromptTemplate::Policy {
                    mode: "global".to_string(),
                };
                self.engine
                    .answer(&validated.message, &context, &template, self.max_tokens)
                    .await
            }
        };

        tracing::info!(
            "Answered {} question (mode={})",
            validated.target.scope().as_str(),
            validated.target.mode_used().unwrap_or("-")
        );

        Ok(AskResponse {
            scope: validated.target.scope(),
            mode_used: validated.target.mode_used().map(str::to_string),
            answer,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ask::Scope;
    use crate::models::knowledge_base::KnowledgeBaseCreate;
    use crate::models::policy::PolicySectionCreate;
    use crate::services::{KnowledgeBaseService, PolicyService};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records what it was asked and echoes the context back.
    #[derive(Default)]
    struct EchoEngine {
        calls: Mutex<Vec<(String, PromptTemplate, u32)>>,
    }

    #[async_trait]
    impl AnswerEngine for EchoEngine {
        async fn answer(
            &self,
            _question: &str,
            context: &str,
            template: &PromptTemplate,
            max_tokens: u32,
        ) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((context.to_string(), template.clone(), max_tokens));
            format!("echo: {}", context)
        }
    }

    struct Fixture {
        store: DocumentStore,
        engine: Arc<EchoEngine>,
        ask: AskService,
    }

    fn fixture() -> Fixture {
        let store = DocumentStore::connect_temporary().unwrap();
        let engine = Arc::new(EchoEngine::default());
        let ask = AskService::new(&store, engine.clone(), 512).unwrap();
        Fixture { store, engine, ask }
    }

    fn request(scope: &str, mode: Option<&str>, section: Option<&str>) -> AskRequest {
        AskRequest {
            scope: scope.to_string(),
            mode: mode.map(str::to_string),
            section_id: section.map(str::to_string),
            session_id: None,
            message: "What should I know?".to_string(),
        }
    }

    fn seed_policy(store: &DocumentStore, id: &str, order: i64) {
        PolicyService::new(store)
            .unwrap()
            .create(PolicySectionCreate {
                section_id: id.to_string(),
                title: format!("Title {}", id),
                content: format!("Body {}", id),
                order,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn employee_scope_with_empty_kb_answers_fallback_without_engine() {
        let f = fixture();
        let res = f.ask.ask(request("employee", None, None)).await.unwrap();
        assert_eq!(res.scope, Scope::Employee);
        assert_eq!(res.mode_used, None);
        assert_eq!(res.answer, HELPDESK_FALLBACK);
        assert!(f.engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn employee_scope_uses_helpdesk_template() {
        let f = fixture();
        KnowledgeBaseService::new(&f.store)
            .unwrap()
            .create(KnowledgeBaseCreate {
                title: "Holidays".to_string(),
                content: "12 public holidays".to_string(),
                effective_from: None,
            })
            .unwrap();
        let res = f.ask.ask(request("employee", None, None)).await.unwrap();
        assert_eq!(res.answer, "echo: Document: Holidays\n12 public holidays\n");
        let calls = f.engine.calls.lock().unwrap();
        assert_eq!(calls[0].1, PromptTemplate::Helpdesk);
        assert_eq!(calls[0].2, 512);
    }

    #[tokio::test]
    async fn onboarding_global_with_empty_corpus_fails_loud() {
        let f = fixture();
        assert!(matches!(
            f.ask.ask(request("onboarding", None, None)).await,
            Err(HrError::EmptyCorpus(_))
        ));
    }

    #[tokio::test]
    async fn auto_with_section_runs_guided() {
        let f = fixture();
        seed_policy(&f.store, "leave", 3);
        let res = f
            .ask
            .ask(request("onboarding", Some("auto"), Some("leave")))
            .await
            .unwrap();
        assert_eq!(res.mode_used.as_deref(), Some("guided"));
        assert_eq!(res.answer, "echo: Section 3: Title leave\n\nBody leave");
    }

    #[tokio::test]
    async fn session_id_selects_onboarding_template() {
        let f = fixture();
        seed_policy(&f.store, "payroll", 6);
        let mut req = request("onboarding", Some("guided"), Some("payroll"));
        req.session_id = Some("sess-77".to_string());
        f.ask.ask(req).await.unwrap();
        let calls = f.engine.calls.lock().unwrap();
        assert_eq!(
            calls[0].1,
            PromptTemplate::OnboardingSession {
                session_id: "sess-77".to_string(),
                current_step: 6,
                policy_id: "payroll".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn global_context_is_ordered() {
        let f = fixture();
        seed_policy(&f.store, "b", 2);
        seed_policy(&f.store, "a", 1);
        let res = f.ask.ask(request("onboarding", Some("global"), None)).await.unwrap();
        assert_eq!(
            res.answer,
            "echo: Section 1: Title a\nBody a\n\nSection 2: Title b\nBody b\n"
        );
    }
}

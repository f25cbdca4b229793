//! Context assembly: turns a resolved [`AskTarget`] into the text blob injected into the
//! system prompt.
//!
//! Onboarding corpora fail loud (`NotFound` / `EmptyCorpus`); the helpdesk fallback for an
//! empty knowledge base is applied by the ask service, not here.

use crate::ask::{AskTarget, OnboardingMode};
use crate::error::{HrError, HrResult};
use crate::models::knowledge_base::KnowledgeBaseDocument;
use crate::models::policy::PolicySection;
use crate::store::Collection;

/// Read access to policy sections.
pub trait PolicyCorpus: Send + Sync {
    fn section(&self, section_id: &str) -> HrResult<Option<PolicySection>>;

    /// All sections, ascending by `order`.
    fn sections_by_order(&self) -> HrResult<Vec<PolicySection>>;
}

/// Read access to helpdesk documents.
pub trait KnowledgeCorpus: Send + Sync {
    /// All documents, ascending by title.
    fn documents_by_title(&self) -> HrResult<Vec<KnowledgeBaseDocument>>;
}

impl PolicyCorpus for Collection<PolicySection> {
    fn section(&self, section_id: &str) -> HrResult<Option<PolicySection>> {
        Ok(self.find_one(section_id)?)
    }

    fn sections_by_order(&self) -> HrResult<Vec<PolicySection>> {
        Ok(self.find_sorted(|_| true, |s| s.order)?)
    }
}

impl KnowledgeCorpus for Collection<KnowledgeBaseDocument> {
    fn documents_by_title(&self) -> HrResult<Vec<KnowledgeBaseDocument>> {
        // Ties broken by id so equal titles still come out in a stable order.
        Ok(self.find_sorted(|_| true, |d| (d.title.clone(), d.id.clone()))?)
    }
}

pub fn format_guided(section: &PolicySection) -> String {
    format!(
        "Section {}: {}\n\n{}",
        section.order, section.title, section.content
    )
}

pub fn format_global(sections: &[PolicySection]) -> String {
    sections
        .iter()
        .map(|s| format!("Section {}: {}\n{}\n", s.order, s.title, s.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_helpdesk(documents: &[KnowledgeBaseDocument]) -> String {
    documents
        .iter()
        .map(|d| format!("Document: {}\n{}\n", d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct ContextAssembler<'a> {
    policies: &'a dyn PolicyCorpus,
    knowledge: &'a dyn KnowledgeCorpus,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(policies: &'a dyn PolicyCorpus, knowledge: &'a dyn KnowledgeCorpus) -> Self {
        Self {
            policies,
            knowledge,
        }
    }

    pub fn assemble(&self, target: &AskTarget) -> HrResult<String> {
        match target {
            AskTarget::Onboarding(OnboardingMode::Guided { section_id }) => {
                let section = self.policies.section(section_id)?.ok_or_else(|| {
                    HrError::NotFound(format!("Policy section '{}' not found", section_id))
                })?;
                Ok(format_guided(&section))
            }
            AskTarget::Onboarding(OnboardingMode::Global) => {
                let sections = self.policies.sections_by_order()?;
                if sections.is_empty() {
                    return Err(HrError::EmptyCorpus(
                        "No policy sections found. Please add policies first.".to_string(),
                    ));
                }
                Ok(format_global(&sections))
            }
            AskTarget::Helpdesk => {
                let documents = self.knowledge.documents_by_title()?;
                if documents.is_empty() {
                    return Err(HrError::EmptyCorpus(
                        "No knowledge base documents found.".to_string(),
                    ));
                }
                Ok(format_helpdesk(&documents))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory corpora for unit tests.

    use super::*;
    use crate::store::StoreError;
    use chrono::{TimeZone, Utc};

    pub struct FakePolicies {
        sections: Vec<PolicySection>,
        fail: bool,
    }

    impl FakePolicies {
        /// `(order, section_id, title, content)` rows, kept in the given order.
        pub fn with(rows: &[(u32, &str, &str, &str)]) -> Self {
            let sections = rows
                .iter()
                .map(|(order, id, title, content)| PolicySection {
                    section_id: id.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                    order: *order,
                    updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                })
                .collect();
            Self {
                sections,
                fail: false,
            }
        }

        /// Every lookup errors; proves a code path never touched storage.
        pub fn failing() -> Self {
            Self {
                sections: Vec::new(),
                fail: true,
            }
        }

        fn check(&self) -> HrResult<()> {
            if self.fail {
                return Err(StoreError::UnknownIndex("fake".to_string()).into());
            }
            Ok(())
        }
    }

    impl PolicyCorpus for FakePolicies {
        fn section(&self, section_id: &str) -> HrResult<Option<PolicySection>> {
            self.check()?;
            Ok(self
                .sections
                .iter()
                .find(|s| s.section_id == section_id)
                .cloned())
        }

        fn sections_by_order(&self) -> HrResult<Vec<PolicySection>> {
            self.check()?;
            let mut out = self.sections.clone();
            out.sort_by_key(|s| s.order);
            Ok(out)
        }
    }

    pub struct FakeKnowledge(pub Vec<KnowledgeBaseDocument>);

    impl FakeKnowledge {
        pub fn with(rows: &[(&str, &str)]) -> Self {
            let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
            Self(
                rows.iter()
                    .enumerate()
                    .map(|(i, (title, content))| KnowledgeBaseDocument {
                        id: format!("doc-{}", i),
                        title: title.to_string(),
                        content: content.to_string(),
                        effective_from: at,
                        created_at: at,
                        updated_at: at,
                    })
                    .collect(),
            )
        }
    }

    impl KnowledgeCorpus for FakeKnowledge {
        fn documents_by_title(&self) -> HrResult<Vec<KnowledgeBaseDocument>> {
            let mut out = self.0.clone();
            out.sort_by(|a, b| a.title.cmp(&b.title));
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeKnowledge, FakePolicies};
    use super::*;

    fn guided(id: &str) -> AskTarget {
        AskTarget::Onboarding(OnboardingMode::Guided {
            section_id: id.to_string(),
        })
    }

    #[test]
    fn guided_context_format() {
        let policies = FakePolicies::with(&[(3, "leave", "Leave Policy", "20 days")]);
        let kb = FakeKnowledge::with(&[]);
        let ctx = ContextAssembler::new(&policies, &kb)
            .assemble(&guided("leave"))
            .unwrap();
        assert_eq!(ctx, "Section 3: Leave Policy\n\n20 days");
    }

    #[test]
    fn guided_missing_section_is_not_found() {
        let policies = FakePolicies::with(&[]);
        let kb = FakeKnowledge::with(&[]);
        assert!(matches!(
            ContextAssembler::new(&policies, &kb).assemble(&guided("leave")),
            Err(HrError::NotFound(_))
        ));
    }

    #[test]
    fn global_context_sorted_by_order_regardless_of_insertion() {
        let policies = FakePolicies::with(&[(2, "b", "B", "y"), (1, "a", "A", "x")]);
        let kb = FakeKnowledge::with(&[]);
        let ctx = ContextAssembler::new(&policies, &kb)
            .assemble(&AskTarget::Onboarding(OnboardingMode::Global))
            .unwrap();
        assert_eq!(ctx, "Section 1: A\nx\n\nSection 2: B\ny\n");
    }

    #[test]
    fn global_empty_corpus_fails_loud() {
        let policies = FakePolicies::with(&[]);
        let kb = FakeKnowledge::with(&[]);
        assert!(matches!(
            ContextAssembler::new(&policies, &kb)
                .assemble(&AskTarget::Onboarding(OnboardingMode::Global)),
            Err(HrError::EmptyCorpus(_))
        ));
    }

    #[test]
    fn helpdesk_context_sorted_by_title() {
        let policies = FakePolicies::failing();
        let kb = FakeKnowledge::with(&[("Payroll", "Paid on the 1st"), ("Insurance", "Family floater")]);
        let ctx = ContextAssembler::new(&policies, &kb)
            .assemble(&AskTarget::Helpdesk)
            .unwrap();
        assert_eq!(
            ctx,
            "Document: Insurance\nFamily floater\n\nDocument: Payroll\nPaid on the 1st\n"
        );
    }

    #[test]
    fn helpdesk_empty_corpus_is_reported() {
        let policies = FakePolicies::with(&[]);
        let kb = FakeKnowledge::with(&[]);
        assert!(matches!(
            ContextAssembler::new(&policies, &kb).assemble(&AskTarget::Helpdesk),
            Err(HrError::EmptyCorpus(_))
        ));
    }
}

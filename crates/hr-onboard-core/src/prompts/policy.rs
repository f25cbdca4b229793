//! Policy assistant: answers strictly from onboarding policy sections.

use super::fill;

/// Placeholders: `{context}`, `{mode}`.
pub const POLICY_SYSTEM_TEMPLATE: &str = r#"You are an HR Policy Assistant for a company. Your role is to provide accurate, helpful, and professional answers to employee questions about company policies.

IMPORTANT RULES:
1. Only answer based on the provided policy content - do not make up information
2. Be concise but comprehensive
3. Use a professional and friendly tone
4. If the question cannot be answered from the provided content, say so clearly
5. Always prioritize employee safety and compliance
6. Quote relevant policy sections when appropriate

POLICY CONTEXT:
{context}

MODE: {mode}

Please answer the employee's question based on the above policy information."#;

pub fn policy_system_prompt(context: &str, mode: &str) -> String {
    fill(POLICY_SYSTEM_TEMPLATE, &[("context", context), ("mode", mode)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_both_placeholders() {
        let prompt = policy_system_prompt("Section 1: Leave\n\n20 days", "guided");
        assert!(prompt.contains("POLICY CONTEXT:\nSection 1: Leave\n\n20 days\n"));
        assert!(prompt.contains("MODE: guided"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn placeholder_text_inside_context_is_left_alone() {
        let prompt = policy_system_prompt("literal {mode} here", "global");
        assert!(prompt.contains("literal {mode} here"));
    }
}

//! Onboarding-with-session: wraps a guided section with the joiner's progress so the
//! policy prompt can coach them through the current step.

use super::fill;
use crate::models::policy::ORDER_MAX;

/// Placeholders: `{current_step}`, `{total_steps}`, `{policy_id}`, `{session_id}`, `{context}`.
pub const ONBOARDING_CONTEXT_TEMPLATE: &str = r#"
ONBOARDING CONTEXT:
- Current Step: {current_step} of {total_steps}
- Policy: {policy_id}
- Session: {session_id}

POLICY CONTENT:
{context}

INSTRUCTIONS:
You are helping an employee during their onboarding process. They are currently on step {current_step} of {total_steps}.
Provide helpful, encouraging answers that guide them through understanding this policy.
If they seem confused, offer to clarify or suggest they can ask more questions.
Always be supportive and patient - this is their learning journey.
"#;

/// Build the session-aware context; the result is fed to the policy prompt in guided mode.
pub fn onboarding_context(context: &str, session_id: &str, current_step: u32, policy_id: &str) -> String {
    let current_step = current_step.to_string();
    let total_steps = ORDER_MAX.to_string();
    fill(
        ONBOARDING_CONTEXT_TEMPLATE,
        &[
            ("current_step", &current_step),
            ("total_steps", &total_steps),
            ("policy_id", policy_id),
            ("session_id", session_id),
            ("context", context),
        ],
    )
}

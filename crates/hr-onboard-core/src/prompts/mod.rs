//! System-prompt templates for the policy assistant and the employee helpdesk.

pub mod helpdesk;
pub mod onboarding;
pub mod policy;

pub use helpdesk::{helpdesk_system_prompt, HELPDESK_SYSTEM_TEMPLATE};
pub use onboarding::{onboarding_context, ONBOARDING_CONTEXT_TEMPLATE};
pub use policy::{policy_system_prompt, POLICY_SYSTEM_TEMPLATE};

/// Substitute `{key}` placeholders in one pass. Substituted values are never rescanned, so
/// caller text that looks like a placeholder stays literal. Unknown `{...}` is kept as is.
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_does_not_rescan_values() {
        let out = fill("a={a} b={b} {other}", &[("a", "{b}"), ("b", "two")]);
        assert_eq!(out, "a={b} b=two {other}");
    }

    #[test]
    fn fill_keeps_unbalanced_braces() {
        assert_eq!(fill("{ {x", &[("x", "1")]), "{ {x");
    }
}

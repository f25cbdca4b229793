//! Ask request validation: scope, mode and section resolution.
//!
//! Rules, applied in this order after case normalization (blank strings count as unset):
//!
//! 1. `scope` must be `onboarding` or `employee`.
//! 2. `employee` scope takes no `mode`, `section_id` or `session_id`.
//! 3. `onboarding` scope without a mode runs in `global`.
//! 4. `auto` becomes `guided` when a `section_id` is given, else `global`.
//! 5. `global` takes no `section_id`.
//! 6. `guided` needs a `section_id` naming an existing section.
//!
//! Rules 1–5 are pure ([`resolve_target`]); rule 6 is the only lookup ([`validate_ask`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::PolicyCorpus;
use crate::error::{HrError, HrResult};
use crate::models::check_len;

pub const MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Onboarding,
    Employee,
}

impl Scope {
    pub fn parse(raw: &str) -> HrResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "onboarding" => Ok(Scope::Onboarding),
            "employee" => Ok(Scope::Employee),
            _ => Err(HrError::InvalidScope(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Onboarding => "onboarding",
            Scope::Employee => "employee",
        }
    }
}

/// Mode as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Guided,
    Global,
    Auto,
}

impl Mode {
    pub fn parse(raw: &str) -> HrResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "guided" => Ok(Mode::Guided),
            "global" => Ok(Mode::Global),
            "auto" => Ok(Mode::Auto),
            _ => Err(HrError::InvalidMode(raw.to_string())),
        }
    }
}

/// Mode after `auto` resolution; guided always carries its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingMode {
    Guided { section_id: String },
    Global,
}

impl OnboardingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingMode::Guided { .. } => "guided",
            OnboardingMode::Global => "global",
        }
    }
}

/// Which corpus grounds the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskTarget {
    Helpdesk,
    Onboarding(OnboardingMode),
}

impl AskTarget {
    pub fn scope(&self) -> Scope {
        match self {
            AskTarget::Helpdesk => Scope::Employee,
            AskTarget::Onboarding(_) => Scope::Onboarding,
        }
    }

    pub fn mode_used(&self) -> Option<&'static str> {
        match self {
            AskTarget::Helpdesk => None,
            AskTarget::Onboarding(mode) => Some(mode.as_str()),
        }
    }
}

fn default_scope() -> String {
    "onboarding".to_string()
}

/// Body of `POST /api/ask`, kept raw so that [`validate_ask`] owns every rule.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    /// Onboarding session marker; selects the session-aware prompt in guided mode.
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

/// A request that passed every rule, ready for context assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAsk {
    pub target: AskTarget,
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub scope: Scope,
    /// Resolved onboarding mode; absent for the helpdesk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_used: Option<String>,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Rules 1–5 plus the presence half of rule 6. No I/O.
pub fn resolve_target(
    scope: &str,
    mode: Option<&str>,
    section_id: Option<&str>,
) -> HrResult<AskTarget> {
    let scope = Scope::parse(scope)?;
    let mode = present(mode);
    let section_id = present(section_id);

    if scope == Scope::Employee {
        if mode.is_some() {
            return Err(HrError::InapplicableField {
                field: "mode",
                context: "employee scope",
            });
        }
        if section_id.is_some() {
            return Err(HrError::InapplicableField {
                field: "section_id",
                context: "employee scope",
            });
        }
        return Ok(AskTarget::Helpdesk);
    }

    let requested = match mode {
        Some(raw) => Mode::parse(raw)?,
        None => Mode::Global,
    };
    let resolved = match requested {
        Mode::Auto if section_id.is_some() => Mode::Guided,
        Mode::Auto => Mode::Global,
        other => other,
    };

    match resolved {
        Mode::Global => {
            if section_id.is_some() {
                return Err(HrError::InapplicableField {
                    field: "section_id",
                    context: "global mode",
                });
            }
            Ok(AskTarget::Onboarding(OnboardingMode::Global))
        }
        _ => match section_id {
            Some(id) => Ok(AskTarget::Onboarding(OnboardingMode::Guided {
                section_id: id.to_string(),
            })),
            None => Err(HrError::NotFound(
                "Guided mode requires a section_id".to_string(),
            )),
        },
    }
}

/// Full validation of an ask request. The guided-section existence check is the only
/// storage access and runs after every pure rule has passed.
pub fn validate_ask(request: &AskRequest, policies: &dyn PolicyCorpus) -> HrResult<ValidatedAsk> {
    let target = resolve_target(
        &request.scope,
        request.mode.as_deref(),
        request.section_id.as_deref(),
    )?;

    let session_id = present(request.session_id.as_deref()).map(str::to_string);
    if target == AskTarget::Helpdesk && session_id.is_some() {
        return Err(HrError::InapplicableField {
            field: "session_id",
            context: "employee scope",
        });
    }

    check_len("message", &request.message, 1, MESSAGE_MAX)?;

    if let AskTarget::Onboarding(OnboardingMode::Guided { section_id }) = &target {
        if policies.section(section_id)?.is_none() {
            return Err(HrError::NotFound(format!(
                "Policy section '{}' not found",
                section_id
            )));
        }
    }

    Ok(ValidatedAsk {
        target,
        message: request.message.clone(),
        session_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::FakePolicies;

    fn guided(id: &str) -> AskTarget {
        AskTarget::Onboarding(OnboardingMode::Guided {
            section_id: id.to_string(),
        })
    }

    const GLOBAL: AskTarget = AskTarget::Onboarding(OnboardingMode::Global);

    #[test]
    fn unknown_scope_is_rejected_first() {
        assert!(matches!(
            resolve_target("payroll", Some("guided"), Some("x")),
            Err(HrError::InvalidScope(_))
        ));
    }

    #[test]
    fn scope_and_mode_are_case_insensitive() {
        assert_eq!(resolve_target("EMPLOYEE", None, None).unwrap(), AskTarget::Helpdesk);
        assert_eq!(
            resolve_target("Onboarding", Some("GUIDED"), Some("leave")).unwrap(),
            guided("leave")
        );
    }

    #[test]
    fn employee_scope_rejects_mode_and_section() {
        assert!(matches!(
            resolve_target("employee", Some("global"), None),
            Err(HrError::InapplicableField { field: "mode", .. })
        ));
        assert!(matches!(
            resolve_target("employee", None, Some("leave")),
            Err(HrError::InapplicableField { field: "section_id", .. })
        ));
        // Even an unrecognised mode is "not applicable" before it is "invalid".
        assert!(matches!(
            resolve_target("employee", Some("bogus"), None),
            Err(HrError::InapplicableField { field: "mode", .. })
        ));
    }

    #[test]
    fn onboarding_defaults_to_global() {
        assert_eq!(resolve_target("onboarding", None, None).unwrap(), GLOBAL);
        assert_eq!(resolve_target("onboarding", Some("  "), None).unwrap(), GLOBAL);
    }

    #[test]
    fn auto_resolves_on_section_presence() {
        assert_eq!(
            resolve_target("onboarding", Some("auto"), Some("leave")).unwrap(),
            guided("leave")
        );
        assert_eq!(resolve_target("onboarding", Some("auto"), None).unwrap(), GLOBAL);
        assert_eq!(resolve_target("onboarding", Some("auto"), Some("")).unwrap(), GLOBAL);
    }

    #[test]
    fn global_rejects_section() {
        assert!(matches!(
            resolve_target("onboarding", Some("global"), Some("leave")),
            Err(HrError::InapplicableField { field: "section_id", context: "global mode" })
        ));
        // Default mode is global too.
        assert!(matches!(
            resolve_target("onboarding", None, Some("leave")),
            Err(HrError::InapplicableField { field: "section_id", .. })
        ));
    }

    #[test]
    fn guided_without_section_is_not_found() {
        assert!(matches!(
            resolve_target("onboarding", Some("guided"), None),
            Err(HrError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(matches!(
            resolve_target("onboarding", Some("freestyle"), None),
            Err(HrError::InvalidMode(_))
        ));
    }

    fn request(scope: &str, mode: Option<&str>, section: Option<&str>) -> AskRequest {
        AskRequest {
            scope: scope.to_string(),
            mode: mode.map(str::to_string),
            section_id: section.map(str::to_string),
            session_id: None,
            message: "How many leave days do I get?".to_string(),
        }
    }

    #[test]
    fn guided_section_must_exist() {
        let corpus = FakePolicies::with(&[(3, "leave", "Leave Policy", "20 days")]);
        let ok = validate_ask(&request("onboarding", Some("guided"), Some("leave")), &corpus).unwrap();
        assert_eq!(ok.target, guided("leave"));

        assert!(matches!(
            validate_ask(&request("onboarding", Some("guided"), Some("travel")), &corpus),
            Err(HrError::NotFound(_))
        ));
    }

    #[test]
    fn pure_rules_fail_before_lookup() {
        let corpus = FakePolicies::failing();
        assert!(matches!(
            validate_ask(&request("onboarding", Some("global"), Some("leave")), &corpus),
            Err(HrError::InapplicableField { .. })
        ));
        let mut long = request("onboarding", Some("guided"), Some("leave"));
        long.message = "x".repeat(MESSAGE_MAX + 1);
        assert!(matches!(validate_ask(&long, &corpus), Err(HrError::Validation { .. })));
    }

    #[test]
    fn session_id_not_applicable_to_employee_scope() {
        let corpus = FakePolicies::with(&[]);
        let mut req = request("employee", None, None);
        req.session_id = Some("sess-1".to_string());
        assert!(matches!(
            validate_ask(&req, &corpus),
            Err(HrError::InapplicableField { field: "session_id", .. })
        ));
    }

    #[test]
    fn scope_defaults_to_onboarding_when_omitted() {
        let req: AskRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(req.scope, "onboarding");
    }
}

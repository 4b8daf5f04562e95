use super::{push_unique, RedFlag};
use crate::clinical::Complexity;
use crate::policy::ScreeningPolicy;
use serde::{Deserialize, Serialize};

/// Recommended shape of the first appointment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub recommended_minutes: u32,
    pub justification: String,
    pub assessment_priorities: Vec<String>,
}

/// Build the session plan: the complexity template's priorities, then one per detected flag that
/// names an assessment, then the policy's closing priorities.
pub fn plan_session(
    policy: &ScreeningPolicy,
    flags: &[RedFlag],
    complexity: Complexity,
) -> SessionPlan {
    let mut assessment_priorities = Vec::new();

    let (recommended_minutes, justification) = match policy.session_templates.get(&complexity) {
        Some(template) => {
            for priority in &template.priorities {
                push_unique(&mut assessment_priorities, priority);
            }
            (template.minutes, template.justification.clone())
        }
        // Validated policies always carry a template per complexity.
        None => (0, String::new()),
    };

    for flag in flags {
        if let Some(priority) = policy
            .red_flag(flag.kind)
            .and_then(|rule| rule.assessment_priority.as_deref())
        {
            push_unique(&mut assessment_priorities, priority);
        }
    }

    for priority in &policy.closing_priorities {
        push_unique(&mut assessment_priorities, priority);
    }

    SessionPlan {
        recommended_minutes,
        justification,
        assessment_priorities,
    }
}

use super::{push_unique, RedFlag};
use crate::policy::ScreeningPolicy;
use crate::screening::ScreeningInput;

/// Questions staff should ask at the first appointment.
///
/// Flag-specific questions come first, in red-flag priority order. A question is skipped when the
/// patient already answered it in one of the free-text fields the policy names. The consent
/// confirmation follows when consent was not given, then the baseline questions. Duplicates are
/// dropped, keeping the first occurrence.
pub fn generate_follow_ups(
    policy: &ScreeningPolicy,
    flags: &[RedFlag],
    input: &ScreeningInput,
) -> Vec<String> {
    let mut questions = Vec::new();

    for flag in flags {
        let Some(follow_up) = policy
            .red_flag(flag.kind)
            .and_then(|rule| rule.follow_up.as_ref())
        else {
            continue;
        };

        let already_answered = follow_up
            .unless_context
            .iter()
            .any(|field| input.has_context(*field));
        if !already_answered {
            push_unique(&mut questions, &follow_up.question);
        }
    }

    if !input.consent_given {
        push_unique(&mut questions, &policy.consent_question);
    }

    for question in &policy.baseline_questions {
        push_unique(&mut questions, question);
    }

    questions
}

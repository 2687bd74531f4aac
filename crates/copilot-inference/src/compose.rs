//! Prompt composition.

use copilot_core::TaskKind;

use crate::tasks::{task_spec, PromptWrapping};

/// Label that introduces the appended trend block.
pub const TRENDS_LABEL: &str = "Trends Data:";

/// Merge the idea text with optional trend context into the user prompt for `task`.
///
/// Pure and deterministic. Trend text is appended only for trend-enriched
/// tasks and only when it is non-empty, so `Some("")` and `None` compose the
/// same prompt. Callers must not pass a no-data trend message here.
pub fn compose(task: TaskKind, idea: &str, trend_summary: Option<&str>) -> String {
    let spec = task_spec(task);

    let mut prompt = match spec.wrapping {
        PromptWrapping::Verbatim => idea.to_string(),
        PromptWrapping::Template(template) => template.replace("{idea}", idea),
    };

    if spec.trend_enriched {
        if let Some(trends) = trend_summary.filter(|t| !t.is_empty()) {
            prompt.push_str("\n\n");
            prompt.push_str(TRENDS_LABEL);
            prompt.push('\n');
            prompt.push_str(trends);
        }
    }

    prompt
}

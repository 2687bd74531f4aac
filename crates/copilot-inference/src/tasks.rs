//! Per-task behavior as one declarative table.
//!
//! Every task differs only in data: its system instruction, whether trend
//! data is appended to the prompt, how the idea text is wrapped, how long the
//! hosted call may run, and the labels used when the result is saved or
//! reported. One generation routine consumes this table.

use copilot_core::{defaults, TaskKind};

/// How the idea text is turned into the user prompt before trend data is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptWrapping {
    /// Idea text used as-is.
    Verbatim,
    /// Idea text substituted into a fixed template at `{idea}`.
    Template(&'static str),
}

/// Static description of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub system_prompt: &'static str,
    /// Whether a trend summary is appended to the prompt.
    pub trend_enriched: bool,
    pub wrapping: PromptWrapping,
    /// Upper bound on the hosted generation call.
    pub timeout_secs: u64,
    /// Title of the note created when the result is saved.
    pub note_title: &'static str,
    /// Status line reported after a successful run.
    pub completion_message: &'static str,
}

const WORKFLOW_PROMPT: &str = "You are an expert workflow automation engineer. \
Turn the user's startup idea into a concrete, automatable workflow. \
Start your answer with the heading '## Workflow'. List the trigger, then each step \
in order with the tool or service that performs it, the data passed between steps, \
and where a human needs to approve or intervene. Finish with the integrations required \
and the metrics that show the workflow is working. Use Markdown.";

const VALIDATION_PROMPT: &str = "You are a startup analyst who validates early-stage ideas. \
Assess the user's idea for problem severity, target customer, market size, competition, \
differentiation and risks. When Google Trends data is provided, use it as evidence of \
demand and say whether interest is rising, flat or falling. End with a verdict \
(pursue, pivot or drop) and the three cheapest experiments that would validate the idea. \
Use Markdown headings.";

const BUSINESS_CASE_PROMPT: &str = "You are a business consultant preparing a business case. \
For the user's concept, cover the value proposition, customer segments, revenue model, \
cost structure, key resources and partners, a rough three-year financial outlook with \
stated assumptions, and the main risks with mitigations. Be specific and quantitative \
where the input allows. Use Markdown headings.";

const PITCH_DECK_PROMPT: &str = "You are a pitch deck expert who has helped startups raise \
seed and Series A rounds. Produce a slide-by-slide outline for the user's startup: \
title, problem, solution, market opportunity, product, business model, traction, \
competition, go-to-market, team, financials and the ask. When Google Trends data is \
provided, use it on the market slide. Give each slide a heading and three to five bullets.";

const GTM_PROMPT: &str = "You are a startup go-to-market strategist. Define the ideal \
customer profile, positioning and messaging, pricing, acquisition channels ranked by \
expected cost and speed, a 90-day launch plan with weekly milestones, and the metrics \
to track. When Google Trends data is provided, use it to time the launch and pick \
keywords. Use Markdown headings.";

const GTM_TEMPLATE: &str = "Generate a detailed Go-To-Market strategy for the prompt'{idea}'.";

/// The task table, in [`TaskKind::ALL`] order.
pub const TASKS: [TaskSpec; 5] = [
    TaskSpec {
        kind: TaskKind::Workflow,
        system_prompt: WORKFLOW_PROMPT,
        trend_enriched: false,
        wrapping: PromptWrapping::Verbatim,
        timeout_secs: defaults::WORKFLOW_GEN_TIMEOUT_SECS,
        note_title: "Generated Workflow",
        completion_message: "Workflow generated",
    },
    TaskSpec {
        kind: TaskKind::ValidateIdea,
        system_prompt: VALIDATION_PROMPT,
        trend_enriched: true,
        wrapping: PromptWrapping::Verbatim,
        timeout_secs: defaults::GEN_TIMEOUT_SECS,
        note_title: "Idea Validation",
        completion_message: "Validation complete",
    },
    TaskSpec {
        kind: TaskKind::BusinessCase,
        system_prompt: BUSINESS_CASE_PROMPT,
        trend_enriched: false,
        wrapping: PromptWrapping::Verbatim,
        timeout_secs: defaults::GEN_TIMEOUT_SECS,
        note_title: "Business Case",
        completion_message: "Analysis ready",
    },
    TaskSpec {
        kind: TaskKind::PitchDeck,
        system_prompt: PITCH_DECK_PROMPT,
        trend_enriched: true,
        wrapping: PromptWrapping::Verbatim,
        timeout_secs: defaults::GEN_TIMEOUT_SECS,
        note_title: "Pitch Deck",
        completion_message: "Pitch deck created",
    },
    TaskSpec {
        kind: TaskKind::GtmStrategy,
        system_prompt: GTM_PROMPT,
        trend_enriched: true,
        wrapping: PromptWrapping::Template(GTM_TEMPLATE),
        timeout_secs: defaults::GEN_TIMEOUT_SECS,
        note_title: "GTM Strategy",
        completion_message: "GTM strategy created",
    },
];

/// Look up the table entry for a task.
pub fn task_spec(kind: TaskKind) -> &'static TaskSpec {
    match kind {
        TaskKind::Workflow => &TASKS[0],
        TaskKind::ValidateIdea => &TASKS[1],
        TaskKind::BusinessCase => &TASKS[2],
        TaskKind::PitchDeck => &TASKS[3],
        TaskKind::GtmStrategy => &TASKS[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_order_matches_task_kinds() {
        for (spec, kind) in TASKS.iter().zip(TaskKind::ALL) {
            assert_eq!(spec.kind, kind);
            assert_eq!(task_spec(kind).kind, kind);
        }
    }

    #[test]
    fn test_enrichment_flags() {
        assert!(!task_spec(TaskKind::Workflow).trend_enriched);
        assert!(task_spec(TaskKind::ValidateIdea).trend_enriched);
        assert!(!task_spec(TaskKind::BusinessCase).trend_enriched);
        assert!(task_spec(TaskKind::PitchDeck).trend_enriched);
        assert!(task_spec(TaskKind::GtmStrategy).trend_enriched);
    }

    #[test]
    fn test_only_gtm_wraps_the_idea() {
        for spec in TASKS {
            match spec.kind {
                TaskKind::GtmStrategy => {
                    assert!(matches!(spec.wrapping, PromptWrapping::Template(t) if t.contains("{idea}")))
                }
                _ => assert_eq!(spec.wrapping, PromptWrapping::Verbatim),
            }
        }
    }

    #[test]
    fn test_system_prompts_are_distinct() {
        let prompts: HashSet<&str> = TASKS.iter().map(|t| t.system_prompt).collect();
        assert_eq!(prompts.len(), TASKS.len());
    }

    #[test]
    fn test_workflow_has_longest_time_limit() {
        assert_eq!(task_spec(TaskKind::Workflow).timeout_secs, 600);
        for spec in TASKS.iter().filter(|t| t.kind != TaskKind::Workflow) {
            assert_eq!(spec.timeout_secs, 300);
        }
    }

    #[test]
    fn test_note_titles() {
        assert_eq!(task_spec(TaskKind::Workflow).note_title, "Generated Workflow");
        assert_eq!(task_spec(TaskKind::GtmStrategy).note_title, "GTM Strategy");
    }
}

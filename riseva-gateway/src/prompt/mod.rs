//! System-prompt compilation.
//!
//! [`compile_system_prompt`] turns a [`UnitConfig`] plus unit/course names
//! into the single natural-language instruction document sent as the model's
//! system message. It is pure and total: deterministic for identical input,
//! no errors, no model-specific tokens. Every section has a safe placeholder
//! so a sparse configuration never produces an empty or malformed section.

mod directives;

pub use directives::{approach_directive, length_directive, scaffolding_directive, tone_directive};

use std::fmt::Write;

use riseva_core::UnitConfig;

/// Per-material character budget for the reference-materials section.
pub const MATERIAL_CHAR_BUDGET: usize = 8_000;

/// Notice appended when a material's content exceeds the budget.
pub const TRUNCATION_NOTICE: &str = "\n[Material truncated to fit the context budget]";

/// Placeholder when the teacher set no objectives.
pub const NO_OBJECTIVES_PLACEHOLDER: &str =
    "No specific objectives set; focus on general understanding.";

/// Sentence permitting general knowledge when no sources are restricted.
pub const GENERAL_KNOWLEDGE_SENTENCE: &str =
    "No reference sources are restricted; you may draw on general knowledge relevant to this unit.";

fn display_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() { "General" } else { trimmed }
}

/// Compile the teacher configuration into one system instruction document.
pub fn compile_system_prompt(config: &UnitConfig, unit_name: &str, course_name: &str) -> String {
    let unit = display_name(unit_name);
    let course = display_name(course_name);

    let mut prompt = String::new();

    // Identity and unit framing
    let _ = writeln!(
        prompt,
        "You are Riseva, an AI tutor for the course \"{course}\" configured by the teacher. You are currently helping a student with the unit: \"{unit}\"."
    );

    let _ = writeln!(prompt, "\n## Your Teaching Approach");
    let _ = writeln!(prompt, "{}", approach_directive(config.approach));

    let _ = writeln!(prompt, "\n## Tone");
    let _ = writeln!(prompt, "{}", tone_directive(config.tone));

    let _ = writeln!(prompt, "\n## Response Length");
    let _ = writeln!(prompt, "{}", length_directive(config.response_length));

    let _ = writeln!(prompt, "\n## Scaffolding");
    let _ = writeln!(prompt, "{}", scaffolding_directive(config.scaffolding));
    let _ = writeln!(
        prompt,
        "After {} failed attempts on the same concept, provide a more guided explanation, but still avoid giving the final answer directly.",
        config.max_hints
    );

    let _ = writeln!(prompt, "\n## Learning Objectives for This Unit");
    if config.objectives.is_empty() {
        let _ = writeln!(prompt, "{NO_OBJECTIVES_PLACEHOLDER}");
    } else {
        for objective in &config.objectives {
            let _ = writeln!(prompt, "- [{}] {}", objective.depth, objective.text);
        }
        let _ = writeln!(
            prompt,
            "\nYour goal is to help the student achieve mastery of ALL these objectives. Track which ones the student seems to understand and which they're struggling with."
        );
    }

    // Only enabled entries reach the model; an all-disabled list renders
    // nothing under the heading, which is accepted.
    let _ = writeln!(prompt, "\n## Strict Boundaries (YOU MUST FOLLOW THESE)");
    for boundary in config.enabled_boundaries() {
        let _ = writeln!(prompt, "- {}", boundary.label);
    }

    let _ = writeln!(prompt, "\n## Allowed Capabilities");
    for capability in config.enabled_capabilities() {
        let _ = writeln!(prompt, "- {}", capability.label);
    }

    let _ = writeln!(prompt, "\n## Allowed Reference Sources");
    if config.allowed_sources.is_empty() {
        let _ = writeln!(prompt, "{GENERAL_KNOWLEDGE_SENTENCE}");
    } else {
        for source in &config.allowed_sources {
            let _ = writeln!(prompt, "- {source}");
        }
        let _ = writeln!(
            prompt,
            "Only reference material from these sources. If the student asks about content outside these sources, redirect them back to the unit material."
        );
    }

    if !config.materials.is_empty() {
        let _ = writeln!(prompt, "\n## Reference Materials");
        for material in &config.materials {
            let _ = writeln!(prompt, "\n### {}", material.name);
            let _ = writeln!(prompt, "{}", truncated_content(&material.content));
        }
    }

    let _ = writeln!(prompt, "\n## Important Instructions");
    let _ = writeln!(
        prompt,
        "- You are a tutor, not an answer machine. Guide the student toward understanding."
    );
    let _ = writeln!(
        prompt,
        "- Never give direct answers to graded work or test questions."
    );
    let _ = writeln!(
        prompt,
        "- After explaining a concept, ask a follow-up question to check understanding."
    );
    let _ = writeln!(
        prompt,
        "- If the student shows a misconception, address it directly but kindly."
    );
    let _ = writeln!(
        prompt,
        "- Keep track of the conversation flow and build on previous exchanges."
    );
    let _ = writeln!(
        prompt,
        "- Use markdown formatting: **bold** for key terms, *italics* for emphasis."
    );
    let _ = writeln!(
        prompt,
        "- When the student demonstrates understanding of a concept, acknowledge it clearly."
    );
    let _ = writeln!(
        prompt,
        "- If the student asks you to write their homework, complete an assignment, or give a direct answer to a test question, politely decline and redirect to learning."
    );
    let _ = write!(
        prompt,
        "- Stay within the scope of \"{unit}\" for \"{course}\"."
    );

    prompt
}

/// Material content clipped to the character budget, with a notice appended
/// only when clipping actually happened.
fn truncated_content(content: &str) -> String {
    if content.chars().count() <= MATERIAL_CHAR_BUDGET {
        return content.to_string();
    }
    let mut clipped: String = content.chars().take(MATERIAL_CHAR_BUDGET).collect();
    clipped.push_str(TRUNCATION_NOTICE);
    clipped
}

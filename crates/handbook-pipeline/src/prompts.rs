//! Prompt contracts for planning, section writing and document chat.
//!
//! The planner's output grammar and the writer's rules live here so both
//! sides of the contract stay in one place.

use handbook_core::GenerationPolicy;

/// Stated in the planning prompt when retrieval produced nothing.
pub const NO_CONTEXT_NOTE: &str = "(No supporting documents were provided.)";

/// System preamble for document chat.
pub const CHAT_SYSTEM_PREAMBLE: &str = "You are a helpful assistant. Answer based on the provided document context. If the context is insufficient, say so.";

/// Build the single planning prompt.
pub fn plan_prompt(instruction: &str, context: &str, policy: &GenerationPolicy) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT_NOTE
    } else {
        context
    };
    let example_words = (policy.section_words_min + policy.section_words_max) / 2;

    format!(
        r#"I need you to create a detailed outline for a comprehensive, professional handbook. The handbook MUST be at least {total} words. Each subtask will guide the writing of one section.

The writing instruction is as follows:

{instruction}

Here is context retrieved from the uploaded documents to inform your plan:

{context}

REQUIREMENTS:
- Create at least {min_tasks} subtasks (sections)
- Each section should target {min_words}-{max_words} words
- Include: Table of Contents, Executive Summary, Introduction, multiple detailed chapters, case studies, practical examples, best practices, future directions, conclusion, glossary, and references
- Be highly specific in each subtask description — give detailed content guidance

Format each subtask on its own line exactly like this:

Paragraph 1 - Main Point: [Detailed description of what to write] - Word Count: [target, e.g., {example} words]

Paragraph 2 - Main Point: [Detailed description of what to write] - Word Count: [target, e.g., {example} words]

...

Do not output any other content besides the subtask lines."#,
        total = policy.total_words,
        min_tasks = policy.min_tasks,
        min_words = policy.section_words_min,
        max_words = policy.section_words_max,
        example = example_words,
    )
}

/// Build the prompt for one section.
///
/// `plan` is the whole task list rendered as text, not just the remaining
/// tasks. `window` is the tail of the document (or the beginning marker).
pub fn section_prompt(
    instruction: &str,
    plan: &str,
    window: &str,
    step: &str,
    policy: &GenerationPolicy,
) -> String {
    format!(
        r#"You are an expert technical writer creating a comprehensive handbook. Write the assigned section with depth, detail, and substance. Use specific examples, data points, and thorough explanations.

Writing instruction:

{instruction}

Full writing plan:

{plan}

Already written text (last {window_words} words shown for context):

{window}

YOUR TASK: Write {step}

IMPORTANT RULES:
- You MUST write AT LEAST the word count specified in the step above (sections normally run {min_words}-{max_words} words)
- Include detailed explanations, examples, and analysis
- Use proper markdown formatting with headers (##, ###), bullet points, and emphasis where appropriate
- Only output the new section — do NOT repeat already written text
- Do NOT write a conclusion or wrap up the document unless this step is the conclusion — more sections will follow"#,
        window_words = policy.window_words,
        min_words = policy.section_words_min,
        max_words = policy.section_words_max,
    )
}

/// Build the document chat prompt.
pub fn chat_prompt(context: &str, question: &str) -> String {
    format!("Context from uploaded documents:\n{context}\n\nUser question: {question}")
}

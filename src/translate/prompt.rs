use crate::core::StringTable;
use crate::translate::placeholder::QUOTE_TOKEN;

const SYSTEM_PROMPT: &str = r#"You are an expert translator for software localization: user interfaces, error messages, business and technical text.

Rules:
- Preserve all formatting: HTML tags, Markdown, line breaks and spacing.
- Tokens like [[0]], [[1]] stand for interpolation placeholders. Copy them unchanged into the translation.
- Keep placeholders such as {variable}, %s and :attribute, code identifiers, numbers and dates unchanged.
- Use consistent, natural terminology at the formality level the text implies.
- Reply with the translated text only. No explanations."#;

/// System prompt, with the project's own description appended when given.
pub fn system_prompt(context: &str) -> String {
    let context = context.trim();
    if context.is_empty() {
        format!("{SYSTEM_PROMPT}\n\nNo project context was provided. Apply general business standards.")
    } else {
        format!(
            "{SYSTEM_PROMPT}\n\nProject context (use it to pick domain terminology and formality):\n<context>\n{context}\n</context>"
        )
    }
}

/// User prompt listing one `key: "value"` line per entry.
pub fn user_prompt(entries: &StringTable, from: &str, to: &str) -> String {
    let lines: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("{key}: \"{value}\""))
        .collect();

    format!(
        "Translate the following strings from {from} to {to}. \
         Keep the original format and preserve any HTML or placeholders. \
         Note: {QUOTE_TOKEN} represents double quotes in the original text.\n\n\
         Respond with a single JSON object whose keys are exactly the keys below \
         (the text before the first `: \"`) and whose values are the translations.\n\n\
         {}",
        lines.join("\n")
    )
}

//! Prompt templating for instruction-following models.
//!
//! Plain summarization models take the chunk text as-is. Text-to-text
//! generation models need an instruction wrapped around it; a
//! [`PromptTemplate`] renders that wrapper with the chunk substituted for
//! the `{text}` placeholder.

use anyhow::{bail, Result};

/// Placeholder replaced by the chunk text.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Default instruction for text-to-text generation models.
pub const DEFAULT_TEMPLATE: &str = "You are given a detailed passage. Write a well-structured and non-repetitive summary with the following sections:

1. **Key Points** - Highlight the core ideas or arguments.
2. **Important Details** - Include relevant supporting information or examples.
3. **Main Conclusions** - Summarize the overall insights or takeaways.

Ensure clarity, logical flow, and avoid repeating the original wording directly.

Text to summarize:
{text}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Build a template, rejecting one without a `{text}` placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TEXT_PLACEHOLDER) {
            bail!("prompt template must contain the {} placeholder", TEXT_PLACEHOLDER);
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute `text` for every placeholder occurrence.
    pub fn render(&self, text: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, text)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_text_into_placeholder() {
        let t = PromptTemplate::new("Summarize: {text}").unwrap();
        assert_eq!(t.render("the cat sat"), "Summarize: the cat sat");
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = PromptTemplate::new("Summarize this").unwrap_err();
        assert!(err.to_string().contains("{text}"));
    }

    #[test]
    fn default_template_ends_with_text() {
        let rendered = PromptTemplate::default().render("BODY");
        assert!(rendered.contains("Key Points"));
        assert!(rendered.trim_end().ends_with("BODY"));
    }

    #[test]
    fn text_containing_braces_is_not_reinterpreted() {
        let t = PromptTemplate::new("<{text}>").unwrap();
        assert_eq!(t.render("{text}"), "<{text}>");
    }
}

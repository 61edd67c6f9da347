// ABOUTME: Placeholder substitution engine for report and résumé templates
// ABOUTME: Replaces recognised tokens in a single pass, leaving all other text untouched

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::context::TemplateContext;
use super::error::{Result, TemplateError};
use super::syntax::{distinct_names, Placeholder, Syntax, SyntaxChoice};

/// How unresolved placeholders are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Leave unresolved placeholders verbatim
    #[default]
    Lenient,
    /// Fail when any placeholder has no value
    Strict,
}

/// Result of rendering a template
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub syntax: Syntax,
    pub substituted: usize,
    pub unresolved: Vec<Placeholder>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn unresolved_names(&self) -> Vec<String> {
        distinct_names(&self.unresolved)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    syntax: SyntaxChoice,
    mode: RenderMode,
}

impl TemplateEngine {
    /// Create an engine that detects the syntax and renders leniently
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_syntax(mut self, syntax: impl Into<SyntaxChoice>) -> Self {
        self.syntax = syntax.into();
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strict(self) -> Self {
        self.with_mode(RenderMode::Strict)
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The concrete syntax this engine uses for `text`
    pub fn syntax_for(&self, text: &str) -> Syntax {
        self.syntax.resolve(text)
    }

    /// Find every placeholder in source order
    pub fn scan(&self, text: &str) -> Vec<Placeholder> {
        self.syntax_for(text).scan(text)
    }

    /// Render a template with the given values
    ///
    /// Values are inserted literally and never re-scanned, so a value that
    /// looks like a placeholder stays as written.
    pub fn render(&self, template: &str, context: &TemplateContext) -> Result<Rendered> {
        let syntax = self.syntax_for(template);
        let placeholders = syntax.scan(template);

        let mut text = String::with_capacity(template.len());
        let mut cursor = 0;
        let mut substituted = 0;
        let mut unresolved = Vec::new();

        for placeholder in placeholders {
            text.push_str(&template[cursor..placeholder.start]);
            cursor = placeholder.end;

            match context.get(&placeholder.name) {
                Some(value) => {
                    trace!(name = %placeholder.name, line = placeholder.line, "Substituting placeholder");
                    text.push_str(value);
                    substituted += 1;
                }
                None => {
                    text.push_str(&placeholder.raw);
                    unresolved.push(placeholder);
                }
            }
        }
        text.push_str(&template[cursor..]);

        debug!(
            "Rendered {} template: {} substituted, {} unresolved",
            syntax,
            substituted,
            unresolved.len()
        );

        if self.mode == RenderMode::Strict && !unresolved.is_empty() {
            return Err(TemplateError::MissingVariables {
                names: distinct_names(&unresolved),
            });
        }

        Ok(Rendered {
            text,
            syntax,
            substituted,
            unresolved,
        })
    }

    /// Render and return only the text
    /// Render previous output again under the syntax it was rendered with
    ///
    /// Auto detection looks at the text it is given, so output whose mustache
    /// tokens were all filled would otherwise be re-read as bracket syntax.
    pub fn rerender(&self, previous: &Rendered, context: &TemplateContext) -> Result<Rendered> {
        self.clone()
            .with_syntax(previous.syntax)
            .render(&previous.text, context)
    }

    pub fn render_str(&self, template: &str, context: &TemplateContext) -> Result<String> {
        Ok(self.render(template, context)?.text)
    }

    /// Placeholders still present in `text`
    pub fn unresolved(&self, text: &str) -> Vec<Placeholder> {
        self.scan(text)
    }

    /// Check if a string contains placeholder tokens
    pub fn has_placeholders(&self, text: &str) -> bool {
        !self.scan(text).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_rendering() {
        let engine = TemplateEngine::new();
        let context = TemplateContext::from_pairs(&["name=World"]).unwrap();

        let rendered = engine.render("Hello {{ name }}!", &context).unwrap();

        assert_eq!(rendered.text, "Hello World!");
        assert_eq!(rendered.substituted, 1);
        assert!(rendered.is_complete());
    }

    #[test]
    fn test_lenient_leaves_unresolved_verbatim() {
        let engine = TemplateEngine::new();
        let context = TemplateContext::from_pairs(&["report_date=2024-05-06"]).unwrap();

        let rendered = engine
            .render("{{ report_date }} / {{config_id_1}} / {{ config_id_1 }}", &context)
            .unwrap();

        assert_eq!(rendered.text, "2024-05-06 / {{config_id_1}} / {{ config_id_1 }}");
        assert_eq!(rendered.unresolved.len(), 2);
        assert_eq!(rendered.unresolved_names(), vec!["config_id_1"]);
    }

    #[test]
    fn test_strict_lists_every_missing_name() {
        let engine = TemplateEngine::new().strict();
        let context = TemplateContext::from_pairs(&["a=1"]).unwrap();

        let err = engine
            .render("{{ a }} {{ b }} {{ c }} {{ b }}", &context)
            .unwrap_err();

        match err {
            TemplateError::MissingVariables { names } => assert_eq!(names, vec!["b", "c"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_strict_succeeds_when_complete() {
        let engine = TemplateEngine::new().strict();
        let context = TemplateContext::from_pairs(&["a=1", "b=2"]).unwrap();
        assert_eq!(engine.render_str("{{a}}+{{b}}", &context).unwrap(), "1+2");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let engine = TemplateEngine::new();
        let context =
            TemplateContext::from_pairs(&["a={{ b }}", "b=should not appear"]).unwrap();

        let rendered = engine.render("{{ a }}", &context).unwrap();
        assert_eq!(rendered.text, "{{ b }}");
        assert_eq!(rendered.substituted, 1);
    }

    #[test]
    fn test_idempotent_without_placeholders() {
        let engine = TemplateEngine::new().strict();
        let context = TemplateContext::from_pairs(&["x=1"]).unwrap();
        let text = "# Report\n\n| a | b |\n|---|---|\n{ single } and }} stray {{\n";

        let once = engine.render_str(text, &context).unwrap();
        let twice = engine.render_str(&once, &context).unwrap();

        assert_eq!(once, text);
        assert_eq!(twice, text);
    }

    #[test]
    fn test_rerender_keeps_resolved_syntax() {
        let engine = TemplateEngine::new().strict();
        let context = TemplateContext::from_pairs(&["a=X"]).unwrap();

        let once = engine.render("See [note] {{ a }}", &context).unwrap();
        assert_eq!(once.text, "See [note] X");
        assert_eq!(once.syntax, Syntax::Mustache);

        // Fresh detection on the output finds no mustache tokens
        assert_eq!(engine.syntax_for(&once.text), Syntax::Bracket);
        assert!(engine.render(&once.text, &context).is_err());

        let twice = engine.rerender(&once, &context).unwrap();
        assert_eq!(twice.text, "See [note] X");
        assert_eq!(twice.syntax, Syntax::Mustache);
        assert!(twice.is_complete());
    }

    #[test]
    fn test_non_placeholder_text_preserved() {
        let engine = TemplateEngine::new().with_syntax(Syntax::Bracket);
        let context = TemplateContext::from_pairs(&["Your Name Here=Jane Doe"]).unwrap();
        let text = "# [Your Name Here]\n- [ ] keep [link](http://x) \u{00e9}\r\n";

        let rendered = engine.render(text, &context).unwrap();
        assert_eq!(rendered.text, "# Jane Doe\n- [ ] keep [link](http://x) \u{00e9}\r\n");
    }

    #[test]
    fn test_has_placeholders() {
        let engine = TemplateEngine::new().with_syntax(Syntax::Mustache);

        assert!(engine.has_placeholders("Hello {{name}}"));
        assert!(!engine.has_placeholders("Hello world"));
        assert!(!engine.has_placeholders("Hello {{ not valid }}"));
    }
}

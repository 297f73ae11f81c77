//! Email templates rendered with Handlebars
//!
//! Each template has a subject, a plain text body and an HTML body, all
//! rendered against the same JSON context. Strict mode is on, so a context
//! missing a referenced field fails instead of rendering a blank. Text
//! bodies use triple braces since they are not HTML.

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Rendered template result
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Email template definition
#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Handlebars-based template engine
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Engine with the `enrollment` and `answer` templates registered.
    pub fn new() -> Result<Self> {
        let mut engine = Self::empty();
        engine.register_defaults()?;
        Ok(engine)
    }

    pub fn empty() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        Self {
            handlebars,
            templates: HashMap::new(),
        }
    }

    /// Register a template, replacing one with the same name
    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Render a template by name
    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let subject = self
            .handlebars
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_text = match template.body_text {
            Some(_) => Some(
                self.handlebars
                    .render(&format!("{}_text", name), data)
                    .map_err(|e| eyre!("Failed to render text: {}", e))?,
            ),
            None => None,
        };

        let body_html = match template.body_html {
            Some(_) => Some(
                self.handlebars
                    .render(&format!("{}_html", name), data)
                    .map_err(|e| eyre!("Failed to render HTML: {}", e))?,
            ),
            None => None,
        };

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(EmailTemplate {
            name: "enrollment".to_string(),
            subject: "Enrollment confirmation".to_string(),
            body_text: Some(
                r#"Hello {{{name}}},

Your enrollment is confirmed.

Plan: {{{plan_title}}} ({{{plan_duration}}} months)
Start date: {{{start_date}}}
End date: {{{end_date}}}
Total price: {{{price}}}

See you at the gym!"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<p>Hello {{name}},</p>
<p>Your enrollment is confirmed.</p>
<ul>
  <li><strong>Plan:</strong> {{plan_title}} ({{plan_duration}} months)</li>
  <li><strong>Start date:</strong> {{start_date}}</li>
  <li><strong>End date:</strong> {{end_date}}</li>
  <li><strong>Total price:</strong> {{price}}</li>
</ul>
<p>See you at the gym!</p>"#
                    .to_string(),
            ),
        })?;

        self.register(EmailTemplate {
            name: "answer".to_string(),
            subject: "Answer to your question".to_string(),
            body_text: Some(
                r#"Hello {{{name}}},

You asked:
{{{question}}}

Our answer:
{{{answer}}}"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<p>Hello {{name}},</p>
<p>You asked:</p>
<blockquote>{{question}}</blockquote>
<p>Our answer:</p>
<blockquote>{{answer}}</blockquote>"#
                    .to_string(),
            ),
        })?;

        Ok(())
    }
}

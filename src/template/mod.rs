//! Render output handed to the host.
//!
//! The template content itself is opaque to the stack engine; it only tracks
//! template identities so the host can tell a back navigation from a forward
//! one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Declarative UI description produced by a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    kind: String,
    body: Value,
}

impl Template {
    pub fn new(kind: impl Into<String>, body: Value) -> Self {
        Self {
            kind: kind.into(),
            body,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Identity of a template a screen last produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub kind: String,
    pub template_id: String,
}

/// A template together with its identity and the identities of every screen
/// on the stack (top first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateWrapper {
    template: Template,
    id: String,
    template_infos: Vec<TemplateInfo>,
}

impl TemplateWrapper {
    /// Wrap `template` under a freshly generated id.
    pub fn wrap(template: Template) -> Self {
        Self::wrap_with_id(template, Uuid::new_v4().to_string())
    }

    pub fn wrap_with_id(template: Template, id: impl Into<String>) -> Self {
        Self {
            template,
            id: id.into(),
            template_infos: Vec::new(),
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> TemplateInfo {
        TemplateInfo {
            kind: self.template.kind.clone(),
            template_id: self.id.clone(),
        }
    }

    pub fn template_infos(&self) -> &[TemplateInfo] {
        &self.template_infos
    }

    pub fn set_template_infos(&mut self, infos: Vec<TemplateInfo>) {
        self.template_infos = infos;
    }
}

//! Naming scope threaded through resource materialization

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Identifiers of where a pipeline is being installed
///
/// Source strings may reference them as `{{ pipeline }}`, `{{ team }}` and
/// `{{ installation }}`; they are substituted when the document is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub pipeline: String,
    pub team: String,
    pub installation: String,
}

impl ScopeInfo {
    pub fn new(
        pipeline: impl Into<String>,
        team: impl Into<String>,
        installation: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            team: team.into(),
            installation: installation.into(),
        }
    }

    /// Substitute scope placeholders in a string
    pub fn render(&self, template: &str) -> String {
        if !template.contains("{{") {
            return template.to_string();
        }

        let mut rendered = template.to_string();
        for (key, value) in [
            ("pipeline", &self.pipeline),
            ("team", &self.team),
            ("installation", &self.installation),
        ] {
            let placeholder = format!("{{{{ {} }}}}", key);
            rendered = rendered.replace(&placeholder, value);
        }
        rendered
    }

    /// Substitute scope placeholders in every string of a YAML value
    pub fn render_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.render(s)),
            Value::Sequence(items) => {
                Value::Sequence(items.iter().map(|item| self.render_value(item)).collect())
            }
            Value::Mapping(mapping) => Value::Mapping(self.render_mapping(mapping)),
            other => other.clone(),
        }
    }

    pub fn render_mapping(&self, mapping: &Mapping) -> Mapping {
        mapping
            .iter()
            .map(|(key, value)| (key.clone(), self.render_value(value)))
            .collect()
    }
}

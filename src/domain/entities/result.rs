use serde_json::Value;

use super::command::OutputFormat;
use super::message::Reply;
use super::template;
use crate::application::errors::ActionError;

/// Immutable output of one command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    data: Value,
    format: OutputFormat,
}

impl CommandResult {
    pub fn new(data: Value, format: OutputFormat) -> Self {
        Self { data, format }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.format
    }

    pub fn content_type(&self) -> &str {
        &self.format.content_type
    }

    /// Renders the data as compact JSON, or through the template when one is
    /// configured. JSON output keeps the key order of the source data.
    pub fn format(&self) -> Result<String, ActionError> {
        match &self.format.template {
            None => serde_json::to_string(&self.data)
                .map_err(|e| ActionError::Formatting(e.to_string())),
            Some(source) => template::render(source, &self.data),
        }
    }

    pub fn to_reply(&self) -> Result<Reply, ActionError> {
        Ok(Reply::new(self.format.content_type.clone(), self.format()?))
    }

    /// True when the data carries nothing: `null`, `{}`, `[]` or `""`
    pub fn has_empty_data(&self) -> bool {
        match &self.data {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

//! The finalized answer model and its persisted form

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use super::question::{AnswerValue, Question};
use crate::error::{Result, ScaffoldError};
use crate::persist::write_atomic;

/// Answers keyed by question key. Immutable once built by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerModel {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerModel {
    pub(crate) fn from_values(values: BTreeMap<String, AnswerValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(AnswerValue::as_str)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(AnswerValue::as_integer)
    }

    /// Missing flags read as "no"
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(AnswerValue::as_flag)
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.values)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_yaml()?.as_bytes())
    }

    /// Reload a persisted model, restoring value types from the question set.
    ///
    /// Shapes are re-checked; port availability is not, since the project's
    /// own containers may be holding those ports now.
    pub fn load(path: &Path, questions: &[Question]) -> Result<Self> {
        if !path.exists() {
            return Err(ScaffoldError::Config(format!(
                "{} not found. Run 'rocketdoo init' first",
                path.display()
            )));
        }
        let text = fs::read_to_string(path)?;
        let raw = parse_raw_answers(&text)?;

        let mut values = BTreeMap::new();
        for question in questions {
            if let Some(raw_value) = raw.get(question.key) {
                values.insert(question.key.to_string(), question.parse(raw_value)?);
            }
        }
        for key in raw.keys().filter(|k| !questions.iter().any(|q| q.key == k.as_str())) {
            tracing::debug!(key, "ignoring unknown answer key");
        }

        Ok(Self { values })
    }
}

/// Read a YAML mapping of answers into raw strings, as if typed by the user
pub fn parse_raw_answers(text: &str) -> Result<BTreeMap<String, String>> {
    let doc: Value = serde_yaml::from_str(text)?;
    let mut raw = BTreeMap::new();

    let Some(mapping) = doc.as_mapping() else {
        if doc.is_null() {
            return Ok(raw);
        }
        return Err(ScaffoldError::Config(
            "answers must be a mapping of question keys to values".to_string(),
        ));
    };

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        let scalar = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "y".to_string(),
            Value::Bool(false) => "n".to_string(),
            Value::Null => continue,
            _ => {
                return Err(ScaffoldError::validation(key, "expected a single value"));
            }
        };
        raw.insert(key.to_string(), scalar);
    }
    Ok(raw)
}

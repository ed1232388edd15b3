//! The question/answer loop
//!
//! Questions are asked strictly in order. Each answer is shape-checked by
//! its descriptor; port answers are additionally checked against the port
//! registry, and a busy port is replaced by the registry's suggestion only
//! with the user's consent.

use std::collections::{BTreeMap, HashMap};

use super::model::AnswerModel;
use super::prompt::Prompter;
use super::question::{AnswerValue, Question};
use crate::error::{Result, ScaffoldError};
use crate::ports::{PortRegistry, PortStatus};

pub struct Wizard {
    questions: Vec<Question>,
    registry: PortRegistry,
    defaults: HashMap<&'static str, String>,
    answers: BTreeMap<String, AnswerValue>,
}

impl Wizard {
    pub fn new(questions: Vec<Question>, registry: PortRegistry) -> Self {
        Self {
            questions,
            registry,
            defaults: HashMap::new(),
            answers: BTreeMap::new(),
        }
    }

    /// Override a question's default (e.g. project name from the directory)
    pub fn with_default(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.defaults.insert(key, value.into());
        self
    }

    fn default_for(&self, question: &Question) -> Option<String> {
        self.defaults
            .get(question.key)
            .cloned()
            .or_else(|| question.default.map(str::to_string))
    }

    /// Whether a conditional question applies given the answers so far
    pub fn applies(&self, question: &Question) -> bool {
        match question.when {
            Some(cond) => matches!(self.answers.get(cond.flag), Some(AnswerValue::Flag(true))),
            None => true,
        }
    }

    /// Ask every applicable question interactively, then finalize
    pub fn run(mut self, prompter: &mut dyn Prompter) -> Result<AnswerModel> {
        for question in self.questions.clone() {
            if self.applies(&question) {
                self.ask(&question, prompter)?;
            }
        }
        self.finalize()
    }

    /// Prompt until the answer is valid. Validation errors are shown and
    /// re-prompted; closed input aborts with the pending key.
    pub fn ask(&mut self, question: &Question, prompter: &mut dyn Prompter) -> Result<AnswerValue> {
        loop {
            let default = self.default_for(question);
            let label = match question.kind.hint() {
                Some(hint) => format!("{} ({})", question.label, hint),
                None => question.label.to_string(),
            };

            let Some(input) = prompter.prompt(&label, default.as_deref())? else {
                return Err(ScaffoldError::IncompleteAnswer(question.key.to_string()));
            };

            let raw = if input.trim().is_empty() {
                match default {
                    Some(d) => d,
                    None if !question.required => return Ok(AnswerValue::Text(String::new())),
                    None => {
                        prompter.notify("This field cannot be empty.");
                        continue;
                    }
                }
            } else {
                input
            };

            match self.check_interactive(question, &raw, prompter) {
                Ok(value) => {
                    self.record(question, value.clone());
                    return Ok(value);
                }
                Err(e) if e.is_recoverable() => {
                    prompter.notify(&format!("  {}", e));
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn check_interactive(
        &self,
        question: &Question,
        raw: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<AnswerValue> {
        let value = question.parse(raw)?;
        if !question.is_port() {
            return Ok(value);
        }

        let port = port_of(&value);
        match self.registry.status(port) {
            PortStatus::Free => Ok(value),
            PortStatus::InUse => {
                let suggested = self.registry.suggest(port).ok_or_else(|| {
                    ScaffoldError::validation(question.key, format!("no free port above {}", port))
                })?;
                prompter.notify(&format!("  Port {} is already in use.", port));
                if prompter.confirm(&format!("  Use port {} instead?", suggested), true)? {
                    Ok(AnswerValue::Integer(i64::from(suggested)))
                } else {
                    Err(ScaffoldError::validation(
                        question.key,
                        format!("port {} is in use, choose another", port),
                    ))
                }
            }
            PortStatus::Unknown => {
                prompter.notify(&format!("  Could not verify whether port {} is free.", port));
                if prompter.confirm(&format!("  Use port {} anyway?", port), false)? {
                    Ok(value)
                } else {
                    Err(ScaffoldError::validation(
                        question.key,
                        "port availability unknown, choose another",
                    ))
                }
            }
        }
    }

    /// Validate one answer without a user to ask (answer files).
    ///
    /// A busy port is swapped for the suggestion; an unverifiable port is
    /// accepted since the file states it explicitly.
    pub fn answer(&mut self, question: &Question, raw: &str) -> Result<AnswerValue> {
        let mut value = question.parse(raw)?;

        if question.is_port() {
            let port = port_of(&value);
            match self.registry.status(port) {
                PortStatus::Free => {}
                PortStatus::InUse => {
                    let suggested = self.registry.suggest(port).ok_or_else(|| {
                        ScaffoldError::validation(
                            question.key,
                            format!("port {} is in use and no free port was found", port),
                        )
                    })?;
                    tracing::warn!(
                        question = question.key,
                        requested = port,
                        suggested,
                        "port in use, using suggested port"
                    );
                    value = AnswerValue::Integer(i64::from(suggested));
                }
                PortStatus::Unknown => {
                    tracing::warn!(question = question.key, port, "could not verify port availability");
                }
            }
        }

        self.record(question, value.clone());
        Ok(value)
    }

    /// Answer every applicable question from raw values, falling back to defaults
    pub fn apply_answers(&mut self, raw: &BTreeMap<String, String>) -> Result<()> {
        for key in raw.keys() {
            if !self.questions.iter().any(|q| q.key == key.as_str()) {
                tracing::warn!(key = %key, "unknown key in answers file ignored");
            }
        }

        for question in self.questions.clone() {
            if !self.applies(&question) {
                continue;
            }
            let provided = raw.get(question.key).cloned().or_else(|| self.default_for(&question));
            if let Some(value) = provided {
                self.answer(&question, &value)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, question: &Question, value: AnswerValue) {
        if question.is_port() {
            self.registry.claim(port_of(&value));
        }
        self.answers.insert(question.key.to_string(), value);
    }

    /// Freeze the answers; every applicable required question must be answered
    pub fn finalize(self) -> Result<AnswerModel> {
        for question in &self.questions {
            if question.required && self.applies(question) && !self.answers.contains_key(question.key) {
                return Err(ScaffoldError::IncompleteAnswer(question.key.to_string()));
            }
        }
        Ok(AnswerModel::from_values(self.answers))
    }
}

fn port_of(value: &AnswerValue) -> u16 {
    value
        .as_integer()
        .and_then(|n| u16::try_from(n).ok())
        .unwrap_or_default()
}

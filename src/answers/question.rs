//! Question descriptors and shape validation

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Result, ScaffoldError};
use crate::ports::MIN_PORT;

/// A typed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Integer(i64),
    /// Member of the question's declared choice set
    Choice(String),
    Flag(bool),
}

impl AnswerValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) | AnswerValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AnswerValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AnswerValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(s) | AnswerValue::Choice(s) => write!(f, "{}", s),
            AnswerValue::Integer(n) => write!(f, "{}", n),
            AnswerValue::Flag(true) => write!(f, "yes"),
            AnswerValue::Flag(false) => write!(f, "no"),
        }
    }
}

// Persisted as plain YAML scalars; the question set restores the type on load.
impl Serialize for AnswerValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AnswerValue::Text(s) | AnswerValue::Choice(s) => serializer.serialize_str(s),
            AnswerValue::Integer(n) => serializer.serialize_i64(*n),
            AnswerValue::Flag(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Declared shape of an answer
#[derive(Debug, Clone)]
pub enum QuestionKind {
    Text { pattern: Option<&'static str> },
    Integer { min: i64, max: i64 },
    Choice(Vec<String>),
    /// Host port, checked against the port registry by the wizard
    Port,
    YesNo,
}

impl QuestionKind {
    pub fn choice(choices: &[&str]) -> Self {
        QuestionKind::Choice(choices.iter().map(|c| c.to_string()).collect())
    }

    /// Short input hint shown after the prompt label
    pub fn hint(&self) -> Option<String> {
        match self {
            QuestionKind::Choice(choices) => Some(choices.join("/")),
            QuestionKind::YesNo => Some("y/n".to_string()),
            QuestionKind::Integer { min, max } => Some(format!("{}-{}", min, max)),
            QuestionKind::Port => Some(format!("{}-{}", MIN_PORT, u16::MAX)),
            QuestionKind::Text { .. } => None,
        }
    }
}

/// A question is only asked when a yes/no answer given earlier is "yes"
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub flag: &'static str,
}

#[derive(Debug, Clone)]
pub struct Question {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: QuestionKind,
    /// Raw default, parsed like user input
    pub default: Option<&'static str>,
    pub required: bool,
    pub when: Option<Condition>,
}

impl Question {
    pub fn new(key: &'static str, label: &'static str, kind: QuestionKind) -> Self {
        Self {
            key,
            label,
            kind,
            default: None,
            required: true,
            when: None,
        }
    }

    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn when(mut self, flag: &'static str) -> Self {
        self.when = Some(Condition { flag });
        self
    }

    pub fn is_port(&self) -> bool {
        matches!(self.kind, QuestionKind::Port)
    }

    /// Validate the shape of raw input. Port availability is not checked here.
    pub fn parse(&self, raw: &str) -> Result<AnswerValue> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ScaffoldError::validation(self.key, "a value is required"));
        }

        match &self.kind {
            QuestionKind::Text { pattern } => {
                if let Some(pattern) = pattern {
                    let re = Regex::new(pattern).map_err(|e| {
                        ScaffoldError::Config(format!("bad pattern for '{}': {}", self.key, e))
                    })?;
                    if !re.is_match(input) {
                        return Err(ScaffoldError::validation(
                            self.key,
                            format!("'{}' does not match {}", input, pattern),
                        ));
                    }
                }
                Ok(AnswerValue::Text(input.to_string()))
            }
            QuestionKind::Integer { min, max } => {
                let n: i64 = input.parse().map_err(|_| {
                    ScaffoldError::validation(self.key, format!("'{}' is not a number", input))
                })?;
                if n < *min || n > *max {
                    return Err(ScaffoldError::validation(
                        self.key,
                        format!("must be between {} and {}", min, max),
                    ));
                }
                Ok(AnswerValue::Integer(n))
            }
            QuestionKind::Choice(choices) => parse_choice(self.key, choices, input),
            QuestionKind::Port => {
                let port: u16 = input.parse().map_err(|_| {
                    ScaffoldError::validation(self.key, format!("'{}' is not a valid port", input))
                })?;
                if port < MIN_PORT {
                    return Err(ScaffoldError::validation(
                        self.key,
                        format!("must be between {} and {}", MIN_PORT, u16::MAX),
                    ));
                }
                Ok(AnswerValue::Integer(i64::from(port)))
            }
            QuestionKind::YesNo => parse_yes_no(input)
                .map(AnswerValue::Flag)
                .ok_or_else(|| ScaffoldError::validation(self.key, "answer 'y' or 'n'")),
        }
    }
}

/// Accepts a member of the set (case-insensitive) or its 1-based menu number
fn parse_choice(key: &str, choices: &[String], input: &str) -> Result<AnswerValue> {
    if let Some(found) = choices.iter().find(|c| c.eq_ignore_ascii_case(input)) {
        return Ok(AnswerValue::Choice(found.to_string()));
    }
    if let Ok(index) = input.parse::<usize>() {
        if (1..=choices.len()).contains(&index) {
            return Ok(AnswerValue::Choice(choices[index - 1].clone()));
        }
    }
    Err(ScaffoldError::validation(
        key,
        format!("'{}' is not one of: {}", input, choices.join(", ")),
    ))
}

pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "si" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

pub const ODOO_VERSIONS: &[&str] = &["15.0", "16.0", "17.0", "18.0", "19.0"];
pub const EDITIONS: &[&str] = &["ce", "ee"];
pub const DB_VERSIONS: &[&str] = &["13", "14", "15", "16"];
pub const RESTART_POLICIES: &[&str] = &["no", "always", "unless-stopped", "on-failure"];

/// The private key question. With known keys it becomes a choice among them;
/// without, any plausible file name is accepted.
pub fn ssh_key_question(keys: &[String]) -> Question {
    let label = "Private key for repository access";
    let question = if keys.is_empty() {
        Question::new(
            "ssh_key",
            label,
            QuestionKind::Text {
                pattern: Some(r"^[A-Za-z0-9._-]+$"),
            },
        )
        .default_value("id_rsa")
    } else {
        Question::new("ssh_key", label, QuestionKind::Choice(keys.to_vec()))
    };
    question.when("use_private_repos")
}

/// The fixed, ordered question set asked by `init`
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            "project_name",
            "Project name",
            QuestionKind::Text {
                pattern: Some(r"^[a-z0-9][a-z0-9_-]*$"),
            },
        ),
        Question::new("odoo_version", "Odoo version", QuestionKind::choice(ODOO_VERSIONS))
            .default_value("18.0"),
        Question::new(
            "edition",
            "Odoo edition (ce = Community, ee = Enterprise)",
            QuestionKind::choice(EDITIONS),
        )
        .default_value("ce"),
        Question::new("db_version", "PostgreSQL version", QuestionKind::choice(DB_VERSIONS))
            .default_value("15"),
        Question::new("odoo_port", "Odoo port", QuestionKind::Port).default_value("8069"),
        Question::new("vsc_port", "Debugger port (VS Code)", QuestionKind::Port)
            .default_value("8888"),
        Question::new(
            "restart",
            "Container restart policy",
            QuestionKind::choice(RESTART_POLICIES),
        )
        .default_value("always"),
        Question::new(
            "admin_passwd",
            "Odoo master password",
            QuestionKind::Text { pattern: None },
        )
        .default_value("admin"),
        Question::new(
            "db_password",
            "PostgreSQL password",
            QuestionKind::Text {
                pattern: Some(r"^\S+$"),
            },
        )
        .default_value("odoo"),
        Question::new(
            "use_private_repos",
            "Use private repositories (SSH key)?",
            QuestionKind::YesNo,
        )
        .default_value("n"),
        ssh_key_question(&[]),
        Question::new(
            "use_external_deps",
            "Add third-party addon repositories?",
            QuestionKind::YesNo,
        )
        .default_value("n"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(key: &str) -> Question {
        default_questions()
            .into_iter()
            .find(|q| q.key == key)
            .unwrap()
    }

    #[test]
    fn test_choice_by_name_and_number() {
        let q = question("odoo_version");
        assert_eq!(q.parse("17.0").unwrap(), AnswerValue::Choice("17.0".to_string()));
        assert_eq!(q.parse("1").unwrap(), AnswerValue::Choice("15.0".to_string()));
        assert!(q.parse("14.0").is_err());
        assert!(q.parse("9").is_err());
    }

    #[test]
    fn test_choice_case_insensitive() {
        let q = question("edition");
        assert_eq!(q.parse("EE").unwrap(), AnswerValue::Choice("ee".to_string()));
    }

    #[test]
    fn test_port_shape() {
        let q = question("odoo_port");
        assert_eq!(q.parse("8069").unwrap(), AnswerValue::Integer(8069));
        assert!(q.parse("80").is_err());
        assert!(q.parse("70000").is_err());
        assert!(q.parse("web").is_err());
    }

    #[test]
    fn test_project_name_pattern() {
        let q = question("project_name");
        assert!(q.parse("my_project-1").is_ok());
        assert!(q.parse("My Project").is_err());
    }

    #[test]
    fn test_integer_range() {
        let q = Question::new("workers", "Workers", QuestionKind::Integer { min: 0, max: 8 });
        assert_eq!(q.parse("2").unwrap(), AnswerValue::Integer(2));
        let err = q.parse("9").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_yes_no() {
        let q = question("use_private_repos");
        assert_eq!(q.parse("Yes").unwrap(), AnswerValue::Flag(true));
        assert_eq!(q.parse("s").unwrap(), AnswerValue::Flag(true));
        assert_eq!(q.parse("n").unwrap(), AnswerValue::Flag(false));
        assert!(q.parse("maybe").is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = question("admin_passwd").parse("   ").unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation { .. }));
    }

    #[test]
    fn test_ssh_key_choice_from_found_keys() {
        let keys = vec!["deploy_ed25519".to_string(), "id_rsa".to_string()];
        let q = ssh_key_question(&keys);
        assert_eq!(q.kind.hint().as_deref(), Some("deploy_ed25519/id_rsa"));
        assert_eq!(q.parse("2").unwrap(), AnswerValue::Choice("id_rsa".to_string()));
        assert!(q.parse("other_key").is_err());

        let free = ssh_key_question(&[]);
        assert_eq!(free.parse("other_key").unwrap(), AnswerValue::Text("other_key".to_string()));
    }

    #[test]
    fn test_question_order_is_fixed() {
        let keys: Vec<&str> = default_questions().iter().map(|q| q.key).collect();
        assert_eq!(keys.first(), Some(&"project_name"));
        assert_eq!(keys.last(), Some(&"use_external_deps"));
        let odoo = keys.iter().position(|k| *k == "odoo_port").unwrap();
        let vsc = keys.iter().position(|k| *k == "vsc_port").unwrap();
        assert!(odoo < vsc);
    }
}

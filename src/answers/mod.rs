//! Answer collection
//!
//! - `question`: typed question descriptors and the fixed question set
//! - `wizard`: the ordered ask/validate loop with port conflict handling
//! - `model`: the finalized, persistable answer model
//! - `prompt`: terminal interaction

pub mod model;
pub mod prompt;
pub mod question;
pub mod wizard;

pub use model::{parse_raw_answers, AnswerModel};
pub use prompt::{Prompter, TerminalPrompter};
pub use question::{default_questions, ssh_key_question, AnswerValue, Question, QuestionKind};
pub use wizard::Wizard;

#[cfg(feature = "readline")]
pub use prompt::ReadlinePrompter;

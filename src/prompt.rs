//! Prompt collaborator.
//!
//! The orchestrator only sees [`Prompter::ask`]: a question with labelled
//! choices and a selection mode, answered by a value or a cancellation.
//! [`InquirePrompter`] renders questions in the terminal; [`ScriptedPrompter`]
//! replays canned answers for tests and headless runs.

use std::collections::VecDeque;
use std::fmt;

use inquire::{Confirm, InquireError, MultiSelect, Select};

use crate::error::{LazyZshError, Result};

/// One selectable item: what the user sees and what the caller gets back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// A choice whose label is its value
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Single,
    Multiple,
    /// Yes/no question; choices are ignored
    Confirm { default: bool },
}

/// A question for the prompt collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub message: String,
    pub choices: Vec<Choice>,
    pub mode: PromptMode,
}

impl PromptSpec {
    pub fn single(message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            message: message.into(),
            choices,
            mode: PromptMode::Single,
        }
    }

    pub fn multiple(message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            message: message.into(),
            choices,
            mode: PromptMode::Multiple,
        }
    }

    pub fn confirm(message: impl Into<String>, default: bool) -> Self {
        Self {
            message: message.into(),
            choices: Vec::new(),
            mode: PromptMode::Confirm { default },
        }
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }
}

/// What the user answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Single(String),
    /// Possibly empty; an empty list is a valid answer
    Multiple(Vec<String>),
    Confirmed(bool),
    /// Esc, Ctrl-C, or no selection at a branch point
    Cancelled,
}

/// Asks the user questions
pub trait Prompter {
    /// Present `spec` and wait for an answer.
    ///
    /// Declining to answer is `Ok(Answer::Cancelled)`, not an error. Errors are
    /// reserved for a broken prompt backend.
    fn ask(&mut self, spec: &PromptSpec) -> Result<Answer>;
}

/// Terminal prompts via `inquire`
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl InquirePrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for InquirePrompter {
    fn ask(&mut self, spec: &PromptSpec) -> Result<Answer> {
        if !matches!(spec.mode, PromptMode::Confirm { .. }) && spec.choices.is_empty() {
            return Err(LazyZshError::prompt(format!(
                "'{}' has nothing to choose from",
                spec.message
            )));
        }

        let answer = match spec.mode {
            PromptMode::Single => Select::new(&spec.message, spec.choices.clone())
                .prompt()
                .map(|choice| Answer::Single(choice.value)),
            PromptMode::Multiple => MultiSelect::new(&spec.message, spec.choices.clone())
                .prompt()
                .map(|choices| Answer::Multiple(choices.into_iter().map(|c| c.value).collect())),
            PromptMode::Confirm { default } => Confirm::new(&spec.message)
                .with_default(default)
                .prompt()
                .map(Answer::Confirmed),
        };

        match answer {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Ok(Answer::Cancelled)
            }
            Err(e) => Err(LazyZshError::prompt(e.to_string())),
        }
    }
}

/// Replays a fixed queue of answers, recording every question asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Messages of the questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, spec: &PromptSpec) -> Result<Answer> {
        self.asked.push(spec.message.clone());
        let answer = self.answers.pop_front().ok_or_else(|| {
            LazyZshError::prompt(format!("no scripted answer for '{}'", spec.message))
        })?;

        let unknown = match &answer {
            Answer::Single(value) if !spec.has_value(value) => Some(value.clone()),
            Answer::Multiple(values) => values.iter().find(|v| !spec.has_value(v)).cloned(),
            _ => None,
        };
        if let Some(value) = unknown {
            return Err(LazyZshError::prompt(format!(
                "'{}' is not a choice of '{}'",
                value, spec.message
            )));
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> PromptSpec {
        PromptSpec::single(
            "Choose a theme",
            vec![Choice::plain("robbyrussell"), Choice::plain("agnoster")],
        )
    }

    #[test]
    fn test_choice_displays_label() {
        let choice = Choice::new("Fresh Installation", "freshInstallation");
        assert_eq!(choice.to_string(), "Fresh Installation");
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut prompter = ScriptedPrompter::new([
            Answer::Single("agnoster".into()),
            Answer::Cancelled,
        ]);
        assert_eq!(
            prompter.ask(&themes()).unwrap(),
            Answer::Single("agnoster".into())
        );
        assert_eq!(prompter.ask(&themes()).unwrap(), Answer::Cancelled);
        assert_eq!(prompter.asked().len(), 2);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_rejects_unknown_value() {
        let mut prompter = ScriptedPrompter::new([Answer::Single("nope".into())]);
        assert!(matches!(
            prompter.ask(&themes()),
            Err(LazyZshError::Prompt(_))
        ));
    }

    #[test]
    fn test_scripted_exhausted_is_error() {
        let mut prompter = ScriptedPrompter::default();
        assert!(prompter.ask(&PromptSpec::confirm("Sure?", false)).is_err());
    }

    #[test]
    fn test_empty_multiple_answer_is_valid() {
        let mut prompter = ScriptedPrompter::new([Answer::Multiple(vec![])]);
        let spec = PromptSpec::multiple("Plugins", vec![Choice::plain("git")]);
        assert_eq!(prompter.ask(&spec).unwrap(), Answer::Multiple(vec![]));
    }
}

//! Operator prompts.
//!
//! Every interactive question (stash-or-cancel, branch name, overwrite,
//! `clean` confirmation, menu selections) goes through [`Prompt`], so flows
//! can run non-interactively with [`AssumeYes`] or a [`ScriptedPrompt`].

use std::cell::RefCell;
use std::collections::VecDeque;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::error::PromptError;

/// Synchronous question/answer channel with the operator.
pub trait Prompt {
    /// Yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> Result<bool, PromptError>;

    /// Free-form answer, trimmed. Empty when the operator just hits enter.
    fn ask(&self, question: &str) -> Result<String, PromptError>;
}

impl<P: Prompt + ?Sized> Prompt for &P {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        (**self).confirm(question)
    }

    fn ask(&self, question: &str) -> Result<String, PromptError> {
        (**self).ask(question)
    }
}

/// `y`, `yes` (any case) are yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Asks on the controlling terminal. A terminal that cannot be read is an
/// error, never an implicit "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(false)
            .interact()?;
        Ok(answer)
    }

    fn ask(&self, question: &str) -> Result<String, PromptError> {
        let answer = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Non-interactive
// ---------------------------------------------------------------------------

/// Confirms everything and leaves free-form questions unanswered.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _question: &str) -> Result<bool, PromptError> {
        Ok(true)
    }

    fn ask(&self, _question: &str) -> Result<String, PromptError> {
        Ok(String::new())
    }
}

/// Replays a fixed list of answers and records every question asked.
///
/// Once the answers run out, confirmations are "no" and questions are empty.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next(&self, question: &str) -> String {
        self.asked.borrow_mut().push(question.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .map(|a| a.trim().to_string())
            .unwrap_or_default()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        Ok(is_yes(&self.next(question)))
    }

    fn ask(&self, question: &str) -> Result<String, PromptError> {
        Ok(self.next(question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_variants() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES \n"));
        assert!(!is_yes(""));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn scripted_prompt_replays_then_defaults() {
        let prompt = ScriptedPrompt::new(["y", " main "]);
        assert!(prompt.confirm("stash?").unwrap());
        assert_eq!(prompt.ask("branch?").unwrap(), "main");
        assert!(!prompt.confirm("again?").unwrap());
        assert_eq!(prompt.ask("more?").unwrap(), "");
        assert_eq!(prompt.asked(), vec!["stash?", "branch?", "again?", "more?"]);
    }

    #[test]
    fn assume_yes_confirms() {
        assert!(AssumeYes.confirm("wipe?").unwrap());
        assert_eq!(AssumeYes.ask("name?").unwrap(), "");
    }
}

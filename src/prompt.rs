use anyhow::Result;
use inquire::{Confirm, InquireError};

/// Asks the user yes/no questions. Commands take a `&dyn Confirmer` so tests
/// can answer without a terminal.
pub trait Confirmer {
    /// Ask `prompt`, returning the user's answer
    ///
    /// # Errors
    /// Returns an error if no answer can be obtained (no terminal, cancelled)
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Interactive confirmation on the terminal
pub struct InquireConfirmer;

impl Confirmer for InquireConfirmer {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match Confirm::new(prompt).with_default(default).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::NotTTY) => {
                anyhow::bail!("cannot ask for confirmation: not a terminal (re-run with --yes)")
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Answers yes to everything (`--yes`)
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }
}

/// Picks the confirmer for a command given its `--yes` flag.
#[must_use]
pub fn confirmer(yes: bool) -> Box<dyn Confirmer> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InquireConfirmer)
    }
}

/// Mock implementation for testing that returns a fixed answer and records
/// what it was asked
#[cfg(test)]
pub struct MockConfirmer {
    answer: bool,
    asked: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MockConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

#[cfg(test)]
impl Confirmer for MockConfirmer {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.answer)
    }
}

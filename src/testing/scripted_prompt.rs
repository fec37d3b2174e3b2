use std::cell::RefCell;
use std::collections::VecDeque;

use crate::domain::AppError;
use crate::ports::OperatorPrompt;

/// Prompt double answering from a queue; an exhausted queue means the
/// operator cancelled.
#[derive(Default)]
pub struct ScriptedPrompt {
    inputs: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn with_inputs(answers: &[&str]) -> Self {
        Self {
            inputs: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn with_confirms(answers: &[bool]) -> Self {
        Self { confirms: RefCell::new(answers.iter().copied().collect()), ..Self::default() }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn input(&self, question: &str) -> Result<Option<String>, AppError> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.inputs.borrow_mut().pop_front())
    }

    fn confirm(&self, question: &str) -> Result<Option<bool>, AppError> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.confirms.borrow_mut().pop_front())
    }
}

use crate::domain::AppError;

/// Interactive questions to the operator.
///
/// `Ok(None)` means the operator cancelled; callers decide whether that is
/// an abort or a fall-through.
pub trait OperatorPrompt {
    fn input(&self, question: &str) -> Result<Option<String>, AppError>;

    fn confirm(&self, question: &str) -> Result<Option<bool>, AppError>;
}

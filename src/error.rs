use std::sync::Arc;

use thiserror::Error;

/// Computing the value of a property failed.
///
/// This is a hard failure: it aborts registration or validation of the task,
/// unlike a validation message which is merely collected.
#[derive(Debug, Error)]
#[error("Couldn't evaluate property '{property}' of task '{task}'.\n{source}")]
pub struct PropertyError {
    pub(crate) property: Arc<str>,
    pub(crate) task: Arc<str>,
    pub(crate) source: anyhow::Error,
}

impl PropertyError {
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn task(&self) -> &str {
        &self.task
    }
}

/// The declared properties of a task have problems, see
/// [`problems`](Self::problems).
#[derive(Debug, Error)]
#[error("{}", summary(.task, .problems))]
pub struct TaskValidationError {
    pub(crate) task: String,
    pub(crate) problems: Vec<String>,
}

impl TaskValidationError {
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

fn summary(task: &str, problems: &[String]) -> String {
    let mut text = match problems.len() {
        1 => format!("A problem was found with the configuration of task '{task}'."),
        _ => format!("Some problems were found with the configuration of task '{task}'."),
    };

    for problem in problems {
        text.push_str("\n - ");
        text.push_str(problem);
    }

    text
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Evaluation(#[from] PropertyError),

    #[error(transparent)]
    Invalid(#[from] TaskValidationError),
}

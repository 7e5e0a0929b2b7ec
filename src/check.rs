use crate::Task;
use crate::error::{CheckError, TaskValidationError};
use crate::validator::TaskValidator;

/// Runs every validator of `task` and fails if any of them found a problem.
///
/// Problems from all validators are reported together, in the order of
/// `validators`. Validators with nothing to validate are skipped.
pub fn check_task<T: Task>(task: &T, validators: &[&dyn TaskValidator<T>]) -> Result<(), CheckError> {
    let mut problems = Vec::new();

    for validator in validators {
        if validator.has_anything_to_validate() {
            validator.validate(task, &mut problems)?;
        }
    }

    if problems.is_empty() {
        tracing::trace!(task = task.path(), "task configuration is valid");
        return Ok(());
    }

    tracing::debug!(task = task.path(), problems = problems.len(), "task configuration is invalid");

    Err(TaskValidationError {
        task: task.path().to_string(),
        problems,
    }
    .into())
}

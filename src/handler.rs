//! Behaviour attached to declared properties, selected by capability.
//!
//! Every [`Capability`] maps to one [`PropertyActions`] table: a discovery
//! hook run once per task type, a content validation run per instance, and a
//! configure action run once for each change-detection bucket. Actions that do
//! not apply to a bucket are no-ops, so callers never filter by capability.

mod destroy;
mod input;
mod output;

use crate::core::Value;
use crate::deferred::DeferredValue;
use crate::descriptor::{Capability, PropertyInfo, StaticValidationMessage};
use crate::detection::ChangeDetection;

pub(crate) type AttachFn = fn(&PropertyInfo, &mut Vec<StaticValidationMessage>);
pub(crate) type ValidateFn = fn(&str, &Value, &mut Vec<String>);
pub(crate) type UpdateFn = fn(&mut dyn ChangeDetection, &PropertyInfo, DeferredValue);

#[derive(Clone, Copy)]
pub(crate) struct PropertyActions {
    /// Inspects the declaration when the validator for a task type is built.
    pub attach: AttachFn,
    pub validate: ValidateFn,
    pub configure: ConfigureAction,
}

#[derive(Clone, Copy)]
pub(crate) struct ConfigureAction {
    pub update_inputs: UpdateFn,
    pub update_outputs: UpdateFn,
    pub update_destroyables: UpdateFn,
}

impl ConfigureAction {
    pub const NONE: Self = Self {
        update_inputs: skip_update,
        update_outputs: skip_update,
        update_destroyables: skip_update,
    };
}

impl Capability {
    pub(crate) fn actions(self) -> PropertyActions {
        match self {
            Capability::Input(kind) => input::actions(kind),
            Capability::Output(kind) => output::actions(kind),
            Capability::Destroyable => destroy::ACTIONS,
        }
    }
}

fn skip_update(_: &mut dyn ChangeDetection, _: &PropertyInfo, _: DeferredValue) {}

/// Reports a file-kind property declared with a type that holds no file
/// location.
fn check_location_type(info: &PropertyInfo, messages: &mut Vec<StaticValidationMessage>) {
    let value_type = info.value_type();

    if !value_type.kind().is_file_like() {
        messages.push(StaticValidationMessage::new(
            info.name_arc().clone(),
            format!(
                "is declared as {} but has type {value_type}, which holds no file location; \
                 use a path or file collection type instead.",
                info.capability()
            ),
        ));
    }
}

fn no_validation(_: &str, _: &Value, _: &mut Vec<String>) {}

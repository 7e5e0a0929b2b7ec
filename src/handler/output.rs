use camino::Utf8Path;

use super::{ConfigureAction, PropertyActions, check_location_type};
use crate::core::Value;
use crate::deferred::DeferredValue;
use crate::descriptor::{OutputKind, PropertyInfo};
use crate::detection::{ChangeDetection, OutputRegistration};

/// The part of output handling that differs between output kinds.
trait OutputHandler {
    fn create(value: DeferredValue) -> OutputRegistration;

    fn validate(name: &str, value: &Value, messages: &mut Vec<String>);
}

struct FileOutput;
struct DirectoryOutput;
struct FilesOutput;
struct DirectoriesOutput;

impl OutputHandler for FileOutput {
    fn create(value: DeferredValue) -> OutputRegistration {
        OutputRegistration::file(value)
    }

    fn validate(name: &str, value: &Value, messages: &mut Vec<String>) {
        for path in value.files() {
            validate_file(name, path, messages);
        }
    }
}

impl OutputHandler for DirectoryOutput {
    fn create(value: DeferredValue) -> OutputRegistration {
        OutputRegistration::directory(value)
    }

    fn validate(name: &str, value: &Value, messages: &mut Vec<String>) {
        for path in value.files() {
            validate_directory(name, path, messages);
        }
    }
}

impl OutputHandler for FilesOutput {
    fn create(value: DeferredValue) -> OutputRegistration {
        OutputRegistration::files(value)
    }

    fn validate(name: &str, value: &Value, messages: &mut Vec<String>) {
        FileOutput::validate(name, value, messages);
    }
}

impl OutputHandler for DirectoriesOutput {
    fn create(value: DeferredValue) -> OutputRegistration {
        OutputRegistration::directories(value)
    }

    fn validate(name: &str, value: &Value, messages: &mut Vec<String>) {
        DirectoryOutput::validate(name, value, messages);
    }
}

pub(super) fn actions(kind: OutputKind) -> PropertyActions {
    match kind {
        OutputKind::File => actions_for::<FileOutput>(),
        OutputKind::Directory => actions_for::<DirectoryOutput>(),
        OutputKind::Files => actions_for::<FilesOutput>(),
        OutputKind::Directories => actions_for::<DirectoriesOutput>(),
    }
}

fn actions_for<H: OutputHandler>() -> PropertyActions {
    PropertyActions {
        attach: check_location_type,
        validate: H::validate,
        configure: ConfigureAction {
            update_outputs: update_outputs::<H>,
            ..ConfigureAction::NONE
        },
    }
}

fn update_outputs<H: OutputHandler>(
    outputs: &mut dyn ChangeDetection,
    info: &PropertyInfo,
    value: DeferredValue,
) {
    // Optionality is applied on top of whatever the kind-specific builder
    // produced, never inside it.
    let output = H::create(value)
        .with_property_name(info.name_arc().clone())
        .optional(info.is_optional());

    outputs.register_output(output);
}

fn validate_file(name: &str, path: &Utf8Path, messages: &mut Vec<String>) {
    if path.exists() {
        if path.is_dir() {
            messages.push(format!(
                "Cannot write to file '{path}' specified for property '{name}' as it is a directory."
            ));
        }
    } else if let Some(ancestor) = blocking_ancestor(path) {
        messages.push(format!(
            "Cannot write to file '{path}' specified for property '{name}', \
             as ancestor '{ancestor}' is not a directory."
        ));
    }
}

fn validate_directory(name: &str, path: &Utf8Path, messages: &mut Vec<String>) {
    if path.exists() {
        if !path.is_dir() {
            messages.push(format!(
                "Directory '{path}' specified for property '{name}' is not a directory."
            ));
        }
    } else if let Some(ancestor) = blocking_ancestor(path) {
        messages.push(format!(
            "Cannot write to directory '{path}' specified for property '{name}', \
             as ancestor '{ancestor}' is not a directory."
        ));
    }
}

/// The nearest existing ancestor of `path` that is not a directory, if any.
fn blocking_ancestor(path: &Utf8Path) -> Option<&Utf8Path> {
    path.ancestors()
        .skip(1)
        .take_while(|candidate| !candidate.is_dir())
        .find(|candidate| candidate.exists())
}

use camino::Utf8Path;

use super::{AttachFn, ConfigureAction, PropertyActions, ValidateFn, check_location_type, no_validation};
use crate::core::Value;
use crate::deferred::DeferredValue;
use crate::descriptor::{Capability, InputKind, PropertyInfo, StaticValidationMessage};
use crate::detection::{ChangeDetection, InputRegistration};

pub(super) fn actions(kind: InputKind) -> PropertyActions {
    let attach: AttachFn = match kind {
        InputKind::Property => check_declared_type,
        InputKind::File | InputKind::Directory | InputKind::Files => check_location_type,
    };

    let validate: ValidateFn = match kind {
        InputKind::Property | InputKind::Files => no_validation,
        InputKind::File => validate_file,
        InputKind::Directory => validate_directory,
    };

    PropertyActions {
        attach,
        validate,
        configure: ConfigureAction {
            update_inputs,
            ..ConfigureAction::NONE
        },
    }
}

fn update_inputs(inputs: &mut dyn ChangeDetection, info: &PropertyInfo, value: DeferredValue) {
    let Capability::Input(kind) = info.capability() else {
        return;
    };

    let input = InputRegistration::new(kind, value)
        .with_property_name(info.name_arc().clone())
        .optional(info.is_optional());

    inputs.register_input(input);
}

/// File-like values need existence and content tracking, which a plain input
/// compared by equality does not get.
fn check_declared_type(info: &PropertyInfo, messages: &mut Vec<StaticValidationMessage>) {
    let value_type = info.value_type();

    if value_type.kind().is_file_like() {
        messages.push(StaticValidationMessage::new(
            info.name_arc().clone(),
            format!(
                "is declared as a plain input but has file-like type {value_type}; \
                 declare it as an input file, directory or file collection instead."
            ),
        ));
    }
}

fn validate_file(name: &str, value: &Value, messages: &mut Vec<String>) {
    for path in value.files() {
        check_existing(name, path, "File", Utf8Path::is_file, "a file", messages);
    }
}

fn validate_directory(name: &str, value: &Value, messages: &mut Vec<String>) {
    for path in value.files() {
        check_existing(name, path, "Directory", Utf8Path::is_dir, "a directory", messages);
    }
}

fn check_existing(
    name: &str,
    path: &Utf8Path,
    noun: &str,
    is_kind: fn(&Utf8Path) -> bool,
    kind: &str,
    messages: &mut Vec<String>,
) {
    if !path.exists() {
        messages.push(format!(
            "{noun} '{path}' specified for property '{name}' does not exist."
        ));
    } else if !is_kind(path) {
        messages.push(format!(
            "{noun} '{path}' specified for property '{name}' is not {kind}."
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::TaskIo;
    use crate::fixture::{FakeTask, temp_dir};
    use crate::{FileCollection, PropertyDescriptor};
    use camino::Utf8PathBuf;
    use std::path::PathBuf;

    fn attach(descriptor: &PropertyDescriptor<FakeTask>) -> Vec<StaticValidationMessage> {
        let mut messages = Vec::new();
        (descriptor.actions().attach)(descriptor.info(), &mut messages);
        messages
    }

    #[test]
    fn test_plain_input_of_file_type_is_flagged() {
        let file = PropertyDescriptor::input("source", |t: &FakeTask| Ok(t.source.get()));
        let messages = attach(&file);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].property(), "source");
        assert!(messages[0].message().contains("file-like type"));
        assert!(messages[0].message().contains("Utf8PathBuf"));

        let path = PropertyDescriptor::input("path", |_: &FakeTask| Ok(None::<PathBuf>));
        assert_eq!(attach(&path).len(), 1);

        let collection =
            PropertyDescriptor::input("files", |_: &FakeTask| Ok(None::<FileCollection>));
        assert_eq!(attach(&collection).len(), 1);
    }

    #[test]
    fn test_plain_input_of_data_type_is_accepted() {
        let label = PropertyDescriptor::input("label", |t: &FakeTask| Ok(t.label.get()));
        assert!(attach(&label).is_empty());

        let source = PropertyDescriptor::input_file("source", |t: &FakeTask| Ok(t.source.get()));
        assert!(attach(&source).is_empty());

        let sources = PropertyDescriptor::input_files("sources", |t: &FakeTask| Ok(t.extras.get()));
        assert!(attach(&sources).is_empty());
    }

    #[test]
    fn test_file_input_of_data_type_is_flagged() {
        let file = PropertyDescriptor::input_file("source", |t: &FakeTask| Ok(t.label.get()));
        let messages = attach(&file);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].property(), "source");
        assert!(messages[0].message().starts_with("is declared as input file but has type"));
        assert!(messages[0].message().contains("String"));

        let directory = PropertyDescriptor::input_directory("assets", |t: &FakeTask| Ok(t.label.get()));
        assert_eq!(attach(&directory).len(), 1);
    }

    #[test]
    fn test_update_inputs_registers_only_inputs() {
        let descriptor =
            PropertyDescriptor::input_files("sources", |t: &FakeTask| Ok(t.extras.get())).optional();
        let configure = descriptor.actions().configure;
        let value = DeferredValue::from_fn("sources", ":t", || Ok(None));

        let mut io = TaskIo::new();
        (configure.update_inputs)(&mut io, descriptor.info(), value.clone());
        (configure.update_outputs)(&mut io, descriptor.info(), value.clone());
        (configure.update_destroyables)(&mut io, descriptor.info(), value);

        assert_eq!(io.inputs().len(), 1);
        assert!(io.outputs().is_empty());
        assert!(io.destroyables().is_empty());
        assert_eq!(io.inputs()[0].kind(), InputKind::Files);
        assert_eq!(io.inputs()[0].property_name(), "sources");
        assert!(io.inputs()[0].is_optional());
    }

    #[test]
    fn test_input_file_checks() {
        let (_guard, dir) = temp_dir();
        let file = dir.join("main.c");
        std::fs::write(&file, "int main;").unwrap();

        let mut messages = Vec::new();
        validate_file("source", &Value::File(file), &mut messages);
        assert!(messages.is_empty());

        validate_file("source", &Value::File(dir.join("missing.c")), &mut messages);
        validate_file("source", &Value::File(dir.clone()), &mut messages);
        assert_eq!(
            messages,
            vec![
                format!("File '{}' specified for property 'source' does not exist.", dir.join("missing.c")),
                format!("File '{}' specified for property 'source' is not a file.", dir),
            ]
        );
    }

    #[test]
    fn test_input_directory_checks() {
        let (_guard, dir) = temp_dir();
        let file: Utf8PathBuf = dir.join("notes.txt");
        std::fs::write(&file, "").unwrap();

        let mut messages = Vec::new();
        validate_directory("assets", &Value::File(dir.clone()), &mut messages);
        assert!(messages.is_empty());

        let missing = dir.join("missing");
        validate_directory("assets", &Value::File(file.clone()), &mut messages);
        validate_directory("assets", &Value::File(missing.clone()), &mut messages);
        assert_eq!(
            messages,
            vec![
                format!("Directory '{file}' specified for property 'assets' is not a directory."),
                format!("Directory '{missing}' specified for property 'assets' does not exist."),
            ]
        );
    }
}

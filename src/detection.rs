//! The change-detection side of registration.
//!
//! A [`ChangeDetection`] context receives one registration per declared
//! property and capability. Registrations only carry [`DeferredValue`]s, values
//! are computed by whoever consumes the context, e.g. the up-to-date check
//! before a task executes.

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::Utf8PathBuf;

use crate::core::{ArcStr, Hash32, Value};
use crate::deferred::DeferredValue;
use crate::descriptor::{InputKind, OutputKind};
use crate::error::PropertyError;

/// Receives the inputs, outputs and destroyables of a task.
pub trait ChangeDetection {
    fn register_input(&mut self, input: InputRegistration);

    fn register_output(&mut self, output: OutputRegistration);

    fn register_destroyable(&mut self, destroyable: DestroyableRegistration);
}

#[derive(Debug, Clone)]
pub struct InputRegistration {
    property: ArcStr,
    kind: InputKind,
    value: DeferredValue,
    optional: bool,
}

impl InputRegistration {
    pub fn new(kind: InputKind, value: DeferredValue) -> Self {
        Self {
            property: value.property_arc().clone(),
            kind,
            value,
            optional: false,
        }
    }

    pub fn with_property_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.property = name.into();
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn value(&self) -> &DeferredValue {
        &self.value
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// An output location of a task.
///
/// Created through one of the kind-specific constructors, then named and
/// marked optional by the caller:
///
/// ```rust
/// use kumiwake::{DeferredValue, OutputKind, OutputRegistration};
///
/// let value = DeferredValue::from_fn("reports", ":test", || Ok(None));
/// let output = OutputRegistration::directory(value)
///     .with_property_name("reportsDir")
///     .optional(true);
///
/// assert_eq!(output.kind(), OutputKind::Directory);
/// assert_eq!(output.property_name(), "reportsDir");
/// assert!(output.is_optional());
/// ```
#[derive(Debug, Clone)]
pub struct OutputRegistration {
    property: ArcStr,
    kind: OutputKind,
    value: DeferredValue,
    optional: bool,
}

impl OutputRegistration {
    fn new(kind: OutputKind, value: DeferredValue) -> Self {
        Self {
            property: value.property_arc().clone(),
            kind,
            value,
            optional: false,
        }
    }

    pub fn file(value: DeferredValue) -> Self {
        Self::new(OutputKind::File, value)
    }

    pub fn directory(value: DeferredValue) -> Self {
        Self::new(OutputKind::Directory, value)
    }

    pub fn files(value: DeferredValue) -> Self {
        Self::new(OutputKind::Files, value)
    }

    pub fn directories(value: DeferredValue) -> Self {
        Self::new(OutputKind::Directories, value)
    }

    pub fn with_property_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.property = name.into();
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn value(&self) -> &DeferredValue {
        &self.value
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

#[derive(Debug, Clone)]
pub struct DestroyableRegistration {
    property: ArcStr,
    value: DeferredValue,
}

impl DestroyableRegistration {
    pub fn new(value: DeferredValue) -> Self {
        Self {
            property: value.property_arc().clone(),
            value,
        }
    }

    pub fn with_property_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.property = name.into();
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &DeferredValue {
        &self.value
    }
}

/// In-memory [`ChangeDetection`] context holding the registrations of one
/// task instance.
#[derive(Debug, Clone, Default)]
pub struct TaskIo {
    inputs: Vec<InputRegistration>,
    outputs: Vec<OutputRegistration>,
    destroyables: Vec<DestroyableRegistration>,
}

impl ChangeDetection for TaskIo {
    fn register_input(&mut self, input: InputRegistration) {
        self.inputs.push(input);
    }

    fn register_output(&mut self, output: OutputRegistration) {
        self.outputs.push(output);
    }

    fn register_destroyable(&mut self, destroyable: DestroyableRegistration) {
        self.destroyables.push(destroyable);
    }
}

impl TaskIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[InputRegistration] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputRegistration] {
        &self.outputs
    }

    pub fn destroyables(&self) -> &[DestroyableRegistration] {
        &self.destroyables
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty() && self.destroyables.is_empty()
    }

    /// Current values of the plain input properties, keyed by name.
    pub fn input_properties(&self) -> Result<BTreeMap<String, Option<Value>>, PropertyError> {
        let mut properties = BTreeMap::new();

        for input in &self.inputs {
            if input.kind == InputKind::Property {
                properties.insert(input.property.to_string(), input.value.evaluate()?);
            }
        }

        Ok(properties)
    }

    /// Locations of all file, directory and file collection inputs.
    pub fn input_files(&self) -> Result<Vec<Utf8PathBuf>, PropertyError> {
        let values = self
            .inputs
            .iter()
            .filter(|input| input.kind != InputKind::Property)
            .map(|input| &input.value);

        collect_files(values)
    }

    pub fn output_files(&self) -> Result<Vec<Utf8PathBuf>, PropertyError> {
        collect_files(self.outputs.iter().map(|output| &output.value))
    }

    pub fn destroyable_files(&self) -> Result<Vec<Utf8PathBuf>, PropertyError> {
        collect_files(self.destroyables.iter().map(|destroyable| &destroyable.value))
    }

    /// Hashes the current values of every registered input.
    ///
    /// Inputs are visited by property name, so the fingerprint does not depend
    /// on the order of registration. Absent optional inputs do not contribute.
    /// File contents are not read, only the declared locations.
    pub fn fingerprint_inputs(&self) -> Result<Hash32, PropertyError> {
        let mut inputs: Vec<_> = self.inputs.iter().collect();
        inputs.sort_by(|a, b| a.property.cmp(&b.property));

        let mut hasher = blake3::Hasher::new();

        for input in inputs {
            let value = input.value.evaluate()?;

            if value.is_none() && input.optional {
                continue;
            }

            hasher.update(input.property.as_bytes());
            hasher.update(b"\0");

            match value {
                None => {
                    hasher.update(b"absent");
                }
                Some(Value::Data(data)) => {
                    hasher.update(b"data:");
                    hasher.update(data.to_string().as_bytes());
                }
                Some(Value::File(path)) => {
                    hasher.update(b"file:");
                    hasher.update(path.as_str().as_bytes());
                }
                Some(Value::Files(paths)) => {
                    hasher.update(b"files:");
                    for path in paths {
                        hasher.update(path.as_str().as_bytes());
                        hasher.update(b"\0");
                    }
                }
            }

            hasher.update(b"\xff");
        }

        let hash = Hash32::from(hasher.finalize());
        tracing::debug!(inputs = self.inputs.len(), %hash, "fingerprinted inputs");

        Ok(hash)
    }
}

fn collect_files<'a>(
    values: impl Iterator<Item = &'a DeferredValue>,
) -> Result<Vec<Utf8PathBuf>, PropertyError> {
    let mut files = Vec::new();

    for value in values {
        if let Some(value) = value.evaluate()? {
            files.extend_from_slice(value.files());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(property: &str, value: Option<Value>) -> DeferredValue {
        DeferredValue::from_fn(property, ":t", move || Ok(value.clone()))
    }

    fn data(text: &str) -> Option<Value> {
        Some(Value::Data(text.into()))
    }

    #[test]
    fn test_registration_builders() {
        let input = InputRegistration::new(InputKind::File, constant("src", None))
            .with_property_name("source")
            .optional(true);
        assert_eq!(input.property_name(), "source");
        assert_eq!(input.value().property(), "src");
        assert!(input.is_optional());

        let output = OutputRegistration::files(constant("out", None));
        assert_eq!(output.property_name(), "out");
        assert!(!output.is_optional());

        let destroyable = DestroyableRegistration::new(constant("tmp", None));
        assert_eq!(destroyable.property_name(), "tmp");
    }

    #[test]
    fn test_resolves_registered_files() {
        let mut io = TaskIo::new();
        assert!(io.is_empty());

        io.register_input(InputRegistration::new(InputKind::Property, constant("level", data("3"))));
        io.register_input(InputRegistration::new(
            InputKind::Files,
            constant("sources", Some(Value::Files(vec!["a.c".into(), "b.c".into()]))),
        ));
        io.register_output(OutputRegistration::file(constant(
            "binary",
            Some(Value::File("out/app".into())),
        )));
        io.register_output(OutputRegistration::directory(constant("docs", None)).optional(true));
        io.register_destroyable(DestroyableRegistration::new(constant(
            "stale",
            Some(Value::File("out/old".into())),
        )));

        assert_eq!(io.input_files().unwrap(), vec![Utf8PathBuf::from("a.c"), Utf8PathBuf::from("b.c")]);
        assert_eq!(io.output_files().unwrap(), vec![Utf8PathBuf::from("out/app")]);
        assert_eq!(io.destroyable_files().unwrap(), vec![Utf8PathBuf::from("out/old")]);

        let properties = io.input_properties().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties["level"], data("3"));
    }

    #[test]
    fn test_fingerprint_ignores_registration_order() {
        let mut first = TaskIo::new();
        first.register_input(InputRegistration::new(InputKind::Property, constant("a", data("1"))));
        first.register_input(InputRegistration::new(InputKind::Property, constant("b", data("2"))));

        let mut second = TaskIo::new();
        second.register_input(InputRegistration::new(InputKind::Property, constant("b", data("2"))));
        second.register_input(InputRegistration::new(InputKind::Property, constant("a", data("1"))));

        assert_eq!(
            first.fingerprint_inputs().unwrap(),
            second.fingerprint_inputs().unwrap()
        );
    }

    #[test]
    fn test_fingerprint_tracks_values() {
        let mut first = TaskIo::new();
        first.register_input(InputRegistration::new(InputKind::Property, constant("a", data("1"))));

        let mut second = TaskIo::new();
        second.register_input(InputRegistration::new(InputKind::Property, constant("a", data("2"))));

        assert_ne!(
            first.fingerprint_inputs().unwrap(),
            second.fingerprint_inputs().unwrap()
        );
    }

    #[test]
    fn test_fingerprint_skips_absent_optional_inputs() {
        let mut bare = TaskIo::new();
        bare.register_input(InputRegistration::new(InputKind::Property, constant("a", data("1"))));

        let mut with_optional = bare.clone();
        with_optional.register_input(
            InputRegistration::new(InputKind::Property, constant("b", None)).optional(true),
        );

        let mut with_required = bare.clone();
        with_required.register_input(InputRegistration::new(InputKind::Property, constant("b", None)));

        let hash = bare.fingerprint_inputs().unwrap();
        assert_eq!(hash, with_optional.fingerprint_inputs().unwrap());
        assert_ne!(hash, with_required.fingerprint_inputs().unwrap());
    }

    #[test]
    fn test_evaluation_failure_propagates() {
        let mut io = TaskIo::new();
        io.register_output(OutputRegistration::file(DeferredValue::from_fn(
            "binary",
            ":link",
            || Err(anyhow::anyhow!("linker script missing")),
        )));

        let error = io.output_files().unwrap_err();
        assert_eq!(error.property(), "binary");
        assert_eq!(error.task(), ":link");
    }
}

use std::sync::Arc;

use serde::Serialize;

use crate::Task;
use crate::core::{ArcStr, PropertyType, Value, ValueType};
use crate::deferred::PropertyValue;
use crate::error::PropertyError;
use crate::handler::PropertyActions;

/// How an input property participates in change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputKind {
    /// A plain value compared by equality.
    Property,
    /// A single file that must exist.
    File,
    /// A single directory that must exist.
    Directory,
    /// Any number of files.
    Files,
}

/// What a task writes for an output property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputKind {
    File,
    Directory,
    Files,
    Directories,
}

/// The role a property plays for its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    Input(InputKind),
    Output(OutputKind),
    /// A location the task removes as part of its work.
    Destroyable,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Capability::Input(InputKind::Property) => "input",
            Capability::Input(InputKind::File) => "input file",
            Capability::Input(InputKind::Directory) => "input directory",
            Capability::Input(InputKind::Files) => "input files",
            Capability::Output(OutputKind::File) => "output file",
            Capability::Output(OutputKind::Directory) => "output directory",
            Capability::Output(OutputKind::Files) => "output files",
            Capability::Output(OutputKind::Directories) => "output directories",
            Capability::Destroyable => "destroyable",
        };

        f.write_str(text)
    }
}

/// Everything known about a declared property without a task instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyInfo {
    name: ArcStr,
    value_type: ValueType,
    capability: Capability,
    optional: bool,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn name_arc(&self) -> &ArcStr {
        &self.name
    }
}

type Accessor<T> = Arc<dyn Fn(&T) -> anyhow::Result<Option<Value>> + Send + Sync>;

/// A declared property of the task type `T`: its name, type, capability and
/// the accessor used to read its current value from an instance.
///
/// ```rust
/// use camino::Utf8PathBuf;
/// use kumiwake::{Capability, OutputKind, Property, PropertyDescriptor, Task};
///
/// struct Archive {
///     destination: Property<Utf8PathBuf>,
/// }
///
/// impl Task for Archive {
///     fn path(&self) -> &str {
///         ":archive"
///     }
/// }
///
/// let descriptor = PropertyDescriptor::output_file("destination", |task: &Archive| {
///     Ok(task.destination.get())
/// });
///
/// assert_eq!(descriptor.name(), "destination");
/// assert_eq!(descriptor.capability(), Capability::Output(OutputKind::File));
/// ```
pub struct PropertyDescriptor<T> {
    info: PropertyInfo,
    accessor: Accessor<T>,
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> std::fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<T: Task> PropertyDescriptor<T> {
    pub fn new<V, F>(name: impl Into<Arc<str>>, capability: Capability, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        let accessor = move |task: &T| -> anyhow::Result<Option<Value>> {
            accessor(task)?.map(PropertyType::into_value).transpose()
        };

        Self {
            info: PropertyInfo {
                name: name.into(),
                value_type: ValueType::of::<V>(),
                capability,
                optional: false,
            },
            accessor: Arc::new(accessor),
        }
    }

    pub fn input<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Input(InputKind::Property), accessor)
    }

    pub fn input_file<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Input(InputKind::File), accessor)
    }

    pub fn input_directory<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Input(InputKind::Directory), accessor)
    }

    pub fn input_files<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Input(InputKind::Files), accessor)
    }

    pub fn output_file<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Output(OutputKind::File), accessor)
    }

    pub fn output_directory<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Output(OutputKind::Directory), accessor)
    }

    pub fn output_files<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Output(OutputKind::Files), accessor)
    }

    pub fn output_directories<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Output(OutputKind::Directories), accessor)
    }

    pub fn destroyable<V, F>(name: impl Into<Arc<str>>, accessor: F) -> Self
    where
        V: PropertyType,
        F: Fn(&T) -> anyhow::Result<Option<V>> + Send + Sync + 'static,
    {
        Self::new(name, Capability::Destroyable, accessor)
    }

    /// Allows the property to have no value.
    pub fn optional(mut self) -> Self {
        self.info.optional = true;
        self
    }

    /// Reads the current value of this property from `task`.
    pub(crate) fn value(&self, task: &T) -> Result<PropertyValue<'_>, PropertyError> {
        let value = self.read(task)?;
        Ok(PropertyValue::new(&self.info, self.actions().validate, value))
    }

    pub(crate) fn read(&self, task: &T) -> Result<Option<Value>, PropertyError> {
        tracing::trace!(property = self.name(), task = task.path(), "evaluating property");

        (self.accessor)(task).map_err(|source| PropertyError {
            property: self.info.name.clone(),
            task: task.path().into(),
            source,
        })
    }
}

impl<T> PropertyDescriptor<T> {
    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn info(&self) -> &PropertyInfo {
        &self.info
    }

    pub fn capability(&self) -> Capability {
        self.info.capability
    }

    pub fn value_type(&self) -> ValueType {
        self.info.value_type
    }

    pub fn is_optional(&self) -> bool {
        self.info.optional
    }

    /// The validation and configure actions selected by this property's
    /// capability.
    pub(crate) fn actions(&self) -> PropertyActions {
        self.info.capability.actions()
    }
}

/// A problem with a property declaration detected from its type alone.
///
/// These are found once, when the validator for a task type is built, and are
/// reported for every instance of that type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticValidationMessage {
    property: ArcStr,
    message: String,
}

impl StaticValidationMessage {
    pub fn new(property: impl Into<Arc<str>>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for StaticValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Property '{}' {}", self.property, self.message)
    }
}

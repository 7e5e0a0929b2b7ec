use std::sync::Arc;

use crate::Task;
use crate::deferred::{DeferredValue, PropertyValue};
use crate::descriptor::{PropertyDescriptor, PropertyInfo, StaticValidationMessage};
use crate::detection::ChangeDetection;
use crate::error::PropertyError;

/// Checks a task before it executes, collecting problems into `messages`.
///
/// Problems with the declared values are appended to `messages` and never
/// returned as errors. An `Err` means a property value could not be computed
/// at all, and the remaining checks were skipped.
pub trait TaskValidator<T>: Send + Sync {
    fn validate(&self, task: &T, messages: &mut Vec<String>) -> Result<(), PropertyError>;

    /// Whether calling [`validate`](Self::validate) can produce anything.
    fn has_anything_to_validate(&self) -> bool {
        true
    }
}

/// The registration and validation logic for every instance of the task type
/// `T`.
///
/// A `ClassValidator` is built once per task type, usually through a
/// [`ValidatorBuilder`], and is immutable afterwards. Properties are held
/// sorted by name, which fixes the order of registrations and of reported
/// problems.
///
/// ```rust
/// use std::sync::Arc;
///
/// use camino::Utf8PathBuf;
/// use kumiwake::{ClassValidator, Property, PropertyDescriptor, Task, TaskIo};
///
/// struct Compile {
///     optimize: Property<String>,
///     objects: Property<Utf8PathBuf>,
/// }
///
/// impl Task for Compile {
///     fn path(&self) -> &str {
///         ":compile"
///     }
/// }
///
/// let validator = ClassValidator::builder()
///     .property(PropertyDescriptor::input("optimize", |t: &Compile| Ok(t.optimize.get())))
///     .property(PropertyDescriptor::output_directory("objects", |t: &Compile| {
///         Ok(t.objects.get())
///     }))
///     .build();
///
/// let task = Arc::new(Compile {
///     optimize: Property::default(),
///     objects: Property::new(Utf8PathBuf::from("target/objects")),
/// });
///
/// let mut io = TaskIo::new();
/// validator.register_inputs_and_outputs(&mut io, &task);
/// assert_eq!(io.inputs().len(), 1);
/// assert_eq!(io.outputs().len(), 1);
///
/// let mut messages = Vec::new();
/// validator.validate(&task, &mut messages).unwrap();
/// assert_eq!(messages, ["No value has been specified for property 'optimize'."]);
/// ```
pub struct ClassValidator<T> {
    properties: Box<[PropertyDescriptor<T>]>,
    messages: Box<[StaticValidationMessage]>,
    cacheable: bool,
}

impl<T> std::fmt::Debug for ClassValidator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassValidator")
            .field("properties", &self.properties)
            .field("messages", &self.messages)
            .field("cacheable", &self.cacheable)
            .finish()
    }
}

impl<T: Task> ClassValidator<T> {
    /// Creates a validator from discovered properties and the problems found
    /// while discovering them.
    ///
    /// Properties may come in any order. If several share a name only the
    /// first one is kept.
    pub fn new(
        properties: impl IntoIterator<Item = PropertyDescriptor<T>>,
        messages: impl IntoIterator<Item = StaticValidationMessage>,
        cacheable: bool,
    ) -> Self {
        let properties = sorted_unique(properties);
        let messages: Box<[_]> = messages.into_iter().collect();

        tracing::debug!(
            task_type = std::any::type_name::<T>(),
            properties = properties.len(),
            messages = messages.len(),
            cacheable,
            "created class validator"
        );

        Self {
            properties: properties.into_boxed_slice(),
            messages,
            cacheable,
        }
    }

    pub fn builder() -> ValidatorBuilder<T> {
        ValidatorBuilder::new()
    }

    /// Registers every declared property of `task` with `context`, inputs
    /// first, then outputs, then destroyables.
    ///
    /// No property value is computed here, the context only receives
    /// [`DeferredValue`]s bound to `task`.
    pub fn register_inputs_and_outputs(&self, context: &mut dyn ChangeDetection, task: &Arc<T>) {
        tracing::debug!(
            task = task.path(),
            properties = self.properties.len(),
            "registering inputs and outputs"
        );

        self.add_inputs(context, task);
        self.add_outputs(context, task);
        self.add_destroyables(context, task);
    }

    pub fn add_inputs(&self, context: &mut dyn ChangeDetection, task: &Arc<T>) {
        for property in self.properties.iter() {
            let update = property.actions().configure.update_inputs;
            update(context, property.info(), DeferredValue::bind(property, task));
        }
    }

    pub fn add_outputs(&self, context: &mut dyn ChangeDetection, task: &Arc<T>) {
        for property in self.properties.iter() {
            let update = property.actions().configure.update_outputs;
            update(context, property.info(), DeferredValue::bind(property, task));
        }
    }

    pub fn add_destroyables(&self, context: &mut dyn ChangeDetection, task: &Arc<T>) {
        for property in self.properties.iter() {
            let update = property.actions().configure.update_destroyables;
            update(context, property.info(), DeferredValue::bind(property, task));
        }
    }

    /// Validates the declared properties of `task`.
    ///
    /// Static problems of the task type are reported first. Then every
    /// property is evaluated once and required properties without a value are
    /// reported, and only after that the content of the present values is
    /// checked. All problems are collected; a failing evaluation stops the walk
    /// and is returned as an error.
    pub fn validate(&self, task: &T, messages: &mut Vec<String>) -> Result<(), PropertyError> {
        messages.extend(self.messages.iter().map(ToString::to_string));

        let values = self
            .properties
            .iter()
            .map(|property| property.value(task))
            .collect::<Result<Vec<PropertyValue>, _>>()?;

        for value in &values {
            value.check_not_null(messages);
        }

        for value in &values {
            value.check_valid(messages);
        }

        Ok(())
    }

    /// Whether the task type declares any property at all.
    pub fn has_anything_to_validate(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn validation_messages(&self) -> &[StaticValidationMessage] {
        &self.messages
    }

    /// Whether outputs of this task type may be stored in a build cache.
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// The declared property table, e.g. for dumping as JSON.
    pub fn describe(&self) -> Vec<&PropertyInfo> {
        self.properties.iter().map(PropertyDescriptor::info).collect()
    }
}

impl<T: Task> TaskValidator<T> for ClassValidator<T> {
    fn validate(&self, task: &T, messages: &mut Vec<String>) -> Result<(), PropertyError> {
        ClassValidator::validate(self, task, messages)
    }

    fn has_anything_to_validate(&self) -> bool {
        ClassValidator::has_anything_to_validate(self)
    }
}

/// Declares the properties of a task type and builds its [`ClassValidator`].
///
/// Building runs the discovery checks of every property, which produce the
/// validator's static messages.
pub struct ValidatorBuilder<T> {
    properties: Vec<PropertyDescriptor<T>>,
    cacheable: bool,
}

impl<T: Task> ValidatorBuilder<T> {
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            cacheable: false,
        }
    }

    pub fn property(mut self, property: PropertyDescriptor<T>) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = PropertyDescriptor<T>>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    pub fn build(self) -> ClassValidator<T> {
        // Dropped duplicates must not leave static messages behind.
        let properties = sorted_unique(self.properties);
        let mut messages = Vec::new();

        for property in &properties {
            (property.actions().attach)(property.info(), &mut messages);
        }

        ClassValidator::new(properties, messages, self.cacheable)
    }
}

/// Sorts by name and keeps the first declaration of every name.
fn sorted_unique<T>(properties: impl IntoIterator<Item = PropertyDescriptor<T>>) -> Vec<PropertyDescriptor<T>> {
    let mut properties: Vec<_> = properties.into_iter().collect();
    properties.sort_by(|a, b| a.name().cmp(b.name()));
    properties.dedup_by(|later, earlier| {
        let duplicate = later.name() == earlier.name();
        if duplicate {
            tracing::warn!(
                task_type = std::any::type_name::<T>(),
                property = later.name(),
                "ignoring duplicate property declaration"
            );
        }
        duplicate
    });
    properties
}

impl<T: Task> Default for ValidatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;

use crate::Task;
use crate::core::{ArcStr, Value};
use crate::descriptor::{PropertyDescriptor, PropertyInfo};
use crate::error::PropertyError;
use crate::handler::ValidateFn;

type Compute = Arc<dyn Fn() -> Result<Option<Value>, PropertyError> + Send + Sync>;

/// The capability to compute a property value of one task instance, handed to
/// a [`ChangeDetection`](crate::ChangeDetection) context at registration time.
///
/// Nothing is computed until [`evaluate`](Self::evaluate) is called, and every
/// call reads the instance again: a task may still be reconfigured between
/// registration and execution.
#[derive(Clone)]
pub struct DeferredValue {
    property: ArcStr,
    task: ArcStr,
    compute: Compute,
}

impl DeferredValue {
    pub(crate) fn bind<T: Task>(descriptor: &PropertyDescriptor<T>, task: &Arc<T>) -> Self {
        let property = descriptor.info().name_arc().clone();
        let path = task.path().into();
        let descriptor = descriptor.clone();
        let task = Arc::clone(task);

        Self {
            property,
            task: path,
            compute: Arc::new(move || descriptor.read(&task)),
        }
    }

    /// Creates a deferred value from an arbitrary computation, failures are
    /// attributed to `property` of `task`.
    pub fn from_fn<F>(property: impl Into<Arc<str>>, task: impl Into<Arc<str>>, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        let property = property.into();
        let task = task.into();

        let compute = {
            let property = property.clone();
            let task = task.clone();
            move || {
                compute().map_err(|source| PropertyError {
                    property: property.clone(),
                    task: task.clone(),
                    source,
                })
            }
        };

        Self {
            property,
            task,
            compute: Arc::new(compute),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn evaluate(&self) -> Result<Option<Value>, PropertyError> {
        (self.compute)()
    }

    pub(crate) fn property_arc(&self) -> &ArcStr {
        &self.property
    }
}

impl std::fmt::Debug for DeferredValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeferredValue({self})")
    }
}

impl std::fmt::Display for DeferredValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "property '{}' of task '{}'", self.property, self.task)
    }
}

/// A property value evaluated once for a single validation pass.
pub struct PropertyValue<'a> {
    info: &'a PropertyInfo,
    validate: ValidateFn,
    value: Option<Value>,
}

impl<'a> PropertyValue<'a> {
    pub(crate) fn new(info: &'a PropertyInfo, validate: ValidateFn, value: Option<Value>) -> Self {
        Self {
            info,
            validate,
            value,
        }
    }

    pub fn info(&self) -> &PropertyInfo {
        self.info
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Reports a required property without a value.
    pub fn check_not_null(&self, messages: &mut Vec<String>) {
        if self.value.is_none() && !self.info.is_optional() {
            messages.push(format!(
                "No value has been specified for property '{}'.",
                self.info.name()
            ));
        }
    }

    /// Runs the content validation of the property's capability, absent
    /// values are never inspected.
    pub fn check_valid(&self, messages: &mut Vec<String>) {
        if let Some(value) = &self.value {
            (self.validate)(self.info.name(), value, messages);
        }
    }
}

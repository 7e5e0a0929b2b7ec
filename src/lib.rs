#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod check;
mod core;
mod deferred;
mod descriptor;
mod detection;
mod error;
mod handler;
mod property;
mod store;
mod task;
mod utils;
mod validator;

#[cfg(test)]
mod fixture;

pub use crate::check::check_task;
pub use crate::core::{FileCollection, Hash32, PropertyType, TypeKind, Value, ValueType};
pub use crate::deferred::{DeferredValue, PropertyValue};
pub use crate::descriptor::{
    Capability, InputKind, OutputKind, PropertyDescriptor, PropertyInfo, StaticValidationMessage,
};
pub use crate::detection::{
    ChangeDetection, DestroyableRegistration, InputRegistration, OutputRegistration, TaskIo,
};
pub use crate::error::*;
pub use crate::property::Property;
pub use crate::store::{DeclaredProperties, ValidatorStore};
pub use crate::task::Task;
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
pub use crate::validator::{ClassValidator, TaskValidator, ValidatorBuilder};

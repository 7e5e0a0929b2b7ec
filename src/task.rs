//! The task abstraction the validator works against.

/// A unit of build work whose properties can be registered and validated.
///
/// Implementors only need to provide an identity, everything else about the
/// task is described by the [`PropertyDescriptor`](crate::PropertyDescriptor)s
/// declared for its type.
pub trait Task: Send + Sync + 'static {
    /// Identity of this instance used in diagnostics, e.g. `:app:compile`.
    fn path(&self) -> &str;
}


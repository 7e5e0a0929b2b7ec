use std::sync::{PoisonError, RwLock};

/// A task property that may be set, changed or cleared at any point during
/// configuration.
///
/// Accessors registered with a validator usually read from these cells, so
/// the value observed during validation is whatever was set last, not the
/// value at registration time.
///
/// ```rust
/// use kumiwake::Property;
///
/// let target = Property::<String>::default();
/// assert_eq!(target.get(), None);
///
/// target.set("x86_64".to_string());
/// assert_eq!(target.get().as_deref(), Some("x86_64"));
/// ```
#[derive(Debug)]
pub struct Property<V> {
    value: RwLock<Option<V>>,
}

impl<V> Default for Property<V> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }
}

impl<V> Property<V> {
    pub fn new(value: V) -> Self {
        Self {
            value: RwLock::new(Some(value)),
        }
    }

    pub fn set(&self, value: V) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    pub fn clear(&self) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_present(&self) -> bool {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<V: Clone> Property<V> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> Option<V> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

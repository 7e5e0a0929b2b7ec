use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Task;
use crate::validator::{ClassValidator, ValidatorBuilder};

/// A task type that can list its own properties.
///
/// ```rust
/// use camino::Utf8PathBuf;
/// use kumiwake::{DeclaredProperties, Property, PropertyDescriptor, Task, ValidatorBuilder, ValidatorStore};
///
/// struct Mirror {
///     from: Property<Utf8PathBuf>,
///     into: Property<Utf8PathBuf>,
/// }
///
/// impl Task for Mirror {
///     fn path(&self) -> &str {
///         ":mirror"
///     }
/// }
///
/// impl DeclaredProperties for Mirror {
///     fn declare(builder: ValidatorBuilder<Self>) -> ValidatorBuilder<Self> {
///         builder
///             .property(PropertyDescriptor::input_directory("from", |t: &Mirror| Ok(t.from.get())))
///             .property(PropertyDescriptor::output_directory("into", |t: &Mirror| Ok(t.into.get())))
///     }
/// }
///
/// let store = ValidatorStore::new();
/// let validator = store.validator::<Mirror>();
/// assert_eq!(validator.properties().len(), 2);
/// ```
pub trait DeclaredProperties: Task + Sized {
    fn declare(builder: ValidatorBuilder<Self>) -> ValidatorBuilder<Self>;
}

type Dynamic = Arc<dyn Any + Send + Sync>;

/// Builds the [`ClassValidator`] of each task type at most once and shares it
/// between all instances of that type.
#[derive(Default)]
pub struct ValidatorStore {
    validators: RwLock<HashMap<TypeId, Dynamic>>,
}

impl ValidatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the validator of `T`, building it on first use.
    pub fn validator<T: DeclaredProperties>(&self) -> Arc<ClassValidator<T>> {
        let key = TypeId::of::<T>();

        if let Some(found) = self.read().get(&key) {
            return downcast(found.clone());
        }

        let mut validators = self.validators.write().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have won the race for the write lock.
        if let Some(found) = validators.get(&key) {
            return downcast(found.clone());
        }

        tracing::debug!(task_type = type_name::<T>(), "building validator");

        let validator = Arc::new(T::declare(ValidatorBuilder::new()).build());
        validators.insert(key, validator.clone());
        validator
    }

    /// Number of task types with a validator.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TypeId, Dynamic>> {
        self.validators.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ValidatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorStore")
            .field("validators", &self.len())
            .finish()
    }
}

/// # Panics
///
/// Never in practice, entries are only ever inserted under the `TypeId` of
/// the validator's own task type.
fn downcast<T: Task>(found: Dynamic) -> Arc<ClassValidator<T>> {
    match found.downcast::<ClassValidator<T>>() {
        Ok(validator) => validator,
        Err(_) => panic!("validator stored under the wrong type for {}", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyDescriptor;
    use crate::fixture::FakeTask;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DECLARED: AtomicUsize = AtomicUsize::new(0);

    impl DeclaredProperties for FakeTask {
        fn declare(builder: ValidatorBuilder<Self>) -> ValidatorBuilder<Self> {
            DECLARED.fetch_add(1, Ordering::SeqCst);
            builder
                .property(PropertyDescriptor::input("label", |t: &FakeTask| Ok(t.label.get())))
                .property(PropertyDescriptor::output_file("dest", |t: &FakeTask| Ok(t.dest.get())))
        }
    }

    struct Empty;

    impl Task for Empty {
        fn path(&self) -> &str {
            ":empty"
        }
    }

    impl DeclaredProperties for Empty {
        fn declare(builder: ValidatorBuilder<Self>) -> ValidatorBuilder<Self> {
            builder
        }
    }

    #[test]
    fn test_validator_is_built_once_per_type() {
        let store = ValidatorStore::new();
        assert!(store.is_empty());

        let before = DECLARED.load(Ordering::SeqCst);
        let first = store.validator::<FakeTask>();
        let second = store.validator::<FakeTask>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DECLARED.load(Ordering::SeqCst), before + 1);
        assert_eq!(first.properties().len(), 2);

        let empty = store.validator::<Empty>();
        assert!(!empty.has_anything_to_validate());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_lookups_share_one_validator() {
        use rayon::prelude::*;

        let store = ValidatorStore::new();
        let validators: Vec<_> = (0..32)
            .into_par_iter()
            .map(|_| store.validator::<Empty>())
            .collect();

        assert!(validators.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(store.len(), 1);
    }
}

use super::{ConfigureAction, PropertyActions, check_location_type, no_validation};
use crate::deferred::DeferredValue;
use crate::descriptor::PropertyInfo;
use crate::detection::{ChangeDetection, DestroyableRegistration};

pub(super) const ACTIONS: PropertyActions = PropertyActions {
    attach: check_location_type,
    validate: no_validation,
    configure: ConfigureAction {
        update_destroyables,
        ..ConfigureAction::NONE
    },
};

fn update_destroyables(
    destroyables: &mut dyn ChangeDetection,
    info: &PropertyInfo,
    value: DeferredValue,
) {
    let destroyable = DestroyableRegistration::new(value).with_property_name(info.name_arc().clone());
    destroyables.register_destroyable(destroyable);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyDescriptor;
    use crate::detection::TaskIo;
    use crate::fixture::FakeTask;

    #[test]
    fn test_registers_only_destroyables() {
        let descriptor = PropertyDescriptor::destroyable("stale", |t: &FakeTask| Ok(t.dest.get()));
        let configure = descriptor.actions().configure;
        let value = DeferredValue::from_fn("stale", ":clean", || Ok(None));

        let mut io = TaskIo::new();
        (configure.update_inputs)(&mut io, descriptor.info(), value.clone());
        (configure.update_outputs)(&mut io, descriptor.info(), value.clone());
        (configure.update_destroyables)(&mut io, descriptor.info(), value);

        assert!(io.inputs().is_empty());
        assert!(io.outputs().is_empty());
        assert_eq!(io.destroyables().len(), 1);
        assert_eq!(io.destroyables()[0].property_name(), "stale");
        assert_eq!(io.destroyables()[0].value().task(), ":clean");
    }

    #[test]
    fn test_destroyable_needs_location_type() {
        let mut messages = Vec::new();

        let stale = PropertyDescriptor::destroyable("stale", |t: &FakeTask| Ok(t.extras.get()));
        (stale.actions().attach)(stale.info(), &mut messages);
        assert!(messages.is_empty());

        let label = PropertyDescriptor::destroyable("label", |t: &FakeTask| Ok(t.label.get()));
        (label.actions().attach)(label.info(), &mut messages);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message().starts_with("is declared as destroyable"));
    }
}

use super::{InjectorPayload, Resolution};
use crate::error::Result;
use crate::reflect::ClassRef;
use indexmap::IndexMap;
use std::sync::Arc;

pub(crate) type Getter<C> = Arc<dyn Fn(InjectorPayload<C>) -> Result<Resolution> + Send + Sync>;

/// Member key inside one class: no member and an index is a constructor
/// parameter, a member and an index is a method parameter, a member without
/// index is a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Slot {
    pub(crate) member: Option<&'static str>,
    pub(crate) index: Option<usize>,
}

impl Slot {
    pub(crate) fn parameter(member: Option<&'static str>, index: usize) -> Self {
        Self {
            member,
            index: Some(index),
        }
    }

    pub(crate) fn property(name: &'static str) -> Self {
        Self {
            member: Some(name),
            index: None,
        }
    }
}

pub(crate) struct Registered<C> {
    pub(crate) declared: ClassRef,
    pub(crate) getter: Getter<C>,
}

impl<C> Clone for Registered<C> {
    fn clone(&self) -> Self {
        Self {
            declared: self.declared,
            getter: self.getter.clone(),
        }
    }
}

/// Getters of one injection domain. One getter per slot; re-binding overwrites.
pub(crate) struct GetterRepository<C> {
    classes: IndexMap<ClassRef, IndexMap<Slot, Registered<C>>>,
}

impl<C> Default for GetterRepository<C> {
    fn default() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }
}

impl<C> GetterRepository<C> {
    pub(crate) fn set(&mut self, class: ClassRef, slot: Slot, registered: Registered<C>) {
        self.classes
            .entry(class)
            .or_default()
            .insert(slot, registered);
    }

    pub(crate) fn get(&self, class: ClassRef, slot: Slot) -> Option<Registered<C>> {
        self.classes.get(&class)?.get(&slot).cloned()
    }

    /// Property getters of `class`, in registration order.
    pub(crate) fn properties(&self, class: ClassRef) -> Vec<(&'static str, Registered<C>)> {
        let Some(slots) = self.classes.get(&class) else {
            return Vec::new();
        };
        slots
            .iter()
            .filter_map(|(slot, registered)| match (slot.member, slot.index) {
                (Some(name), None) => Some((name, registered.clone())),
                _ => None,
            })
            .collect()
    }
}

//! Type-safe identifier wrapper, one monomorphization per entity kind so a
//! `Id<Tank>` can never be mistaken for an `Id<Shell>` at the call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
    inner: Uuid,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new() -> Self {
        Self {
            inner: Uuid::now_v7(),
            marker: PhantomData,
        }
    }

    pub fn from_uuid(inner: Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> Uuid {
        self.inner
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.inner)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tank;
    struct Shell;

    #[test]
    fn ids_of_same_kind_compare_by_uuid() {
        let a: Id<Tank> = Id::new();
        let b: Id<Tank> = a;
        assert_eq!(a, b);
    }

    #[test]
    fn ids_are_distinct_per_instance() {
        let a: Id<Tank> = Id::new();
        let b: Id<Tank> = Id::new();
        assert_ne!(a, b);
    }

    #[test]
    fn different_kinds_do_not_unify_at_compile_time() {
        let _a: Id<Tank> = Id::new();
        let _b: Id<Shell> = Id::new();
        // The point of this test is that the above two lines type-check
        // independently; Id<Tank> and Id<Shell> are distinct types.
    }
}

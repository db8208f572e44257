//! Runtime support for code generated by the `declsynth` attribute macros.
//!
//! The `hashable_*_existential` wrappers compare and hash `Box<dyn Trait>`
//! values whose concrete types are only known at runtime. They do it through
//! [`DynamicEquatable`] and [`DynamicHashable`], which every `T: Eq + Hash +
//! 'static` implements automatically. A trait opts in by naming
//! [`DynamicHashable`] as a supertrait:
//!
//! ```ignore
//! #[declsynth::hashable_sequence_of_existential(access = Public)]
//! pub trait Shape: declsynth::DynamicHashable {
//!     fn area(&self) -> u32;
//! }
//! ```
//!
//! Only the `mutable` shapes let callers replace the stored value. The others
//! are built with `new` and read through `Deref` or `wrapped_value()`:
//!
//! ```
//! mod shapes {
//!     #[declsynth::hashable_existential(access = Public)]
//!     #[declsynth::hashable_mutable_existential(access = Public)]
//!     pub trait Shape: declsynth::DynamicHashable {}
//!
//!     #[derive(PartialEq, Eq, Hash)]
//!     pub struct Sq(pub u32);
//!
//!     impl Shape for Sq {}
//! }
//!
//! let fixed = shapes::HashableShape::new(Box::new(shapes::Sq(1)));
//! assert!(fixed == shapes::HashableShape::new(Box::new(shapes::Sq(1))));
//! let _read: &Box<dyn shapes::Shape> = fixed.wrapped_value();
//!
//! let mut open = shapes::HashableMutableShape::new(Box::new(shapes::Sq(1)));
//! open.wrapped_value = Box::new(shapes::Sq(2));
//! *open = Box::new(shapes::Sq(3));
//! ```
//!
//! ```compile_fail
//! mod shapes {
//!     #[declsynth::hashable_existential(access = Public)]
//!     pub trait Shape: declsynth::DynamicHashable {}
//!
//!     #[derive(PartialEq, Eq, Hash)]
//!     pub struct Sq(pub u32);
//!
//!     impl Shape for Sq {}
//! }
//!
//! let mut fixed = shapes::HashableShape::new(Box::new(shapes::Sq(1)));
//! fixed.wrapped_value = Box::new(shapes::Sq(2));
//! ```
//!
//! ```compile_fail
//! mod shapes {
//!     #[declsynth::hashable_sequence_of_existential(access = Public)]
//!     pub trait Shape: declsynth::DynamicHashable {}
//!
//!     #[derive(PartialEq, Eq, Hash)]
//!     pub struct Sq(pub u32);
//!
//!     impl Shape for Sq {}
//! }
//!
//! let mut fixed = shapes::HashableSequenceOfShape::new(Vec::new());
//! fixed.push(Box::new(shapes::Sq(1)));
//! ```

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

pub use declsynth_macros::{
    bare_providing, hashable_existential, hashable_mutable_existential,
    hashable_mutable_optional_existential, hashable_mutable_sequence_of_existential,
    hashable_optional_existential, hashable_sequence_of_existential, with_bare_cases,
};

/// Equality across values whose concrete types may differ.
pub trait DynamicEquatable: Any {
    fn as_any(&self) -> &dyn Any;

    /// `true` only when `other` has the same concrete type and compares equal.
    fn is_equal_dynamic(&self, other: &dyn Any) -> bool;

    /// Concrete type of the value, even when called through a trait object.
    fn dynamic_type_id(&self) -> TypeId {
        Any::type_id(self.as_any())
    }
}

impl<T: Any + Eq> DynamicEquatable for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_equal_dynamic(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

/// Object-safe counterpart of [`Hash`].
pub trait DynamicHashable: DynamicEquatable {
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Any + Eq + Hash> DynamicHashable for T {
    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

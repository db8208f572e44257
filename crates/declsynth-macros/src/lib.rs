//! Attribute macros for declsynth
//!
//! Two families of directives:
//! - `#[bare_providing]` / `#[with_bare_cases]` on an enum: a data-less tag
//!   enum plus an accessor returning the tag of a value.
//! - `#[hashable_*_existential]` on an object-safe trait: a wrapper around
//!   `Box<dyn Trait>` (optional, sequence and mutable variants) that
//!   implements `PartialEq`, `Eq` and `Hash` through the runtime traits in
//!   the `declsynth` crate.
//!
//! Use these through the `declsynth` crate, which re-exports them next to
//! the traits the generated code names.

use declsynth_core::directive::DirectiveKind;
use proc_macro::TokenStream;

mod host;

/// Emit a tag enum (default name `Bare`) and a `bare()` accessor.
///
/// # Attributes
///
/// - `access = Private | Super | Crate | Public` - visibility of the generated
///   items; `access = None` forces no visibility; omitted means "same as the enum"
/// - `type_name = "..."` - name of the tag enum; the accessor is the same name
///   with a lower-case first letter
///
/// # Example
///
/// ```ignore
/// #[declsynth::bare_providing(type_name = "Kind")]
/// pub enum Event {
///     Key(char),
///     Resize { w: u16, h: u16 },
///     Quit,
/// }
///
/// assert_eq!(Event::Quit.kind(), Kind::Quit);
/// ```
#[proc_macro_attribute]
pub fn bare_providing(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::BareProviding, attr, input)
}

/// Like [`macro@bare_providing`] (default name `BareCase`), and also
/// implements `PartialEq` for the enum by comparing tags only.
///
/// **Important:** do not also derive `PartialEq` on the enum.
#[proc_macro_attribute]
pub fn with_bare_cases(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::WithBareCases, attr, input)
}

/// Wrapper `Hashable<Trait>` holding a `Box<dyn Trait>`.
///
/// The trait must have `declsynth::DynamicHashable` as a supertrait.
/// Takes an optional `access = ...` argument.
///
/// # Example
///
/// ```ignore
/// #[declsynth::hashable_existential(access = Public)]
/// pub trait Shape: declsynth::DynamicHashable {}
///
/// let a = HashableShape::new(Box::new(Circle { r: 1 }));
/// ```
#[proc_macro_attribute]
pub fn hashable_existential(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::HashableExistential, attr, input)
}

/// Wrapper `HashableOptional<Trait>` holding an `Option<Box<dyn Trait>>`.
#[proc_macro_attribute]
pub fn hashable_optional_existential(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::HashableOptionalExistential, attr, input)
}

/// Wrapper `HashableMutable<Trait>`; also implements `DerefMut`.
#[proc_macro_attribute]
pub fn hashable_mutable_existential(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::HashableMutableExistential, attr, input)
}

/// Wrapper `HashableMutableOptional<Trait>`.
#[proc_macro_attribute]
pub fn hashable_mutable_optional_existential(
    attr: TokenStream,
    input: TokenStream,
) -> TokenStream {
    host::expand_attribute(
        DirectiveKind::HashableMutableOptionalExistential,
        attr,
        input,
    )
}

/// Wrapper `HashableSequenceOf<Trait>` holding a `Vec<Box<dyn Trait>>`.
///
/// Two wrappers are equal when they have the same length and every pair of
/// elements is dynamically equal.
#[proc_macro_attribute]
pub fn hashable_sequence_of_existential(attr: TokenStream, input: TokenStream) -> TokenStream {
    host::expand_attribute(DirectiveKind::HashableSequenceOfExistential, attr, input)
}

/// Wrapper `HashableMutableSequenceOf<Trait>`.
#[proc_macro_attribute]
pub fn hashable_mutable_sequence_of_existential(
    attr: TokenStream,
    input: TokenStream,
) -> TokenStream {
    host::expand_attribute(
        DirectiveKind::HashableMutableSequenceOfExistential,
        attr,
        input,
    )
}

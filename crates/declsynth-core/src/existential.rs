//! Type-erased wrappers around `Box<dyn Trait>` with value equality and
//! hashing routed through the `declsynth` runtime traits.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Item};

use crate::access::{self, AccessLevel};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::Directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    Single,
    SequenceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperShape {
    pub storage: Storage,
    /// Only meaningful for `Storage::Single`.
    pub optional: bool,
    pub mutable: bool,
}

impl WrapperShape {
    pub const SINGLE: WrapperShape = WrapperShape {
        storage: Storage::Single,
        optional: false,
        mutable: false,
    };
    pub const SEQUENCE_OF: WrapperShape = WrapperShape {
        storage: Storage::SequenceOf,
        optional: false,
        mutable: false,
    };

    pub const fn optional(self) -> Self {
        WrapperShape {
            optional: true,
            ..self
        }
    }

    pub const fn mutable(self) -> Self {
        WrapperShape {
            mutable: true,
            ..self
        }
    }

    fn is_optional(self) -> bool {
        self.optional && self.storage == Storage::Single
    }

    pub fn prefix(self) -> &'static str {
        match (self.storage, self.mutable, self.is_optional()) {
            (Storage::Single, false, false) => "Hashable",
            (Storage::Single, false, true) => "HashableOptional",
            (Storage::Single, true, false) => "HashableMutable",
            (Storage::Single, true, true) => "HashableMutableOptional",
            (Storage::SequenceOf, false, _) => "HashableSequenceOf",
            (Storage::SequenceOf, true, _) => "HashableMutableSequenceOf",
        }
    }

    fn storage_type(self, interface: &Ident) -> TokenStream {
        let boxed = quote!(::std::boxed::Box<dyn #interface>);
        match self.storage {
            Storage::SequenceOf => quote!(::std::vec::Vec<#boxed>),
            Storage::Single if self.optional => quote!(::core::option::Option<#boxed>),
            Storage::Single => boxed,
        }
    }
}

pub fn wrapper_name(interface: &Ident, shape: WrapperShape) -> Ident {
    format_ident!("{}{}", shape.prefix(), interface)
}

pub fn synthesize_wrapper(
    interface: &Ident,
    resolved: Option<AccessLevel>,
    shape: WrapperShape,
    directive: &Directive,
) -> Result<Vec<Item>, Diagnostic> {
    let name = wrapper_name(interface, shape);
    let storage = shape.storage_type(interface);
    let vis = access::visibility_tokens(resolved);

    // Immutable shapes keep the field module-private and always get `new`.
    let constructor = if access::requires_explicit_constructor(resolved) {
        quote! {
            pub fn new(wrapped_value: #storage) -> Self {
                Self { wrapped_value }
            }
        }
    } else if !shape.mutable {
        quote! {
            #[allow(dead_code)]
            #vis fn new(wrapped_value: #storage) -> Self {
                Self { wrapped_value }
            }
        }
    } else {
        TokenStream::new()
    };
    let field_vis = if shape.mutable {
        vis.clone()
    } else {
        TokenStream::new()
    };

    let deref_mut = if shape.mutable {
        quote! {
            impl ::core::ops::DerefMut for #name {
                fn deref_mut(&mut self) -> &mut Self::Target {
                    &mut self.wrapped_value
                }
            }
        }
    } else {
        TokenStream::new()
    };

    let eq_body = equality_body(shape);
    let hash_body = hash_body(interface, shape);

    let tokens = quote! {
        #vis struct #name {
            #field_vis wrapped_value: #storage,
        }

        impl #name {
            #constructor

            #[allow(dead_code)]
            #vis fn wrapped_value(&self) -> &#storage {
                &self.wrapped_value
            }

            #[allow(dead_code)]
            #vis fn projected_value(&self) -> &Self {
                self
            }
        }

        impl ::core::ops::Deref for #name {
            type Target = #storage;

            fn deref(&self) -> &Self::Target {
                &self.wrapped_value
            }
        }

        #deref_mut

        #[automatically_derived]
        impl ::core::cmp::PartialEq for #name {
            fn eq(&self, other: &Self) -> bool {
                #eq_body
            }
        }

        #[automatically_derived]
        impl ::core::cmp::Eq for #name {}

        #[automatically_derived]
        impl ::core::hash::Hash for #name {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                #hash_body
            }
        }
    };

    let file: syn::File = syn::parse2(tokens).map_err(|_| {
        Diagnostic::error(
            DiagnosticKind::InvalidTypeName,
            directive.span,
            format!("Invalid type name: '{name}'."),
        )
    })?;

    tracing::debug!(
        interface = %interface,
        wrapper = %name,
        mutable = shape.mutable,
        "synthesized existential wrapper"
    );
    Ok(file.items)
}

fn dynamic_eq(lhs: TokenStream, rhs: TokenStream) -> TokenStream {
    quote! {
        ::declsynth::DynamicEquatable::is_equal_dynamic(
            #lhs,
            ::declsynth::DynamicEquatable::as_any(#rhs),
        )
    }
}

fn equality_body(shape: WrapperShape) -> TokenStream {
    match shape.storage {
        Storage::SequenceOf => {
            let each = dynamic_eq(quote!(&**lhs), quote!(&**rhs));
            quote! {
                self.wrapped_value.len() == other.wrapped_value.len()
                    && self
                        .wrapped_value
                        .iter()
                        .zip(other.wrapped_value.iter())
                        .all(|(lhs, rhs)| #each)
            }
        }
        Storage::Single if shape.optional => {
            let both = dynamic_eq(quote!(&**lhs), quote!(&**rhs));
            quote! {
                match (&self.wrapped_value, &other.wrapped_value) {
                    (::core::option::Option::Some(lhs), ::core::option::Option::Some(rhs)) => #both,
                    (::core::option::Option::None, ::core::option::Option::None) => true,
                    _ => false,
                }
            }
        }
        Storage::Single => dynamic_eq(quote!(&*self.wrapped_value), quote!(&*other.wrapped_value)),
    }
}

fn hash_value(value: TokenStream) -> TokenStream {
    quote! {
        ::core::hash::Hash::hash(&::declsynth::DynamicEquatable::dynamic_type_id(#value), state);
        ::declsynth::DynamicHashable::dyn_hash(#value, &mut *state);
    }
}

fn hash_body(interface: &Ident, shape: WrapperShape) -> TokenStream {
    match shape.storage {
        Storage::SequenceOf => quote! {
            ::core::hash::Hash::hash(&::core::any::TypeId::of::<dyn #interface>(), state);
            for element in &self.wrapped_value {
                ::declsynth::DynamicHashable::dyn_hash(&**element, &mut *state);
            }
        },
        Storage::Single if shape.optional => {
            let present = hash_value(quote!(&**value));
            quote! {
                match &self.wrapped_value {
                    ::core::option::Option::Some(value) => {
                        #present
                    }
                    ::core::option::Option::None => ::core::hash::Hash::hash(
                        &::core::any::TypeId::of::<
                            ::core::option::Option<::std::boxed::Box<dyn #interface>>,
                        >(),
                        state,
                    ),
                }
            }
        }
        Storage::Single => hash_value(quote!(&*self.wrapped_value)),
    }
}

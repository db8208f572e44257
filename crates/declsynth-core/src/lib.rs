//! Declaration synthesis engine behind the `declsynth` attribute macros.
//!
//! Every directive runs the same pipeline: scan the anchor item, parse the
//! directive arguments, check the anchor kind, resolve the access level of
//! the generated items, then lower through exactly one synthesizer. The
//! proc-macro crate and the `declsynth` CLI are thin hosts around
//! [`expand`] and [`source::expand_source`].

pub mod access;
pub mod bare;
pub mod diagnostics;
pub mod directive;
pub mod existential;
pub mod expand;
pub mod scan;
pub mod source;

mod util;

pub use expand::expand;

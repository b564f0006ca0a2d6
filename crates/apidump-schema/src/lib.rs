//! Shared type model for apidump.
//!
//! These are the values the scanner loads, the walker resolves and the
//! renderer prints: [`TypeHandle`]s with their declared members,
//! [`TypeRef`] type mentions and [`Modifiers`].

pub mod modifiers;
pub mod type_ref;
pub mod types;

// Re-exports
pub use modifiers::{Modifiers, UnknownModifier};
pub use type_ref::{Bindings, TypeRef, TypeRefError, Wildcard};
pub use types::*;

/// File suffix of a compiled unit (one JSON type descriptor) inside a
/// container, e.g. `java/util/HashMap.type.json`.
pub const UNIT_SUFFIX: &str = ".type.json";

/// Canonical name of the universal base type.
pub const OBJECT: &str = "java.lang.Object";

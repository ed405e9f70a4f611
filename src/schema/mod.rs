//! Configuration schema declaration and reflection
//!
//! A record's configurable surface is declared as a static table
//! ([`shape::FieldDecl`]) and reflected into an ordered metadata tree
//! ([`meta::MetaNode`]) that drives value resolution.

pub mod meta;
pub mod shape;

pub use meta::{ElementKind, MetaKind, MetaNode, reflect};
pub use shape::{Configurable, FieldDecl, Fields, ScalarKind, Shape};

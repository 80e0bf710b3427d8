//! Type system for the Have compiler.
//!
//! Every first-class and compound type of the target language is a value of
//! the [`Type`] sum type. Types know whether they are fully resolved, render
//! to canonical target text, report their [`Kind`], produce a zero-value
//! literal, and can be traversed child by child.
//!
//! # Architecture
//!
//! - [`ty`]: the `Type` enum, its composite payloads, and the type algebra
//! - [`simple`]: the closed set of builtin scalar types
//! - [`table`]: named-type declarations (`DeclId`), alias roots, method sets
//! - [`mangle`]: deterministic external names for generic instantiations

pub mod mangle;
pub mod simple;
pub mod table;
pub mod ty;

pub use mangle::{mangle_name, mangle_type};
pub use simple::SimpleType;
pub use table::{DeclId, Method, TypeDeclInfo, TypeTable};
pub use ty::{
    ArrayType, ChanDir, ChanType, CustomType, Field, FuncType, GenericInstanceType,
    GenericParamType, IfaceMethod, IfaceType, Kind, MapType, StructType, Type,
};

/// The blank identifier.
pub const BLANK: &str = "_";

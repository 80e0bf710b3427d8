//! Builtin scalar types.

use std::fmt;

/// One of the builtin type names of the target language.
///
/// The set is closed: the parser produces `Type::Simple` directly for these
/// names, so they never appear as named declarations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimpleType {
    Bool,
    Byte,
    Complex128,
    Complex64,
    Error,
    Float32,
    Float64,
    Int,
    Int16,
    Int32,
    Int64,
    Int8,
    Rune,
    String,
    Uint,
    Uint16,
    Uint32,
    Uint64,
    Uint8,
    Uintptr,
}

impl SimpleType {
    pub const ALL: [SimpleType; 20] = [
        SimpleType::Bool,
        SimpleType::Byte,
        SimpleType::Complex128,
        SimpleType::Complex64,
        SimpleType::Error,
        SimpleType::Float32,
        SimpleType::Float64,
        SimpleType::Int,
        SimpleType::Int16,
        SimpleType::Int32,
        SimpleType::Int64,
        SimpleType::Int8,
        SimpleType::Rune,
        SimpleType::String,
        SimpleType::Uint,
        SimpleType::Uint16,
        SimpleType::Uint32,
        SimpleType::Uint64,
        SimpleType::Uint8,
        SimpleType::Uintptr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimpleType::Bool => "bool",
            SimpleType::Byte => "byte",
            SimpleType::Complex128 => "complex128",
            SimpleType::Complex64 => "complex64",
            SimpleType::Error => "error",
            SimpleType::Float32 => "float32",
            SimpleType::Float64 => "float64",
            SimpleType::Int => "int",
            SimpleType::Int16 => "int16",
            SimpleType::Int32 => "int32",
            SimpleType::Int64 => "int64",
            SimpleType::Int8 => "int8",
            SimpleType::Rune => "rune",
            SimpleType::String => "string",
            SimpleType::Uint => "uint",
            SimpleType::Uint16 => "uint16",
            SimpleType::Uint32 => "uint32",
            SimpleType::Uint64 => "uint64",
            SimpleType::Uint8 => "uint8",
            SimpleType::Uintptr => "uintptr",
        }
    }

    pub fn from_name(name: &str) -> Option<SimpleType> {
        SimpleType::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SimpleType::Int
                | SimpleType::Int8
                | SimpleType::Int16
                | SimpleType::Int32
                | SimpleType::Int64
                | SimpleType::Uint
                | SimpleType::Uint8
                | SimpleType::Uint16
                | SimpleType::Uint32
                | SimpleType::Uint64
                | SimpleType::Uintptr
                | SimpleType::Byte
                | SimpleType::Rune
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, SimpleType::Float32 | SimpleType::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, SimpleType::Complex64 | SimpleType::Complex128)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Literal default for a value of this type.
    pub fn zero_value(self) -> &'static str {
        match self {
            SimpleType::String => "\"\"",
            SimpleType::Bool => "false",
            // `error` is an interface in the target language.
            SimpleType::Error => "nil",
            _ => "0",
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

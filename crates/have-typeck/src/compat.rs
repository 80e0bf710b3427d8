//! Assignability, method sets and operand classification.

use have_types::{FuncType, IfaceType, SimpleType, Type, TypeTable};
use rustc_hash::FxHashMap;

/// The builtin `error` interface as a method set.
fn error_iface() -> IfaceType {
    IfaceType {
        name: "error".to_string(),
        methods: vec![have_types::IfaceMethod {
            name: "Error".to_string(),
            ty: FuncType::new(vec![], vec![Type::string()]),
        }],
    }
}

/// Simple type at the root of `ty`, if any.
pub fn simple_root(table: &TypeTable, ty: &Type) -> Option<SimpleType> {
    match table.root_type(ty) {
        Type::Simple(s) => Some(*s),
        _ => None,
    }
}

pub fn is_bool(table: &TypeTable, ty: &Type) -> bool {
    simple_root(table, ty) == Some(SimpleType::Bool)
}

pub fn is_string(table: &TypeTable, ty: &Type) -> bool {
    simple_root(table, ty) == Some(SimpleType::String)
}

pub fn is_integer(table: &TypeTable, ty: &Type) -> bool {
    simple_root(table, ty).is_some_and(SimpleType::is_integer)
}

pub fn is_numeric(table: &TypeTable, ty: &Type) -> bool {
    simple_root(table, ty).is_some_and(SimpleType::is_numeric)
}

/// Types whose zero value is `nil`.
pub fn is_nilable(table: &TypeTable, ty: &Type) -> bool {
    matches!(
        table.root_type(ty),
        Type::Pointer(_)
            | Type::Slice(_)
            | Type::Map(_)
            | Type::Chan(_)
            | Type::Func(_)
            | Type::Interface(_)
            | Type::Simple(SimpleType::Error)
    )
}

/// Interface view of `ty`, if it is one (`error` included).
pub fn as_interface(table: &TypeTable, ty: &Type) -> Option<IfaceType> {
    match table.root_type(ty) {
        Type::Interface(i) => Some(i.clone()),
        Type::Simple(SimpleType::Error) => Some(error_iface()),
        _ => None,
    }
}

/// Methods callable on a value of type `ty`.
///
/// A named type contributes its value-receiver methods; a pointer to it
/// contributes all of them.
pub fn method_set(table: &TypeTable, ty: &Type) -> FxHashMap<String, FuncType> {
    let mut set = FxHashMap::default();
    if let Some(iface) = as_interface(table, ty) {
        for m in iface.methods {
            set.insert(m.name, m.ty);
        }
        return set;
    }
    let (decl, through_pointer) = match ty {
        Type::Custom(c) => (c.decl, false),
        Type::Pointer(to) => match to.as_ref() {
            Type::Custom(c) => (c.decl, true),
            _ => (None, false),
        },
        _ => (None, false),
    };
    if let Some(id) = decl {
        for (name, method) in &table.get(id).methods {
            if through_pointer || !method.ptr_receiver {
                set.insert(name.clone(), method.ty.clone());
            }
        }
    }
    set
}

/// Whether `ty` has every method of `iface` with an identical signature.
pub fn implements(table: &TypeTable, ty: &Type, iface: &IfaceType) -> bool {
    let methods = method_set(table, ty);
    iface
        .methods
        .iter()
        .all(|m| methods.get(&m.name) == Some(&m.ty))
}

fn is_named(ty: &Type) -> bool {
    matches!(ty, Type::Custom(_) | Type::Simple(_))
}

/// Whether a value of type `from` may be stored where `to` is required.
pub fn assignable(table: &TypeTable, from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    if let Some(iface) = as_interface(table, to) {
        return implements(table, from, &iface);
    }
    let from_root = table.root_type(from);
    let to_root = table.root_type(to);
    if (!is_named(from) || !is_named(to)) && from_root == to_root {
        return true;
    }
    // A bidirectional channel converts to either direction.
    if let (Type::Chan(f), Type::Chan(t)) = (from_root, to_root) {
        return f.dir == have_types::ChanDir::Both && f.of == t.of;
    }
    false
}

/// Whether an explicit conversion `to(x)` is legal for `x` of type `from`.
pub fn convertible(table: &TypeTable, from: &Type, to: &Type) -> bool {
    if assignable(table, from, to) {
        return true;
    }
    let from_root = table.root_type(from);
    let to_root = table.root_type(to);
    if from_root == to_root {
        return true;
    }
    if is_numeric(table, from) && is_numeric(table, to) {
        return true;
    }
    let bytes_or_runes = |t: &Type| {
        matches!(t, Type::Slice(of) if matches!(
            of.as_ref(),
            Type::Simple(SimpleType::Byte | SimpleType::Uint8 | SimpleType::Rune | SimpleType::Int32)
        ))
    };
    if is_string(table, to) && (is_integer(table, from) || bytes_or_runes(from_root)) {
        return true;
    }
    if is_string(table, from) && bytes_or_runes(to_root) {
        return true;
    }
    matches!((from_root, to_root), (Type::Pointer(a), Type::Pointer(b)) if table.root_type(a) == table.root_type(b))
}

/// Whether values of type `ty` may be compared with `==`.
pub fn comparable(table: &TypeTable, ty: &Type) -> bool {
    match table.root_type(ty) {
        Type::Slice(_) | Type::Map(_) | Type::Func(_) => false,
        Type::Array(a) => comparable(table, &a.of),
        Type::Struct(s) => s.fields.iter().all(|f| comparable(table, &f.ty)),
        _ => true,
    }
}

/// Whether values of type `ty` are ordered by `<`.
pub fn ordered(table: &TypeTable, ty: &Type) -> bool {
    simple_root(table, ty).is_some_and(|s| s.is_integer() || s.is_float() || s == SimpleType::String)
}

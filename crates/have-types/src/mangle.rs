//! External names for generic instantiations.
//!
//! `Pair[int, []string]` becomes `Pair_int_slice_string`. The suffix of each
//! argument is an identifier-safe token, so the result is a legal target
//! identifier and two structurally equal argument lists mangle identically.
//! Different lists can still collide (`[]int` and a type named `slice_int`);
//! the instantiation engine appends a suffix to keep external names unique.

use crate::ty::{ChanDir, Type};

/// Mangle a generic base name with its concrete arguments.
pub fn mangle_name(base: &str, args: &[Type]) -> String {
    let mut name = base.to_string();
    for arg in args {
        name.push('_');
        name.push_str(&mangle_type(arg));
    }
    name
}

/// Identifier-safe token for one type.
pub fn mangle_type(ty: &Type) -> String {
    match ty {
        Type::Simple(s) => s.name().to_string(),
        Type::Array(a) => format!("arr{}_{}", a.size, mangle_type(&a.of)),
        Type::Slice(of) => format!("slice_{}", mangle_type(of)),
        Type::Map(m) => format!("map_{}_{}", mangle_type(&m.by), mangle_type(&m.of)),
        Type::Pointer(to) => format!("ptr_{}", mangle_type(to)),
        Type::Chan(c) => {
            let prefix = match c.dir {
                ChanDir::Both => "chan",
                ChanDir::Receive => "recvchan",
                ChanDir::Send => "sendchan",
            };
            format!("{}_{}", prefix, mangle_type(&c.of))
        }
        Type::Func(f) => {
            let args: Vec<String> = f.args.iter().map(mangle_type).collect();
            let results: Vec<String> = f.results.iter().map(mangle_type).collect();
            let mut out = String::from("func");
            if !args.is_empty() {
                out.push('_');
                out.push_str(&args.join("_"));
            }
            if !results.is_empty() {
                out.push_str("_to_");
                out.push_str(&results.join("_"));
            }
            out
        }
        Type::Tuple(members) => {
            let parts: Vec<String> = members.iter().map(mangle_type).collect();
            format!("tuple_{}", parts.join("_"))
        }
        Type::Struct(s) if !s.name.is_empty() => s.name.clone(),
        Type::Struct(s) => {
            let parts: Vec<String> = s
                .fields
                .iter()
                .map(|f| format!("{}_{}", f.name, mangle_type(&f.ty)))
                .collect();
            format!("struct_{}", parts.join("_"))
        }
        Type::Interface(i) if !i.name.is_empty() => i.name.clone(),
        Type::Interface(i) => {
            let names: Vec<&str> = i.methods.iter().map(|m| m.name.as_str()).collect();
            format!("iface_{}", names.join("_"))
        }
        Type::Custom(c) => match &c.package {
            Some(pkg) => format!("{}_{}", pkg, c.name),
            None => c.name.clone(),
        },
        Type::GenericParam(p) => match &p.concrete {
            Some(concrete) => mangle_type(concrete),
            None => p.name.clone(),
        },
        Type::GenericInstance(g) => mangle_name(&g.name, &g.params),
        Type::Unknown => "unknown".to_string(),
    }
}

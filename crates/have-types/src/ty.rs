//! Type representation for the Have type system.
//!
//! `Type` is a plain value: two independently built types compare equal and
//! hash equally when they are structurally identical, which is what the
//! generics engine relies on for its instantiation keys.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::simple::SimpleType;
use crate::table::{DeclId, TypeTable};

/// Discriminant of a [`Type`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Simple,
    Array,
    Slice,
    Map,
    Pointer,
    Custom,
    Struct,
    Interface,
    Tuple,
    Func,
    Chan,
    /// Only ever seen inside an uninstantiated generic body.
    GenericParam,
    GenericInstance,
    Unknown,
}

/// A type of the target language.
///
/// - `Simple`: builtin scalar (`int`, `string`, `error`, ...)
/// - `Custom`: a named type, resolved through a [`TypeTable`] declaration
/// - `GenericParam` / `GenericInstance`: transient placeholders that the
///   generics engine replaces before a statement finishes negotiation
/// - `Unknown`: "infer me"; never known
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Simple(SimpleType),
    Array(ArrayType),
    Slice(Box<Type>),
    Map(MapType),
    Func(FuncType),
    Chan(ChanType),
    Pointer(Box<Type>),
    /// Multi-value carrier; exists only as the type of a call expression.
    Tuple(Vec<Type>),
    Struct(StructType),
    Interface(IfaceType),
    Custom(CustomType),
    GenericParam(GenericParamType),
    GenericInstance(GenericInstanceType),
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub size: usize,
    pub of: Box<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapType {
    pub by: Box<Type>,
    pub of: Box<Type>,
}

/// A function signature. When `variadic` is set, the last argument is a
/// slice type rendered as `...T`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FuncType {
    pub args: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Receive,
    Send,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChanType {
    pub of: Box<Type>,
    pub dir: ChanDir,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// A struct type. Fields keep declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructType {
    /// Name of the declaring statement; empty for anonymous structs.
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IfaceMethod {
    pub name: String,
    pub ty: FuncType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IfaceType {
    pub name: String,
    pub methods: Vec<IfaceMethod>,
}

/// A reference to a named type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomType {
    /// Base name, without the package qualifier.
    pub name: String,
    /// Import name for external types; `None` means local.
    pub package: Option<String>,
    /// Filled in by negotiation.
    pub decl: Option<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericParamType {
    pub name: String,
    pub concrete: Option<Box<Type>>,
}

/// `Name[A, B]` as written in source, before instantiation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericInstanceType {
    pub name: String,
    pub package: Option<String>,
    pub params: Vec<Type>,
}

impl Type {
    pub fn int() -> Type {
        Type::Simple(SimpleType::Int)
    }

    pub fn bool() -> Type {
        Type::Simple(SimpleType::Bool)
    }

    pub fn string() -> Type {
        Type::Simple(SimpleType::String)
    }

    pub fn float64() -> Type {
        Type::Simple(SimpleType::Float64)
    }

    pub fn rune() -> Type {
        Type::Simple(SimpleType::Rune)
    }

    pub fn slice(of: Type) -> Type {
        Type::Slice(Box::new(of))
    }

    pub fn array(size: usize, of: Type) -> Type {
        Type::Array(ArrayType {
            size,
            of: Box::new(of),
        })
    }

    pub fn map(by: Type, of: Type) -> Type {
        Type::Map(MapType {
            by: Box::new(by),
            of: Box::new(of),
        })
    }

    pub fn pointer(to: Type) -> Type {
        Type::Pointer(Box::new(to))
    }

    pub fn chan(of: Type, dir: ChanDir) -> Type {
        Type::Chan(ChanType {
            of: Box::new(of),
            dir,
        })
    }

    pub fn func(args: Vec<Type>, results: Vec<Type>) -> Type {
        Type::Func(FuncType {
            args,
            results,
            variadic: false,
        })
    }

    /// An unresolved reference to a local named type.
    pub fn named(name: impl Into<String>) -> Type {
        Type::Custom(CustomType {
            name: name.into(),
            package: None,
            decl: None,
        })
    }

    pub fn generic_param(name: impl Into<String>) -> Type {
        Type::GenericParam(GenericParamType {
            name: name.into(),
            concrete: None,
        })
    }

    pub fn generic_instance(name: impl Into<String>, params: Vec<Type>) -> Type {
        Type::GenericInstance(GenericInstanceType {
            name: name.into(),
            package: None,
            params,
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Simple(_) => Kind::Simple,
            Type::Array(_) => Kind::Array,
            Type::Slice(_) => Kind::Slice,
            Type::Map(_) => Kind::Map,
            Type::Func(_) => Kind::Func,
            Type::Chan(_) => Kind::Chan,
            Type::Pointer(_) => Kind::Pointer,
            Type::Tuple(_) => Kind::Tuple,
            Type::Struct(_) => Kind::Struct,
            Type::Interface(_) => Kind::Interface,
            Type::Custom(_) => Kind::Custom,
            Type::GenericParam(_) => Kind::GenericParam,
            Type::GenericInstance(_) => Kind::GenericInstance,
            Type::Unknown => Kind::Unknown,
        }
    }

    /// True when no inference is needed anywhere beneath this type.
    pub fn known(&self) -> bool {
        match self {
            Type::Unknown => false,
            Type::Simple(_) | Type::Custom(_) => true,
            Type::GenericParam(p) => p.concrete.as_ref().is_some_and(|c| c.known()),
            _ => {
                let mut known = true;
                self.map_subtypes(&mut |t: &Type| {
                    if !t.known() {
                        known = false;
                    }
                    // `known()` on the child already covers its own subtree.
                    false
                });
                known
            }
        }
    }

    /// Visit `self`, then its children while `visit` returns `true`.
    pub fn walk<F: FnMut(&Type) -> bool>(&self, visit: &mut F) {
        if visit(self) {
            self.map_subtypes(visit);
        }
    }

    /// Walk every direct child. A `Custom` type is a leaf: its declaration is
    /// traversed where it is declared, which keeps recursive types finite.
    pub fn map_subtypes<F: FnMut(&Type) -> bool>(&self, visit: &mut F) {
        match self {
            Type::Array(a) => a.of.walk(visit),
            Type::Slice(of) | Type::Pointer(of) => of.walk(visit),
            Type::Chan(c) => c.of.walk(visit),
            Type::Map(m) => {
                m.by.walk(visit);
                m.of.walk(visit);
            }
            Type::Func(f) => {
                for t in f.args.iter().chain(f.results.iter()) {
                    t.walk(visit);
                }
            }
            Type::Tuple(members) => {
                for t in members {
                    t.walk(visit);
                }
            }
            Type::Struct(s) => {
                for field in &s.fields {
                    field.ty.walk(visit);
                }
            }
            Type::Interface(i) => {
                for m in &i.methods {
                    for t in m.ty.args.iter().chain(m.ty.results.iter()) {
                        t.walk(visit);
                    }
                }
            }
            Type::GenericInstance(g) => {
                for t in &g.params {
                    t.walk(visit);
                }
            }
            Type::Simple(_) | Type::Custom(_) | Type::GenericParam(_) | Type::Unknown => {}
        }
    }

    /// Mutable access to every direct child, in the order `map_subtypes`
    /// visits them.
    pub fn subtypes_mut(&mut self) -> Vec<&mut Type> {
        match self {
            Type::Array(a) => vec![&mut *a.of],
            Type::Slice(of) | Type::Pointer(of) => vec![&mut **of],
            Type::Chan(c) => vec![&mut *c.of],
            Type::Map(m) => vec![&mut *m.by, &mut *m.of],
            Type::Func(f) => f.types_mut(),
            Type::Tuple(members) => members.iter_mut().collect(),
            Type::Struct(s) => s.fields.iter_mut().map(|f| &mut f.ty).collect(),
            Type::Interface(i) => i.methods.iter_mut().flat_map(|m| m.ty.types_mut()).collect(),
            Type::GenericInstance(g) => g.params.iter_mut().collect(),
            Type::Simple(_) | Type::Custom(_) | Type::GenericParam(_) | Type::Unknown => Vec::new(),
        }
    }

    /// Replace every generic parameter bound in `bindings` by its argument.
    pub fn substitute(&mut self, bindings: &FxHashMap<String, Type>) {
        if let Type::GenericParam(p) = self {
            if let Some(arg) = bindings.get(&p.name) {
                *self = arg.clone();
            }
            return;
        }
        for child in self.subtypes_mut() {
            child.substitute(bindings);
        }
    }

    /// True if a generic placeholder or an unknown type is reachable.
    pub fn has_placeholders(&self) -> bool {
        let mut found = false;
        self.walk(&mut |t: &Type| {
            if matches!(
                t,
                Type::GenericParam(_) | Type::GenericInstance(_) | Type::Unknown
            ) {
                found = true;
            }
            !found
        });
        found
    }

    /// Literal default value of this type in target text.
    ///
    /// # Panics
    ///
    /// Tuples have no storable zero value, and placeholders or unresolved
    /// named types must never reach generation.
    pub fn zero_value(&self, table: &TypeTable) -> String {
        match self {
            Type::Simple(s) => s.zero_value().to_string(),
            Type::Slice(_)
            | Type::Map(_)
            | Type::Chan(_)
            | Type::Func(_)
            | Type::Pointer(_)
            | Type::Interface(_)
            | Type::Unknown => "nil".to_string(),
            Type::Array(a) => {
                let zero = a.of.zero_value(table);
                let elems = vec![zero; a.size];
                format!("{}{{{}}}", self, elems.join(", "))
            }
            Type::Struct(s) if s.name.is_empty() => format!("{}{{}}", self),
            Type::Struct(s) => format!("{}{{}}", s.name),
            Type::Tuple(_) => panic!("tuple type `{}` has no zero value", self),
            Type::Custom(c) => match c.decl {
                Some(_) => table.root_type(self).zero_value(table),
                None => panic!("zero value of unresolved named type `{}`", self),
            },
            Type::GenericParam(p) => match &p.concrete {
                Some(concrete) => concrete.zero_value(table),
                None => panic!("zero value of uninstantiated generic parameter `{}`", p.name),
            },
            Type::GenericInstance(_) => {
                panic!("zero value of uninstantiated generic type `{}`", self)
            }
        }
    }
}

impl FuncType {
    pub fn new(args: Vec<Type>, results: Vec<Type>) -> Self {
        FuncType {
            args,
            results,
            variadic: false,
        }
    }

    fn types_mut(&mut self) -> Vec<&mut Type> {
        self.args.iter_mut().chain(self.results.iter_mut()).collect()
    }

    /// `(A, B) R` / `(A) (R1, R2)`: the signature without the `func` keyword.
    pub fn header(&self) -> String {
        let mut out = String::from("(");
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match arg {
                Type::Slice(of) if self.variadic && i + 1 == self.args.len() => {
                    out.push_str("...");
                    out.push_str(&of.to_string());
                }
                _ => out.push_str(&arg.to_string()),
            }
        }
        out.push(')');
        match self.results.as_slice() {
            [] => {}
            [single] => {
                out.push(' ');
                out.push_str(&single.to_string());
            }
            many => {
                out.push_str(" (");
                out.push_str(&join(many));
                out.push(')');
            }
        }
        out
    }
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl IfaceType {
    pub fn method(&self, name: &str) -> Option<&IfaceMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

fn join(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Simple(s) => write!(f, "{}", s),
            Type::Array(a) => write!(f, "[{}]{}", a.size, a.of),
            Type::Slice(of) => write!(f, "[]{}", of),
            Type::Map(m) => write!(f, "map[{}]{}", m.by, m.of),
            Type::Func(func) => write!(f, "func{}", func.header()),
            Type::Chan(c) => match c.dir {
                ChanDir::Both => write!(f, "chan {}", c.of),
                ChanDir::Receive => write!(f, "<-chan {}", c.of),
                ChanDir::Send => write!(f, "chan<- {}", c.of),
            },
            Type::Pointer(to) => write!(f, "*{}", to),
            Type::Tuple(members) => write!(f, "({})", join(members)),
            Type::Struct(s) => {
                let fields: Vec<String> = s
                    .fields
                    .iter()
                    .map(|field| format!("{} {}", field.name, field.ty))
                    .collect();
                write!(f, "struct {{{}}}", fields.join("; "))
            }
            Type::Interface(i) => {
                let methods: Vec<String> = i
                    .methods
                    .iter()
                    .map(|m| format!("{}{}", m.name, m.ty.header()))
                    .collect();
                write!(f, "interface{{{}}}", methods.join("; "))
            }
            Type::Custom(c) => match &c.package {
                Some(pkg) => write!(f, "{}.{}", pkg, c.name),
                None => write!(f, "{}", c.name),
            },
            Type::GenericParam(p) => match &p.concrete {
                Some(concrete) => write!(f, "{}", concrete),
                None => write!(f, "{}", p.name),
            },
            Type::GenericInstance(g) => {
                if let Some(pkg) = &g.package {
                    write!(f, "{}.", pkg)?;
                }
                write!(f, "{}[{}]", g.name, join(&g.params))
            }
            Type::Unknown => write!(f, "_"),
        }
    }
}

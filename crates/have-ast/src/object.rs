//! Named entities.
//!
//! Every identifier that negotiation resolves ends up pointing at an
//! [`Object`] in the compilation's [`ObjectArena`]. Objects are never removed;
//! an `ObjectId` stays valid for the whole compilation.

use have_common::Span;
use have_types::Type;

use crate::stmt::PackageHandle;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Index of a registered generic template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericId(pub u32);

#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub span: Span,
    pub kind: ObjectKind,
}

#[derive(Clone, Debug)]
pub enum ObjectKind {
    /// A variable or function. Functions carry a `Type::Func`.
    Var(Type),
    /// A named type; the payload is the type an identifier naming it denotes.
    TypeName(Type),
    Package(PackageHandle),
    Label,
    Generic(GenericId),
    Builtin(Builtin),
}

/// Functions built into the target language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Println,
    Len,
    Cap,
    Append,
    Panic,
    Make,
    New,
    Delete,
    Copy,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Print,
        Builtin::Println,
        Builtin::Len,
        Builtin::Cap,
        Builtin::Append,
        Builtin::Panic,
        Builtin::Make,
        Builtin::New,
        Builtin::Delete,
        Builtin::Copy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Println => "println",
            Builtin::Len => "len",
            Builtin::Cap => "cap",
            Builtin::Append => "append",
            Builtin::Panic => "panic",
            Builtin::Make => "make",
            Builtin::New => "new",
            Builtin::Delete => "delete",
            Builtin::Copy => "copy",
        }
    }
}

impl Object {
    /// The value type of a variable, if this is one.
    pub fn var_type(&self) -> Option<&Type> {
        match &self.kind {
            ObjectKind::Var(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self.kind {
            ObjectKind::Var(_) => "variable",
            ObjectKind::TypeName(_) => "type",
            ObjectKind::Package(_) => "package",
            ObjectKind::Label => "label",
            ObjectKind::Generic(_) => "generic",
            ObjectKind::Builtin(_) => "builtin function",
        }
    }
}

#[derive(Debug, Default)]
pub struct ObjectArena {
    objects: Vec<Object>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, name: impl Into<String>, span: Span, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Object {
            name: name.into(),
            span,
            kind,
        });
        id
    }

    pub fn get(&self, id: ObjectId) -> &Object {
        &self.objects[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_ids_are_stable() {
        let mut arena = ObjectArena::new();
        let a = arena.alloc("a", Span::new(0, 1), ObjectKind::Var(Type::int()));
        let b = arena.alloc("b", Span::new(2, 3), ObjectKind::Label);
        assert_ne!(a, b);
        assert_eq!(arena.get(a).name, "a");
        assert_eq!(arena.get(a).var_type(), Some(&Type::int()));
        assert_eq!(arena.get(b).describe(), "label");

        arena.get_mut(a).kind = ObjectKind::Var(Type::string());
        assert_eq!(arena.get(a).var_type(), Some(&Type::string()));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn builtin_names() {
        let names: Vec<&str> = Builtin::ALL.iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            ["print", "println", "len", "cap", "append", "panic", "make", "new", "delete", "copy"]
        );
    }
}

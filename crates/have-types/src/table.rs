//! Named-type declarations.
//!
//! Every `type Name ...`, `struct Name`, `interface Name` and every generic
//! struct instantiation gets one [`TypeDeclInfo`] slot in the per-compilation
//! [`TypeTable`]. A [`CustomType`](crate::ty::CustomType) refers to its slot
//! through a [`DeclId`].

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ty::{FuncType, Type};

/// Index of a named-type declaration in a [`TypeTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// A method attached to a named type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub ty: FuncType,
    pub ptr_receiver: bool,
}

#[derive(Clone, Debug)]
pub struct TypeDeclInfo {
    pub name: String,
    pub package: Option<String>,
    /// The declared underlying type. `Unknown` until negotiation fills it.
    pub aliased: Type,
    pub methods: FxHashMap<String, Method>,
}

#[derive(Debug, Default)]
pub struct TypeTable {
    decls: Vec<TypeDeclInfo>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, package: Option<String>, aliased: Type) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(TypeDeclInfo {
            name: name.into(),
            package,
            aliased,
            methods: FxHashMap::default(),
        });
        id
    }

    pub fn get(&self, id: DeclId) -> &TypeDeclInfo {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut TypeDeclInfo {
        &mut self.decls[id.0 as usize]
    }

    pub fn set_aliased(&mut self, id: DeclId, aliased: Type) {
        self.get_mut(id).aliased = aliased;
    }

    /// Attach a method. Returns `false` if the name was already taken.
    pub fn add_method(&mut self, id: DeclId, name: impl Into<String>, method: Method) -> bool {
        let methods = &mut self.get_mut(id).methods;
        let name = name.into();
        if methods.contains_key(&name) {
            return false;
        }
        methods.insert(name, method);
        true
    }

    pub fn method(&self, id: DeclId, name: &str) -> Option<&Method> {
        self.get(id).methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// The first non-alias type reached by following named declarations.
    ///
    /// Callers must have ruled out cycles with
    /// [`containment_cycle`](Self::containment_cycle);
    /// on a cyclic chain this does not return.
    pub fn root_type<'a>(&'a self, ty: &'a Type) -> &'a Type {
        let mut current = ty;
        while let Type::Custom(c) = current {
            match c.decl {
                Some(id) => current = &self.get(id).aliased,
                None => break,
            }
        }
        current
    }

    /// The declaration a possibly named type ultimately refers to, if any.
    pub fn decl_of(&self, ty: &Type) -> Option<DeclId> {
        match ty {
            Type::Custom(c) => c.decl,
            Type::Pointer(to) => match to.as_ref() {
                Type::Custom(c) => c.decl,
                _ => None,
            },
            _ => None,
        }
    }

    /// Names along a cycle of declarations reachable from `id` that contain
    /// each other by value: through alias chains, array elements and struct
    /// fields. Slices, maps, pointers, channels, functions and interfaces
    /// break a cycle.
    pub fn containment_cycle(&self, id: DeclId) -> Option<Vec<String>> {
        let mut path = Vec::new();
        let mut done = FxHashSet::default();
        self.find_cycle(id, &mut path, &mut done)
            .map(|cycle| cycle.iter().map(|&d| self.get(d).name.clone()).collect())
    }

    fn find_cycle(&self, id: DeclId, path: &mut Vec<DeclId>, done: &mut FxHashSet<DeclId>) -> Option<Vec<DeclId>> {
        if let Some(pos) = path.iter().position(|&seen| seen == id) {
            return Some(path[pos..].to_vec());
        }
        if done.contains(&id) {
            return None;
        }
        path.push(id);
        let mut contained = Vec::new();
        contained_by_value(&self.get(id).aliased, &mut contained);
        for next in contained {
            if let Some(cycle) = self.find_cycle(next, path, done) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(id);
        None
    }
}

fn contained_by_value(ty: &Type, out: &mut Vec<DeclId>) {
    match ty {
        Type::Custom(c) => out.extend(c.decl),
        Type::Array(a) => contained_by_value(&a.of, out),
        Type::Struct(s) => {
            for field in &s.fields {
                contained_by_value(&field.ty, out);
            }
        }
        Type::Tuple(members) => {
            for member in members {
                contained_by_value(member, out);
            }
        }
        Type::GenericParam(p) => {
            if let Some(concrete) = &p.concrete {
                contained_by_value(concrete, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{CustomType, Field, StructType};

    fn named(table: &TypeTable, id: DeclId) -> Type {
        Type::Custom(CustomType {
            name: table.get(id).name.clone(),
            package: None,
            decl: Some(id),
        })
    }

    #[test]
    fn root_type_follows_chain() {
        let mut table = TypeTable::new();
        let a = table.declare("A", None, Type::int());
        let b = table.declare("B", None, Type::Unknown);
        let b_aliased = named(&table, a);
        table.set_aliased(b, b_aliased);

        let b_ty = named(&table, b);
        assert_eq!(table.root_type(&b_ty), &Type::int());
        assert_eq!(table.containment_cycle(b), None);
    }

    #[test]
    fn two_element_cycle_is_detected() {
        let mut table = TypeTable::new();
        let a = table.declare("A", None, Type::Unknown);
        let b = table.declare("B", None, Type::Unknown);
        let to_b = named(&table, b);
        let to_a = named(&table, a);
        table.set_aliased(a, to_b);
        table.set_aliased(b, to_a);

        assert_eq!(table.containment_cycle(a), Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(table.containment_cycle(b), Some(vec!["B".to_string(), "A".to_string()]));
    }

    #[test]
    fn cycle_reached_through_a_tail() {
        let mut table = TypeTable::new();
        let head = table.declare("Head", None, Type::Unknown);
        let a = table.declare("A", None, Type::Unknown);
        let to_a = named(&table, a);
        table.set_aliased(head, to_a.clone());
        table.set_aliased(a, to_a);

        assert_eq!(table.containment_cycle(head), Some(vec!["A".to_string()]));
    }

    #[test]
    fn array_of_itself_is_a_cycle() {
        let mut table = TypeTable::new();
        let a = table.declare("A", None, Type::Unknown);
        let elem = named(&table, a);
        table.set_aliased(a, Type::array(1, elem));

        assert_eq!(table.containment_cycle(a), Some(vec!["A".to_string()]));
    }

    #[test]
    fn struct_fields_form_cycles_but_pointers_break_them() {
        let mut table = TypeTable::new();
        let node = table.declare("Node", None, Type::Unknown);
        let wrap = table.declare("Wrap", None, Type::Unknown);
        let to_node = named(&table, node);
        let to_wrap = named(&table, wrap);
        table.set_aliased(
            node,
            Type::Struct(StructType {
                name: "Node".into(),
                fields: vec![
                    Field { name: "next".into(), ty: Type::pointer(to_node.clone()) },
                    Field { name: "kids".into(), ty: Type::slice(to_node.clone()) },
                ],
            }),
        );
        assert_eq!(table.containment_cycle(node), None);

        table.set_aliased(
            wrap,
            Type::Struct(StructType {
                name: "Wrap".into(),
                fields: vec![Field { name: "inner".into(), ty: Type::array(2, to_wrap) }],
            }),
        );
        assert_eq!(table.containment_cycle(wrap), Some(vec!["Wrap".to_string()]));
    }

    #[test]
    fn methods_are_unique_per_type() {
        let mut table = TypeTable::new();
        let id = table.declare("Counter", None, Type::int());
        let m = Method {
            ty: FuncType::new(vec![], vec![Type::int()]),
            ptr_receiver: true,
        };
        assert!(table.add_method(id, "Get", m.clone()));
        assert!(!table.add_method(id, "Get", m));
        assert!(table.method(id, "Get").is_some_and(|m| m.ptr_receiver));
        assert!(table.method(id, "Set").is_none());
    }
}

//! Memoized generic instantiation.
//!
//! A request for `Name[A, B]` is keyed by the template and the structural
//! value of its arguments. The cache entry is inserted as `InProgress` before
//! the template body is re-parsed and negotiated, so a body that refers to
//! its own instantiation (a linked list of `List[T]`, a recursive function)
//! sees the reserved name and object instead of re-entering.
//!
//! Failed instantiations stay cached as `Failed`; a repeated request returns
//! the same errors without retrying.
//!
//! Every instantiation owns a distinct external name. When the mangled name
//! is already taken by a top-level declaration or another instantiation, a
//! numeric suffix is appended.

use have_ast::walk::generic_body_types_mut;
use have_ast::{GenericBody, GenericId, GenericTemplate, ObjectId, ObjectKind, Stmt, StmtKind};
use have_common::{ParseError, Span};
use have_types::{mangle_name, CustomType, DeclId, Type};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::context::TypesContext;
use crate::error::TypeError;

/// Produces the body of one instantiation from a template.
///
/// Implementations re-parse `template.code` with every parameter replaced by
/// its argument's canonical text, or do the equivalent on an already parsed
/// body.
pub trait TemplateParser {
    fn parse_instance(
        &self,
        template: &GenericTemplate,
        args: &[Type],
    ) -> Result<GenericBody, ParseError>;
}

/// Substitutes arguments into the template's parsed body.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstitutingParser;

impl TemplateParser for SubstitutingParser {
    fn parse_instance(
        &self,
        template: &GenericTemplate,
        args: &[Type],
    ) -> Result<GenericBody, ParseError> {
        let bindings: FxHashMap<String, Type> = template
            .params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        let mut body = template.body.clone();
        generic_body_types_mut(&mut body, &mut |t: &mut Type| t.substitute(&bindings));
        Ok(body)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstKey {
    pub template: GenericId,
    pub args: Vec<Type>,
}

/// What a finished or in-flight instantiation resolves to.
#[derive(Clone, Debug)]
pub struct InstRef {
    pub name: String,
    pub object: ObjectId,
    /// Declaration of an instantiated struct.
    pub decl: Option<DeclId>,
}

impl InstRef {
    /// The named type of a struct instantiation.
    pub fn as_type(&self) -> Option<Type> {
        self.decl.map(|decl| {
            Type::Custom(CustomType {
                name: self.name.clone(),
                package: None,
                decl: Some(decl),
            })
        })
    }
}

#[derive(Clone, Debug)]
pub struct Instantiation {
    pub key: InstKey,
    pub target: InstRef,
    /// The negotiated declaration, ready for generation.
    pub stmt: Stmt,
}

#[derive(Clone, Debug)]
pub enum InstState {
    InProgress(InstRef),
    Complete(Instantiation),
    Failed(Vec<TypeError>),
}

impl TypesContext {
    pub fn template(&self, id: GenericId) -> &GenericTemplate {
        &self.templates[id.0 as usize]
    }

    pub(crate) fn register_template(&mut self, template: GenericTemplate) -> GenericId {
        let id = GenericId(self.templates.len() as u32);
        self.templates.push(template);
        id
    }

    /// Completed instantiations in first-request order.
    pub fn instantiations(&self) -> impl Iterator<Item = &Instantiation> {
        self.inst_order
            .iter()
            .filter_map(|key| match self.instances.get(key) {
                Some(InstState::Complete(inst)) => Some(inst),
                _ => None,
            })
    }

    pub fn inst_state(&self, key: &InstKey) -> Option<&InstState> {
        self.instances.get(key)
    }

    /// Instantiate template `id` with fully resolved `args`.
    pub fn instantiate(
        &mut self,
        id: GenericId,
        args: Vec<Type>,
        span: Span,
    ) -> Result<InstRef, TypeError> {
        let template = self.template(id);
        let base = template.name.clone();
        let is_struct = template.is_struct();
        if template.params.len() != args.len() {
            return Err(TypeError::GenericArity {
                name: base,
                expected: template.params.len(),
                found: args.len(),
                span,
            });
        }

        let key = InstKey { template: id, args };
        match self.instances.get(&key) {
            Some(InstState::InProgress(target)) => {
                trace!(name = %target.name, "instantiation in progress, reusing reservation");
                return Ok(target.clone());
            }
            Some(InstState::Complete(inst)) => {
                trace!(name = %inst.target.name, "instantiation cache hit");
                return Ok(inst.target.clone());
            }
            Some(InstState::Failed(errors)) => {
                debug!(generic = %base, "repeated request for failed instantiation");
                return Err(TypeError::Instantiation {
                    name: base,
                    span,
                    errors: errors.clone(),
                });
            }
            None => {}
        }

        if self.depth >= self.config.max_instantiation_depth {
            return Err(TypeError::InstantiationDepth {
                name: base,
                limit: self.config.max_instantiation_depth,
                span,
            });
        }

        let name = self.free_instance_name(mangle_name(&base, &key.args));
        let target = if is_struct {
            let decl = self.types.declare(name.clone(), None, Type::Unknown);
            let ty = Type::Custom(CustomType {
                name: name.clone(),
                package: None,
                decl: Some(decl),
            });
            let object = self.objects.alloc(name.clone(), span, ObjectKind::TypeName(ty));
            InstRef {
                name,
                object,
                decl: Some(decl),
            }
        } else {
            let object = self
                .objects
                .alloc(name.clone(), span, ObjectKind::Var(Type::Unknown));
            InstRef {
                name,
                object,
                decl: None,
            }
        };
        self.inst_names.insert(target.name.clone(), target.object);
        debug!(generic = %base, name = %target.name, "instantiating");
        self.instances
            .insert(key.clone(), InstState::InProgress(target.clone()));
        self.inst_order.push(key.clone());

        self.depth += 1;
        let result = self.build_instance(id, &key.args, &target);
        self.depth -= 1;

        match result {
            Ok(stmt) => {
                let inst = Instantiation {
                    key: key.clone(),
                    target: target.clone(),
                    stmt,
                };
                self.instances.insert(key, InstState::Complete(inst));
                Ok(target)
            }
            Err(errors) => {
                debug!(generic = %base, errors = errors.len(), "instantiation failed");
                self.instances
                    .insert(key, InstState::Failed(errors.clone()));
                Err(TypeError::Instantiation {
                    name: base,
                    span,
                    errors,
                })
            }
        }
    }

    /// `mangled`, or `mangled_N` for the smallest `N` that clashes with no
    /// top-level declaration and no earlier instantiation. Distinct argument
    /// lists may mangle alike (`[]int` and a type named `slice_int`).
    fn free_instance_name(&self, mangled: String) -> String {
        let taken = |name: &str| self.env.lookup_global(name).is_some() || self.inst_names.contains_key(name);
        if !taken(&mangled) {
            return mangled;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", mangled, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Parse and negotiate one instantiation against the package scope only.
    fn build_instance(
        &mut self,
        id: GenericId,
        args: &[Type],
        target: &InstRef,
    ) -> Result<Stmt, Vec<TypeError>> {
        let template = self.template(id).clone();
        let body = self
            .parser
            .parse_instance(&template, args)
            .map_err(|error| {
                vec![TypeError::Reparse {
                    error: ParseError::new(error.message, error.span.shifted(template.offset)),
                }]
            })?;
        let span = Span::point(template.offset);
        let mut stmt = match body {
            GenericBody::Func(mut decl) => {
                decl.name = target.name.clone();
                decl.object = Some(target.object);
                Stmt::new(StmtKind::Func(decl)).with_span(span)
            }
            GenericBody::Struct(mut decl) => {
                decl.name = target.name.clone();
                decl.decl = target.decl;
                Stmt::new(StmtKind::Struct(decl)).with_span(span)
            }
        };

        let saved_scopes = self.env.isolate();
        let saved_frames = std::mem::take(&mut self.frames);
        let result = self.negotiate_instance(&mut stmt);
        self.frames = saved_frames;
        self.env.restore(saved_scopes);

        result.map(|()| stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use have_ast::build;

    #[test]
    fn substitution_replaces_every_parameter() {
        let stmt = build::generic_struct(
            "Pair",
            &["K", "V"],
            vec![("key", Type::generic_param("K")), ("vals", Type::slice(Type::generic_param("V")))],
        );
        let StmtKind::Generic(template) = stmt.kind else {
            unreachable!()
        };
        let body = SubstitutingParser
            .parse_instance(&template, &[Type::string(), Type::int()])
            .unwrap();
        let GenericBody::Struct(s) = body else {
            panic!("expected a struct body")
        };
        assert_eq!(s.fields[0].ty, Type::string());
        assert_eq!(s.fields[1].ty, Type::slice(Type::int()));
        // The template itself is untouched.
        let GenericBody::Struct(orig) = &template.body else {
            unreachable!()
        };
        assert_eq!(orig.fields[0].ty, Type::generic_param("K"));
    }

    #[test]
    fn keys_compare_structurally() {
        let a = InstKey {
            template: GenericId(0),
            args: vec![Type::map(Type::string(), Type::int())],
        };
        let b = InstKey {
            template: GenericId(0),
            args: vec![Type::map(Type::string(), Type::int())],
        };
        let mut cache = FxHashMap::default();
        cache.insert(a, 1);
        assert_eq!(cache.get(&b), Some(&1));
    }
}

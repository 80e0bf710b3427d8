//! Universe scope and builtin function calls.
//!
//! The universe holds the builtin type names (so `int(x)` resolves like any
//! other conversion) and the builtin functions. Builtin calls are checked
//! here rather than through a function type, since most of them are
//! polymorphic over their argument types.

use have_ast::{Builtin, CallExpr, ObjectKind};
use have_common::Span;
use have_types::{SimpleType, Type};

use crate::compat;
use crate::context::TypesContext;
use crate::error::TypeError;

/// Populate the universe scope. Called once per context.
pub fn register(ctx: &mut TypesContext) {
    for simple in SimpleType::ALL {
        let id = ctx.objects.alloc(
            simple.name(),
            Span::default(),
            ObjectKind::TypeName(Type::Simple(simple)),
        );
        ctx.env.insert_universe(simple.name().to_string(), id);
    }
    for builtin in Builtin::ALL {
        let id = ctx
            .objects
            .alloc(builtin.name(), Span::default(), ObjectKind::Builtin(builtin));
        ctx.env.insert_universe(builtin.name().to_string(), id);
    }
}

fn no_value() -> Type {
    Type::Tuple(Vec::new())
}

fn arg_count(call: &CallExpr, min: usize, max: usize, span: Span) -> Result<(), TypeError> {
    let found = call.args.len();
    if found < min || found > max {
        let expected = if found < min { min } else { max };
        return Err(TypeError::ArgCount {
            expected,
            found,
            span,
        });
    }
    Ok(())
}

impl TypesContext {
    /// Negotiate a call of `builtin` and return the call's type.
    pub(crate) fn builtin_call(
        &mut self,
        builtin: Builtin,
        call: &mut CallExpr,
        span: Span,
    ) -> Result<Type, TypeError> {
        if call.ellipsis && builtin != Builtin::Append {
            return Err(TypeError::invalid(
                format!("cannot use `...` with `{}`", builtin.name()),
                span,
            ));
        }
        match builtin {
            Builtin::Print | Builtin::Println => {
                for arg in &mut call.args {
                    self.value(arg, None)?;
                }
                Ok(no_value())
            }
            Builtin::Panic => {
                arg_count(call, 1, 1, span)?;
                self.value(&mut call.args[0], None)?;
                Ok(no_value())
            }
            Builtin::Len | Builtin::Cap => {
                arg_count(call, 1, 1, span)?;
                let arg = &mut call.args[0];
                let ty = self.value(arg, None)?;
                let ok = match self.types.root_type(&ty) {
                    Type::Slice(_) | Type::Array(_) | Type::Chan(_) => true,
                    Type::Pointer(to) => matches!(self.types.root_type(to), Type::Array(_)),
                    Type::Map(_) => builtin == Builtin::Len,
                    _ => builtin == Builtin::Len && compat::is_string(&self.types, &ty),
                };
                if !ok {
                    return Err(TypeError::invalid(
                        format!("invalid argument of type `{}` for `{}`", ty, builtin.name()),
                        arg.span,
                    ));
                }
                Ok(Type::int())
            }
            Builtin::Append => {
                if call.args.is_empty() {
                    return Err(TypeError::ArgCount {
                        expected: 1,
                        found: 0,
                        span,
                    });
                }
                let slice_ty = self.value(&mut call.args[0], None)?;
                let elem = match self.types.root_type(&slice_ty) {
                    Type::Slice(of) => of.as_ref().clone(),
                    _ => {
                        return Err(TypeError::invalid(
                            format!("first argument to `append` must be a slice, found `{}`", slice_ty),
                            call.args[0].span,
                        ))
                    }
                };
                if call.ellipsis {
                    arg_count(call, 2, 2, span)?;
                    let rest = &mut call.args[1];
                    let rest_ty = self.value(rest, Some(&slice_ty))?;
                    let bytes_from_string = compat::is_string(&self.types, &rest_ty)
                        && matches!(elem, Type::Simple(SimpleType::Byte | SimpleType::Uint8));
                    if !bytes_from_string && !compat::assignable(&self.types, &rest_ty, &Type::slice(elem.clone())) {
                        return Err(TypeError::mismatch(&slice_ty, &rest_ty, rest.span));
                    }
                } else {
                    for arg in call.args.iter_mut().skip(1) {
                        self.expect_assignable(arg, &elem)?;
                    }
                }
                Ok(slice_ty)
            }
            Builtin::Make => {
                arg_count(call, 1, 3, span)?;
                let ty = self.type_arg(&mut call.args[0])?;
                let max_sizes = match self.types.root_type(&ty) {
                    Type::Slice(_) => 2,
                    Type::Map(_) | Type::Chan(_) => 1,
                    _ => {
                        return Err(TypeError::invalid(
                            format!("cannot make `{}`", ty),
                            call.args[0].span,
                        ))
                    }
                };
                if call.args.len() - 1 > max_sizes {
                    return Err(TypeError::ArgCount {
                        expected: max_sizes + 1,
                        found: call.args.len(),
                        span,
                    });
                }
                if matches!(self.types.root_type(&ty), Type::Slice(_)) && call.args.len() < 2 {
                    return Err(TypeError::ArgCount {
                        expected: 2,
                        found: call.args.len(),
                        span,
                    });
                }
                for size in call.args.iter_mut().skip(1) {
                    self.integer_operand(size)?;
                }
                Ok(ty)
            }
            Builtin::New => {
                arg_count(call, 1, 1, span)?;
                let ty = self.type_arg(&mut call.args[0])?;
                Ok(Type::pointer(ty))
            }
            Builtin::Delete => {
                arg_count(call, 2, 2, span)?;
                let map_ty = self.value(&mut call.args[0], None)?;
                let key = match self.types.root_type(&map_ty) {
                    Type::Map(m) => m.by.as_ref().clone(),
                    _ => {
                        return Err(TypeError::invalid(
                            format!("first argument to `delete` must be a map, found `{}`", map_ty),
                            call.args[0].span,
                        ))
                    }
                };
                self.expect_assignable(&mut call.args[1], &key)?;
                Ok(no_value())
            }
            Builtin::Copy => {
                arg_count(call, 2, 2, span)?;
                let dst = self.value(&mut call.args[0], None)?;
                let src = self.value(&mut call.args[1], None)?;
                let dst_elem = match self.types.root_type(&dst) {
                    Type::Slice(of) => of.as_ref().clone(),
                    _ => {
                        return Err(TypeError::invalid(
                            format!("copy expects slice arguments, found `{}`", dst),
                            call.args[0].span,
                        ))
                    }
                };
                let ok = match self.types.root_type(&src) {
                    Type::Slice(of) => **of == dst_elem,
                    _ => {
                        compat::is_string(&self.types, &src)
                            && matches!(dst_elem, Type::Simple(SimpleType::Byte | SimpleType::Uint8))
                    }
                };
                if !ok {
                    return Err(TypeError::mismatch(&dst, &src, call.args[1].span));
                }
                Ok(Type::int())
            }
        }
    }
}

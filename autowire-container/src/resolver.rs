//! Parameter binding and invocation.
//!
//! [`Resolver`] is stateless. It asks a [`DependencySource`] (the container)
//! for every class-typed parameter it cannot fill from overrides or
//! defaults, passing the caller's [`ResolutionContext`] along so the
//! container can detect cycles.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::context::ResolutionContext;
use crate::error::{AutowireError, InvalidReason, NotResolvableError, Result};
use crate::key::DependencyKey;
use crate::reflect::{
    Arguments, CallFn, Function, INVOKE_METHOD, Instantiation, Introspector, Method, MethodBody,
    MethodFn, Parameter,
};
use crate::value::{Object, Overrides, Value};

/// Where the resolver gets dependencies and type information from.
pub trait DependencySource {
    fn types(&self) -> &dyn Introspector;

    /// Resolves `key` on the chain described by `ctx`, without overrides.
    fn resolve_dependency(&self, key: &DependencyKey, ctx: ResolutionContext<'_>) -> Result<Value>;
}

/// What an [`Invocable`] calls.
#[derive(Clone)]
pub enum InvokeTarget {
    Function(CallFn),
    /// A static method, called unbound.
    Static(CallFn),
    /// An instance method. `receiver` is set when the invocable was an object.
    Method {
        declaring: DependencyKey,
        call: MethodFn,
        receiver: Option<Object>,
    },
}

/// A reflected callable, normalized once so callers never re-detect its shape.
#[derive(Clone)]
pub struct Invocable {
    label: String,
    parameters: Arc<[Parameter]>,
    target: InvokeTarget,
}

impl Invocable {
    pub fn from_function(function: &Function) -> Self {
        Self {
            label: function.name().to_string(),
            parameters: Arc::clone(function.parameters()),
            target: InvokeTarget::Function(Arc::clone(function.call_fn())),
        }
    }

    pub fn from_method(owner: DependencyKey, method: Method, receiver: Option<Object>) -> Self {
        let label = format!("{owner}::{}", method.name);
        let target = match method.body {
            MethodBody::Static(call) => InvokeTarget::Static(call),
            MethodBody::Instance(call) => InvokeTarget::Method {
                declaring: owner,
                call,
                receiver,
            },
        };
        Self {
            label,
            parameters: method.parameters,
            target,
        }
    }

    /// Human readable name, e.g. `StaticFactory::build` or `{closure}`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn target(&self) -> &InvokeTarget {
        &self.target
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.target {
            InvokeTarget::Function(_) => "function",
            InvokeTarget::Static(_) => "static",
            InvokeTarget::Method { receiver: Some(_), .. } => "bound method",
            InvokeTarget::Method { receiver: None, .. } => "method",
        };
        f.debug_struct("Invocable")
            .field("label", &self.label)
            .field("kind", &kind)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

/// The resolution algorithm.
#[derive(Debug, Default, Clone, Copy)]
pub struct Resolver;

impl Resolver {
    /// Reflects a callable value.
    ///
    /// Accepts a [`Function`] value, the name of a free function, a
    /// `"Type::method"` reference or an object whose class has an
    /// [`INVOKE_METHOD`]. Returns `None` for anything else.
    pub fn reflect(types: &dyn Introspector, callable: &Value) -> Option<Invocable> {
        match callable {
            Value::Function(function) => Some(Invocable::from_function(function)),
            Value::Str(name) => {
                if let Some(function) = types.function(name) {
                    return Some(Invocable::from_function(&function));
                }
                let (owner, method) = name.rsplit_once("::")?;
                if owner.is_empty() || method.is_empty() {
                    return None;
                }
                let owner = DependencyKey::new(owner);
                let method = types.method(&owner, method)?;
                Some(Invocable::from_method(owner, method, None))
            }
            Value::Object(object) => {
                let method = types.method(object.class(), INVOKE_METHOD)?;
                if method.is_static() {
                    return None;
                }
                Some(Invocable::from_method(
                    object.class().clone(),
                    method,
                    Some(object.clone()),
                ))
            }
            _ => None,
        }
    }

    /// Builds the positional argument list for `parameters`.
    ///
    /// Per parameter, in order: an override by name wins; an optional
    /// parameter is left to its default; a class-typed one is resolved from
    /// `source`; anything else is not resolvable. Trailing defaulted
    /// parameters are omitted, earlier ones are filled with their default to
    /// keep positions aligned.
    pub fn resolve_arguments(
        &self,
        source: &dyn DependencySource,
        owner: &dyn fmt::Display,
        parameters: &[Parameter],
        overrides: &Overrides,
        ctx: ResolutionContext<'_>,
    ) -> Result<Vec<Value>> {
        let mut values: Vec<Option<Value>> = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            if let Some(value) = overrides.get(&parameter.name) {
                values.push(Some(value.clone()));
            } else if parameter.is_optional() {
                values.push(None);
            } else if let Some(class) = &parameter.class {
                trace!(parameter = %parameter.name, class = %class, "Resolving parameter");
                values.push(Some(source.resolve_dependency(class, ctx)?));
            } else {
                return Err(AutowireError::NotResolvable(NotResolvableError {
                    parameter: parameter.name.clone(),
                    owner: owner.to_string(),
                }));
            }
        }

        while matches!(values.last(), Some(None)) {
            values.pop();
        }

        Ok(values
            .into_iter()
            .zip(parameters)
            .map(|(value, parameter)| {
                value
                    .or_else(|| parameter.default.clone())
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Auto-wires an instance of `key`.
    pub fn instantiate(
        &self,
        source: &dyn DependencySource,
        key: &DependencyKey,
        overrides: &Overrides,
        ctx: ResolutionContext<'_>,
    ) -> Result<Value> {
        let types = source.types();
        let Some(instantiation) = types.instantiation(key) else {
            if !types.type_exists(key) {
                return Err(crate::definition::unknown_type(types, key, key));
            }
            return Err(AutowireError::invalid(key, InvalidReason::NotInstantiable(key.clone())));
        };

        trace!(key = %key, "Auto-wiring");
        let object = match instantiation {
            Instantiation::Bare(make) => make(),
            Instantiation::Constructor(ctor) => {
                let owner = format!("{key} constructor");
                let values = self.resolve_arguments(source, &owner, &ctor.parameters, overrides, ctx)?;
                (ctor.build)(&Arguments::new(&ctor.parameters, values))?
            }
        };
        Ok(Value::Object(object))
    }

    /// Resolves the arguments of `invocable` and calls it.
    ///
    /// An instance method runs on `receiver` when it satisfies the declaring
    /// type, else on the object the invocable was reflected from, else on an
    /// instance of the declaring type resolved from `source`.
    pub fn invoke(
        &self,
        source: &dyn DependencySource,
        invocable: &Invocable,
        overrides: &Overrides,
        receiver: Option<&Object>,
        ctx: ResolutionContext<'_>,
    ) -> Result<Value> {
        let values = self.resolve_arguments(
            source,
            &invocable.label,
            &invocable.parameters,
            overrides,
            ctx,
        )?;
        let args = Arguments::new(&invocable.parameters, values);
        trace!(callable = %invocable.label, arguments = args.len(), "Invoking");

        match &invocable.target {
            InvokeTarget::Function(call) | InvokeTarget::Static(call) => call(&args),
            InvokeTarget::Method {
                declaring,
                call,
                receiver: own,
            } => {
                let bound = receiver.filter(|r| source.types().satisfies(r, declaring));
                let object = match (bound, own) {
                    (Some(object), _) | (None, Some(object)) => object.clone(),
                    (None, None) => match source.resolve_dependency(declaring, ctx)? {
                        Value::Object(object) => object,
                        _ => {
                            return Err(AutowireError::invalid(
                                declaring,
                                InvalidReason::Unsatisfied(declaring.clone()),
                            ));
                        }
                    },
                };
                call(&object, &args)
            }
        }
    }
}

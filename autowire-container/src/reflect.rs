//! Type introspection.
//!
//! The container never inspects Rust types directly. Everything it needs to
//! know about a type (does it exist, can it be built, what does its
//! constructor take, which methods does it expose) comes from an
//! [`Introspector`]. [`TypeCatalog`](crate::catalog::TypeCatalog) is the
//! in-memory implementation shipped with the crate.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{AutowireError, Result};
use crate::key::DependencyKey;
use crate::value::{Object, Value};

/// Name of the instance method that makes an object invocable.
pub const INVOKE_METHOD: &str = "invoke";

/// Body of a free function, static method or constructor.
pub type CallFn = Arc<dyn Fn(&Arguments<'_>) -> Result<Value> + Send + Sync>;

/// Body of an instance method; receives the receiver object first.
pub type MethodFn = Arc<dyn Fn(&Object, &Arguments<'_>) -> Result<Value> + Send + Sync>;

/// Builds an instance from resolved constructor arguments.
pub type BuildFn = Arc<dyn Fn(&Arguments<'_>) -> Result<Object> + Send + Sync>;

/// Builds an instance of a type without a constructor.
pub type BareFn = Arc<dyn Fn() -> Object + Send + Sync>;

/// Whether a type can stand on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A class that exists at runtime.
    Concrete,
    /// An interface or abstract class; only usable through a binding.
    Abstract,
}

/// A declared parameter of a constructor or callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Declared class or interface type. `None` for builtin types.
    pub class: Option<DependencyKey>,
    /// Declared default; a parameter with a default is optional.
    pub default: Option<Value>,
}

impl Parameter {
    /// A required parameter of builtin type.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
            default: None,
        }
    }

    /// A required parameter typed with a class or interface.
    pub fn typed(name: impl Into<String>, class: impl Into<DependencyKey>) -> Self {
        Self {
            name: name.into(),
            class: Some(class.into()),
            default: None,
        }
    }

    /// Marks the parameter optional with the given default.
    pub fn or(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

// ═══════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════

/// Resolved positional arguments, readable by parameter name.
///
/// Trailing optional parameters may be absent from the positional list;
/// reading them by name yields the declared default.
pub struct Arguments<'a> {
    parameters: &'a [Parameter],
    values: Vec<Value>,
}

impl<'a> Arguments<'a> {
    pub fn new(parameters: &'a [Parameter], values: Vec<Value>) -> Self {
        Self { parameters, values }
    }

    /// The positional values actually passed.
    pub fn positional(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `name`: the passed argument, else the declared default.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.parameters.iter().position(|p| p.name == name)?;
        self.values
            .get(index)
            .or(self.parameters[index].default.as_ref())
    }

    pub fn value(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| bad_argument(name, "present"))
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| bad_argument(name, "a string"))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.value(name)?
            .as_int()
            .ok_or_else(|| bad_argument(name, "an int"))
    }

    /// Downcasts an object argument to its payload type.
    pub fn object<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.value(name)?
            .downcast::<T>()
            .ok_or_else(|| bad_argument(name, std::any::type_name::<T>()))
    }
}

fn bad_argument(parameter: &str, expected: &'static str) -> AutowireError {
    AutowireError::BadArgument {
        parameter: parameter.to_string(),
        expected,
    }
}

// ═══════════════════════════════════════════
// Functions, methods, constructors
// ═══════════════════════════════════════════

/// A free function or closure with declared parameters.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    parameters: Arc<[Parameter]>,
    call: CallFn,
}

impl Function {
    pub fn new(
        name: impl AsRef<str>,
        parameters: Vec<Parameter>,
        call: impl Fn(&Arguments<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            parameters: parameters.into(),
            call: Arc::new(call),
        }
    }

    /// An anonymous function.
    pub fn closure(
        parameters: Vec<Parameter>,
        call: impl Fn(&Arguments<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::new("{closure}", parameters, call)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Arc<[Parameter]> {
        &self.parameters
    }

    pub(crate) fn call_fn(&self) -> &CallFn {
        &self.call
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}/{})", self.name, self.parameters.len())
    }
}

/// How a method is called.
#[derive(Clone)]
pub enum MethodBody {
    Static(CallFn),
    Instance(MethodFn),
}

/// A method declared on a type.
#[derive(Clone)]
pub struct Method {
    pub name: String,
    pub parameters: Arc<[Parameter]>,
    pub body: MethodBody,
}

impl Method {
    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("static", &self.is_static())
            .finish()
    }
}

/// A constructor: declared parameters plus the function building the object.
#[derive(Clone)]
pub struct Constructor {
    pub parameters: Arc<[Parameter]>,
    pub build: BuildFn,
}

/// How an instantiable type is created.
#[derive(Clone)]
pub enum Instantiation {
    /// No constructor; the instance is created without arguments.
    Bare(BareFn),
    Constructor(Constructor),
}

impl Instantiation {
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Instantiation::Bare(_) => &[],
            Instantiation::Constructor(ctor) => &ctor.parameters,
        }
    }
}

impl fmt::Debug for Instantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instantiation::Bare(_) => f.write_str("Bare"),
            Instantiation::Constructor(ctor) => f
                .debug_tuple("Constructor")
                .field(&ctor.parameters)
                .finish(),
        }
    }
}

// ═══════════════════════════════════════════
// Introspector
// ═══════════════════════════════════════════

/// Answers questions about types and callables.
///
/// This is the only view of the type system the container has.
pub trait Introspector: Send + Sync {
    /// Kind of the type named by `key`, or `None` when it does not exist.
    fn kind_of(&self, key: &DependencyKey) -> Option<TypeKind>;

    /// How to create `key`, or `None` when it is not instantiable.
    fn instantiation(&self, key: &DependencyKey) -> Option<Instantiation>;

    /// Whether `object` is of type `key` or implements it.
    fn satisfies(&self, object: &Object, key: &DependencyKey) -> bool;

    /// A free function by name.
    fn function(&self, name: &str) -> Option<Function>;

    /// A method declared on `owner`.
    fn method(&self, owner: &DependencyKey, name: &str) -> Option<Method>;

    /// All type names known, used for "did you mean" suggestions.
    fn known_types(&self) -> Vec<DependencyKey> {
        Vec::new()
    }

    fn type_exists(&self, key: &DependencyKey) -> bool {
        self.kind_of(key).is_some()
    }

    fn is_instantiable(&self, key: &DependencyKey) -> bool {
        self.instantiation(key).is_some()
    }
}

impl<T: Introspector + ?Sized> Introspector for Arc<T> {
    fn kind_of(&self, key: &DependencyKey) -> Option<TypeKind> {
        (**self).kind_of(key)
    }

    fn instantiation(&self, key: &DependencyKey) -> Option<Instantiation> {
        (**self).instantiation(key)
    }

    fn satisfies(&self, object: &Object, key: &DependencyKey) -> bool {
        (**self).satisfies(object, key)
    }

    fn function(&self, name: &str) -> Option<Function> {
        (**self).function(name)
    }

    fn method(&self, owner: &DependencyKey, name: &str) -> Option<Method> {
        (**self).method(owner, name)
    }

    fn known_types(&self) -> Vec<DependencyKey> {
        (**self).known_types()
    }
}

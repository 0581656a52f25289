//! In-memory [`Introspector`].
//!
//! Rust has no runtime reflection, so types are declared up front: their
//! kind, what they implement, how they are constructed and which methods
//! they expose. The catalog can keep growing after a container was built
//! from it.
//!
//! # Examples
//! ```
//! use autowire_container::catalog::{TypeCatalog, TypeInfo};
//! use autowire_container::reflect::{Introspector, Parameter};
//!
//! struct Engine;
//! struct Car { engine: std::sync::Arc<Engine> }
//!
//! let types = TypeCatalog::new();
//! types.declare(TypeInfo::concrete("Engine").bare(|| Engine));
//! types.declare(
//!     TypeInfo::concrete("Car").constructor(vec![Parameter::typed("engine", "Engine")], |args| {
//!         Ok(Car { engine: args.object::<Engine>("engine")? })
//!     }),
//! );
//!
//! assert!(types.is_instantiable(&"Car".into()));
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{AutowireError, Result};
use crate::key::DependencyKey;
use crate::reflect::{
    Arguments, Constructor, Function, Instantiation, Introspector, Method, MethodBody, Parameter,
    TypeKind,
};
use crate::value::{Object, Value};

/// Declaration of one type.
#[derive(Clone)]
pub struct TypeInfo {
    key: DependencyKey,
    kind: TypeKind,
    parents: Vec<DependencyKey>,
    instantiation: Option<Instantiation>,
    methods: HashMap<String, Method>,
}

impl TypeInfo {
    /// A concrete class. Not instantiable until [`bare`](Self::bare) or
    /// [`constructor`](Self::constructor) is given.
    pub fn concrete(name: impl Into<DependencyKey>) -> Self {
        Self::with_kind(name.into(), TypeKind::Concrete)
    }

    /// An interface (or abstract class).
    pub fn interface(name: impl Into<DependencyKey>) -> Self {
        Self::with_kind(name.into(), TypeKind::Abstract)
    }

    fn with_kind(key: DependencyKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            parents: Vec::new(),
            instantiation: None,
            methods: HashMap::new(),
        }
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    /// Declares that instances of this type also satisfy `parent`.
    pub fn implements(mut self, parent: impl Into<DependencyKey>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Type without constructor, created by `make`.
    pub fn bare<T: Any + Send + Sync>(mut self, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let class = self.key.clone();
        self.instantiation = Some(Instantiation::Bare(Arc::new(move || {
            Object::new(class.clone(), make())
        })));
        self
    }

    /// Type built by a constructor taking `parameters`.
    pub fn constructor<T: Any + Send + Sync>(
        mut self,
        parameters: Vec<Parameter>,
        build: impl Fn(&Arguments<'_>) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        let class = self.key.clone();
        self.instantiation = Some(Instantiation::Constructor(Constructor {
            parameters: parameters.into(),
            build: Arc::new(move |args: &Arguments<'_>| Ok(Object::new(class.clone(), build(args)?))),
        }));
        self
    }

    /// A method callable without receiver.
    pub fn static_method(
        mut self,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        call: impl Fn(&Arguments<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        self.methods.insert(
            name.clone(),
            Method {
                name,
                parameters: parameters.into(),
                body: MethodBody::Static(Arc::new(call)),
            },
        );
        self
    }

    /// A method called on an instance whose payload is `T`.
    pub fn method<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        call: impl Fn(&T, &Arguments<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let owner = format!("{}::{}", self.key, name);
        self.methods.insert(
            name.clone(),
            Method {
                name,
                parameters: parameters.into(),
                body: MethodBody::Instance(Arc::new(move |receiver: &Object, args: &Arguments<'_>| {
                    let this = receiver.downcast_ref::<T>().ok_or_else(|| {
                        AutowireError::construction(
                            &owner,
                            format!("receiver {} has an unexpected payload", receiver.class()),
                        )
                    })?;
                    call(this, args)
                })),
            },
        );
        self
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("parents", &self.parents)
            .field("instantiation", &self.instantiation)
            .field("methods", &methods)
            .finish()
    }
}

/// Thread-safe catalog of declared types and free functions.
#[derive(Default)]
pub struct TypeCatalog {
    types: RwLock<HashMap<DependencyKey, TypeInfo>>,
    functions: RwLock<HashMap<String, Function>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or redeclares) a type.
    pub fn declare(&self, info: TypeInfo) -> &Self {
        trace!(key = %info.key, kind = ?info.kind, "Declared type");
        self.types.write().insert(info.key.clone(), info);
        self
    }

    /// Declares a free function under its own name.
    pub fn declare_function(&self, function: Function) -> &Self {
        trace!(name = function.name(), "Declared function");
        self.functions
            .write()
            .insert(function.name().to_string(), function);
        self
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl Introspector for TypeCatalog {
    fn kind_of(&self, key: &DependencyKey) -> Option<TypeKind> {
        self.types.read().get(key).map(|info| info.kind)
    }

    fn instantiation(&self, key: &DependencyKey) -> Option<Instantiation> {
        let types = self.types.read();
        let info = types.get(key)?;
        match info.kind {
            TypeKind::Concrete => info.instantiation.clone(),
            TypeKind::Abstract => None,
        }
    }

    /// Walks the declared parents breadth-first.
    fn satisfies(&self, object: &Object, key: &DependencyKey) -> bool {
        let types = self.types.read();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([object.class().clone()]);

        while let Some(current) = queue.pop_front() {
            if &current == key {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(info) = types.get(&current) {
                queue.extend(info.parents.iter().cloned());
            }
        }
        false
    }

    fn function(&self, name: &str) -> Option<Function> {
        self.functions.read().get(name).cloned()
    }

    fn method(&self, owner: &DependencyKey, name: &str) -> Option<Method> {
        self.types.read().get(owner)?.methods.get(name).cloned()
    }

    fn known_types(&self) -> Vec<DependencyKey> {
        let mut keys: Vec<_> = self.types.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.types.read().len())
            .field("functions", &self.functions.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sedan;

    fn catalog() -> TypeCatalog {
        let types = TypeCatalog::new();
        types
            .declare(TypeInfo::interface("Vehicle"))
            .declare(TypeInfo::interface("Car").implements("Vehicle"))
            .declare(TypeInfo::concrete("Sedan").implements("Car").bare(|| Sedan))
            .declare(TypeInfo::concrete("Factory").static_method("build", vec![], |_| Ok(Value::Null)))
            .declare_function(Function::new("noop", vec![], |_| Ok(Value::Null)));
        types
    }

    #[test]
    fn kinds() {
        let types = catalog();
        assert_eq!(types.kind_of(&"Vehicle".into()), Some(TypeKind::Abstract));
        assert_eq!(types.kind_of(&"Sedan".into()), Some(TypeKind::Concrete));
        assert_eq!(types.kind_of(&"Truck".into()), None);
        assert!(!types.type_exists(&"Truck".into()));
    }

    #[test]
    fn instantiable_only_when_concrete_with_recipe() {
        let types = catalog();
        assert!(types.is_instantiable(&"Sedan".into()));
        assert!(!types.is_instantiable(&"Vehicle".into()));
        assert!(!types.is_instantiable(&"Factory".into()));
    }

    #[test]
    fn satisfies_transitively() {
        let types = catalog();
        let sedan = Object::new("Sedan", Sedan);
        assert!(types.satisfies(&sedan, &"Sedan".into()));
        assert!(types.satisfies(&sedan, &"Car".into()));
        assert!(types.satisfies(&sedan, &"Vehicle".into()));
        assert!(!types.satisfies(&sedan, &"Factory".into()));
    }

    #[test]
    fn satisfies_terminates_on_parent_cycles() {
        let types = TypeCatalog::new();
        types
            .declare(TypeInfo::interface("A").implements("B"))
            .declare(TypeInfo::interface("B").implements("A"));
        let object = Object::new("A", ());
        assert!(!types.satisfies(&object, &"C".into()));
    }

    #[test]
    fn lookups() {
        let types = catalog();
        assert!(types.function("noop").is_some());
        assert!(types.function("missing").is_none());
        assert!(types.method(&"Factory".into(), "build").unwrap().is_static());
        assert!(types.method(&"Factory".into(), "missing").is_none());
        assert_eq!(types.function("noop").map(|f| f.name().to_string()).as_deref(), Some("noop"));
        assert_eq!(types.known_types().len(), 4);
    }

    #[test]
    fn instance_method_checks_receiver_payload() {
        let info = TypeInfo::concrete("Counter").method::<u32>("get", vec![], |n, _| Ok(Value::from(i64::from(*n))));
        let method = info.methods.get("get").cloned().unwrap();
        let MethodBody::Instance(call) = method.body else {
            panic!("expected instance method");
        };
        let params: [Parameter; 0] = [];

        let ok = call(&Object::new("Counter", 3u32), &Arguments::new(&params, vec![])).unwrap();
        assert_eq!(ok, Value::from(3));

        let err = call(&Object::new("Counter", "nope"), &Arguments::new(&params, vec![]));
        assert!(matches!(err, Err(AutowireError::ConstructionFailed { .. })));
    }
}

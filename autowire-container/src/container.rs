//! # The Container
//!
//! Binds identifiers to definitions and resolves object graphs on demand,
//! auto-wiring constructor parameters when no binding exists.
//!
//! # Architecture
//! ```text
//! get(key) ──> cycle guard ──> Registry ──┬── Alias    ──> get(target)
//!                                         ├── Factory  ──> Resolver::invoke
//!                                         ├── Instance ──> stored object
//!                                         └── (none)   ──> Resolver::instantiate
//!                                                              │
//!                                     class-typed parameters ──┘──> get(param)
//! ```
//!
//! # Examples
//! ```rust
//! use autowire_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Engine;
//! struct Car { engine: Arc<Engine> }
//!
//! let types = Arc::new(TypeCatalog::new());
//! types
//!     .declare(TypeInfo::concrete("Engine").bare(|| Engine))
//!     .declare(TypeInfo::concrete("Car").constructor(
//!         vec![Parameter::typed("engine", "Engine")],
//!         |args| Ok(Car { engine: args.object::<Engine>("engine")? }),
//!     ));
//!
//! let container = Container::new(types);
//! let car: Arc<Car> = container.get_as("Car").expect("Failed to resolve");
//! # let _ = &car.engine;
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, Weak};

use autowire_support::rendering::render_chain;
use once_cell::sync::Lazy;
use tracing::{debug, info, instrument, trace, warn};

use crate::catalog::TypeCatalog;
use crate::context::{ActiveChain, ResolutionContext};
use crate::definition::{Definition, DefinitionKind, Payload, not_callable};
use crate::error::{AutowireError, CircularDependencyError, Result};
use crate::key::DependencyKey;
use crate::provider::Provider;
use crate::reflect::{Function, Instantiation, Introspector, Method, TypeKind};
use crate::registry::Registry;
use crate::resolver::{DependencySource, Resolver};
use crate::value::{Object, Overrides, Value};

/// Identifier of the container's own concrete type.
pub static CONTAINER: Lazy<DependencyKey> = Lazy::new(|| DependencyKey::new("autowire::Container"));

/// Identifier of the container interface, aliased to [`CONTAINER`].
pub static CONTAINER_INTERFACE: Lazy<DependencyKey> =
    Lazy::new(|| DependencyKey::new("autowire::ContainerInterface"));

/// Container configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// When a binding produces an empty value (see [`Value::is_empty`]),
    /// auto-wire the identifier instead of returning it. Off by default:
    /// an empty result from a binding is a result.
    pub fallback_on_empty: bool,
}

// ═══════════════════════════════════════════
// ContainerBuilder
// ═══════════════════════════════════════════

/// Builds a [`Container`].
///
/// ```rust,ignore
/// let container = Container::builder()
///     .types(catalog)
///     .provider(MailProvider)
///     .build()?;
/// ```
pub struct ContainerBuilder {
    types: Option<Arc<dyn Introspector>>,
    settings: Settings,
    providers: Vec<Box<dyn Provider>>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            types: None,
            settings: Settings::default(),
            providers: Vec::new(),
        }
    }

    /// The type introspector. Defaults to an empty [`TypeCatalog`].
    pub fn types(mut self, types: Arc<dyn Introspector>) -> Self {
        self.types = Some(types);
        self
    }

    /// See [`Settings::fallback_on_empty`].
    pub fn fallback_on_empty(mut self, enabled: bool) -> Self {
        self.settings.fallback_on_empty = enabled;
        self
    }

    /// Adds a [`Provider`], applied in order during [`build`](Self::build).
    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Builds the container and applies the providers.
    ///
    /// # Errors
    /// The first error returned by a provider.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        let types = self.types.unwrap_or_else(|| Arc::new(TypeCatalog::new()));
        let container = Container::with_settings(types, self.settings);

        for provider in &self.providers {
            debug!(provider = provider.name(), "Applying provider");
            provider.register(&container)?;
        }

        info!(
            definitions = container.len(),
            providers = self.providers.len(),
            "Container built"
        );
        Ok(container)
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Dependency injection container.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

struct Inner {
    types: WithBuiltins,
    registry: Registry,
    resolver: Resolver,
    settings: Settings,
}

/// Payload of the self-registered instance.
///
/// Weak, so the registry does not keep its own container alive.
struct SelfHandle(Weak<Inner>);

impl Container {
    /// A container with default settings over `types`.
    pub fn new(types: Arc<dyn Introspector>) -> Self {
        Self::with_settings(types, Settings::default())
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    fn with_settings(types: Arc<dyn Introspector>, settings: Settings) -> Self {
        let inner = Arc::new(Inner {
            types: WithBuiltins { inner: types },
            registry: Registry::new(),
            resolver: Resolver,
            settings,
        });

        let this = Object::new(CONTAINER.clone(), SelfHandle(Arc::downgrade(&inner)));
        inner
            .registry
            .insert(Definition::from_parts(CONTAINER.clone(), Payload::Instance(this)));
        inner.registry.insert(Definition::from_parts(
            CONTAINER_INTERFACE.clone(),
            Payload::Alias(CONTAINER.clone()),
        ));

        Self { inner }
    }

    /// Recovers a container from the value `get(CONTAINER)` returned.
    pub fn from_value(value: &Value) -> Option<Container> {
        let handle = value.downcast::<SelfHandle>()?;
        handle.0.upgrade().map(|inner| Container { inner })
    }

    // ── Binding ──

    /// Classifies `value` and binds it to `key`.
    ///
    /// A failed binding leaves any previous binding of `key` in place.
    pub fn set(&self, key: impl Into<DependencyKey>, value: impl Into<Value>) -> Result<()> {
        self.bind(key.into(), value.into(), None)
    }

    /// Binds `source` as an alias of `target`.
    pub fn set_alias(
        &self,
        source: impl Into<DependencyKey>,
        target: impl Into<DependencyKey>,
    ) -> Result<()> {
        let definition = Definition::alias(&self.inner.types, source.into(), target.into())?;
        self.inner.registry.insert(definition);
        Ok(())
    }

    /// Binds `key` to a factory; `callable` is reflected now.
    pub fn set_factory(&self, key: impl Into<DependencyKey>, callable: impl Into<Value>) -> Result<()> {
        self.bind(key.into(), callable.into(), Some(DefinitionKind::Factory))
    }

    /// Binds `key` to a fixed object.
    pub fn set_instance(&self, key: impl Into<DependencyKey>, value: impl Into<Value>) -> Result<()> {
        self.bind(key.into(), value.into(), Some(DefinitionKind::Instance))
    }

    fn bind(&self, key: DependencyKey, value: Value, kind: Option<DefinitionKind>) -> Result<()> {
        let definition = Definition::classify(&self.inner.types, key, value, kind)?;
        self.inner.registry.insert(definition);
        Ok(())
    }

    /// Deletes the binding of `key`, if any.
    pub fn remove(&self, key: impl Into<DependencyKey>) {
        self.inner.registry.remove(&key.into());
    }

    // ── Queries ──

    /// Whether `key` is a concrete type, or an abstract type with a binding.
    pub fn has(&self, key: impl Into<DependencyKey>) -> bool {
        let key = key.into();
        match self.inner.types.kind_of(&key) {
            Some(TypeKind::Concrete) => true,
            Some(TypeKind::Abstract) => self.inner.registry.contains(&key),
            None => false,
        }
    }

    /// Whether `key` has a binding, whether or not it can be resolved.
    pub fn has_definition(&self, key: impl Into<DependencyKey>) -> bool {
        self.inner.registry.contains(&key.into())
    }

    pub fn definition(&self, key: impl Into<DependencyKey>) -> Option<Arc<Definition>> {
        self.inner.registry.get(&key.into())
    }

    /// Bound identifiers, sorted.
    pub fn keys(&self) -> Vec<DependencyKey> {
        self.inner.registry.keys()
    }

    /// Number of bindings, including the two self-registrations.
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.len() == 0
    }

    pub fn settings(&self) -> Settings {
        self.inner.settings
    }

    // ── Resolution ──

    /// Resolves `key`.
    pub fn get(&self, key: impl Into<DependencyKey>) -> Result<Value> {
        self.resolve_root(key.into(), &Overrides::new())
    }

    /// Resolves `key`, passing `overrides` to its constructor or factory.
    pub fn get_with(&self, key: impl Into<DependencyKey>, overrides: &Overrides) -> Result<Value> {
        self.resolve_root(key.into(), overrides)
    }

    /// Resolves `key` and downcasts the object to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: impl Into<DependencyKey>) -> Result<Arc<T>> {
        let key = key.into();
        let value = self.resolve_root(key.clone(), &Overrides::new())?;
        value.downcast::<T>().ok_or_else(|| {
            AutowireError::construction(
                &key,
                format!(
                    "Type mismatch: expected {}, got {}",
                    type_name::<T>(),
                    value.type_label()
                ),
            )
        })
    }

    /// Calls `callable` with auto-wired arguments, without binding anything.
    pub fn invoke(&self, callable: impl Into<Value>) -> Result<Value> {
        self.invoke_with(callable, &Overrides::new(), None)
    }

    /// Calls `callable` with `overrides`; an instance method runs on
    /// `receiver` when it satisfies the declaring type.
    #[instrument(skip_all, name = "container_invoke")]
    pub fn invoke_with(
        &self,
        callable: impl Into<Value>,
        overrides: &Overrides,
        receiver: Option<&Object>,
    ) -> Result<Value> {
        let callable = callable.into();
        let invocable = Resolver::reflect(&self.inner.types, &callable)
            .ok_or_else(|| not_callable(&callable))?;

        trace!(callable = invocable.label(), "Invoking");
        self.inner
            .resolver
            .invoke(self, &invocable, overrides, receiver, ResolutionContext::root())
    }

    #[instrument(skip_all, name = "container_get", fields(key = %key))]
    fn resolve_root(&self, key: DependencyKey, overrides: &Overrides) -> Result<Value> {
        self.resolve_in(&key, overrides, ResolutionContext::root())
    }

    fn resolve_in(
        &self,
        key: &DependencyKey,
        overrides: &Overrides,
        ctx: ResolutionContext<'_>,
    ) -> Result<Value> {
        let active = self.active_chain();
        // the per-thread chain also covers a `get` issued from inside a factory
        if ctx.contains(key) || active.contains(key) {
            let chain = active.chain_to(key);
            warn!(chain = %render_chain(&chain), "Circular dependency detected!");
            return Err(AutowireError::CircularDependency(CircularDependencyError { chain }));
        }

        let _active = active.enter(key);
        let frame = ctx.enter(key.clone());
        let ctx = frame.context();
        trace!(key = %key, depth = ctx.depth(), "Resolving");

        if let Some(definition) = self.inner.registry.get(key) {
            let bound = self.dispatch(&definition, overrides, ctx)?;
            if !(self.inner.settings.fallback_on_empty && bound.is_empty()) {
                return Ok(bound);
            }
            debug!(key = %key, "Binding produced an empty value, auto-wiring instead");
        }

        self.inner.resolver.instantiate(self, key, overrides, ctx)
    }

    fn active_chain(&self) -> ActiveChain {
        ActiveChain::new(Arc::as_ptr(&self.inner) as usize)
    }

    fn dispatch(
        &self,
        definition: &Definition,
        overrides: &Overrides,
        ctx: ResolutionContext<'_>,
    ) -> Result<Value> {
        match definition.payload() {
            Payload::Alias(target) => self.resolve_in(target, overrides, ctx),
            Payload::Factory(invocable) => {
                self.inner
                    .resolver
                    .invoke(self, invocable, overrides, None, ctx)
            }
            // overrides do not apply to a fixed instance
            Payload::Instance(object) => Ok(Value::Object(object.clone())),
        }
    }
}

impl DependencySource for Container {
    fn types(&self) -> &dyn Introspector {
        &self.inner.types
    }

    fn resolve_dependency(&self, key: &DependencyKey, ctx: ResolutionContext<'_>) -> Result<Value> {
        self.resolve_in(key, &Overrides::new(), ctx)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.inner.registry.len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Built-in types
// ═══════════════════════════════════════════

/// The user's introspector plus the container's own two types.
struct WithBuiltins {
    inner: Arc<dyn Introspector>,
}

impl Introspector for WithBuiltins {
    fn kind_of(&self, key: &DependencyKey) -> Option<TypeKind> {
        if key == &*CONTAINER {
            Some(TypeKind::Concrete)
        } else if key == &*CONTAINER_INTERFACE {
            Some(TypeKind::Abstract)
        } else {
            self.inner.kind_of(key)
        }
    }

    fn instantiation(&self, key: &DependencyKey) -> Option<Instantiation> {
        if key == &*CONTAINER || key == &*CONTAINER_INTERFACE {
            return None;
        }
        self.inner.instantiation(key)
    }

    fn satisfies(&self, object: &Object, key: &DependencyKey) -> bool {
        if object.class() == &*CONTAINER && (key == &*CONTAINER || key == &*CONTAINER_INTERFACE) {
            return true;
        }
        self.inner.satisfies(object, key)
    }

    fn function(&self, name: &str) -> Option<Function> {
        self.inner.function(name)
    }

    fn method(&self, owner: &DependencyKey, name: &str) -> Option<Method> {
        self.inner.method(owner, name)
    }

    fn known_types(&self) -> Vec<DependencyKey> {
        let mut keys = self.inner.known_types();
        keys.push(CONTAINER.clone());
        keys.push(CONTAINER_INTERFACE.clone());
        keys
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{CONTAINER, CONTAINER_INTERFACE, Container, ContainerBuilder, Settings};
    pub use crate::catalog::{TypeCatalog, TypeInfo};
    pub use crate::definition::{Definition, DefinitionKind};
    pub use crate::error::{AutowireError, Result};
    pub use crate::key::DependencyKey;
    pub use crate::provider::Provider;
    pub use crate::reflect::{Arguments, Function, Introspector, Parameter};
    pub use crate::value::{Object, Overrides, Value};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

//! Core container implementation for Autowire.
//!
//! Identifiers name types known to an [`Introspector`]. Each identifier is
//! resolved through its binding (alias, factory or instance) or, when
//! unbound, by auto-wiring its constructor.

pub mod catalog;
pub mod container;
pub mod context;
pub mod definition;
pub mod error;
pub mod key;
pub mod provider;
pub mod reflect;
pub(crate) mod registry;
pub mod resolver;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use catalog::{TypeCatalog, TypeInfo};
pub use container::{CONTAINER, CONTAINER_INTERFACE, Container, ContainerBuilder, Settings, prelude};
pub use definition::{Definition, DefinitionKind};
pub use error::{AutowireError, Result};
pub use key::DependencyKey;
pub use provider::Provider;
pub use reflect::{Introspector, Parameter};
pub use value::{Object, Overrides, Value};

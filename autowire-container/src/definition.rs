//! Bindings and their classification.
//!
//! A [`Definition`] says how one identifier is satisfied: by another
//! identifier ([`Payload::Alias`]), by calling something
//! ([`Payload::Factory`]) or by a fixed object ([`Payload::Instance`]).
//! Raw values are classified once, here; everything downstream matches on
//! the payload.

use std::fmt;

use autowire_support::rendering::suggest_similar;

use crate::error::{AutowireError, InvalidDefinitionError, InvalidReason, Result, Subject};
use crate::key::DependencyKey;
use crate::reflect::Introspector;
use crate::resolver::{Invocable, Resolver};
use crate::value::{Object, Value};

/// The three binding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Alias,
    Factory,
    Instance,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Alias => write!(f, "alias"),
            DefinitionKind::Factory => write!(f, "factory"),
            DefinitionKind::Instance => write!(f, "instance"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    /// Resolve this identifier instead. Never the source itself.
    Alias(DependencyKey),
    Factory(Invocable),
    /// Returned unchanged on every resolution.
    Instance(Object),
}

/// An immutable binding for one identifier.
#[derive(Debug, Clone)]
pub struct Definition {
    source: DependencyKey,
    payload: Payload,
}

impl Definition {
    /// Classifies `raw` as a binding for `source`.
    ///
    /// With an explicit `kind`, `raw` must have that kind's shape. Without
    /// one, the first match wins: a name of another known type (alias), an
    /// invocable (factory), an object satisfying `source` (instance).
    ///
    /// # Errors
    /// [`AutowireError::InvalidDefinition`] when `source` is unknown or
    /// `raw` fits no kind.
    pub fn classify(
        types: &dyn Introspector,
        source: DependencyKey,
        raw: Value,
        kind: Option<DefinitionKind>,
    ) -> Result<Self> {
        match kind {
            Some(DefinitionKind::Alias) => match raw {
                Value::Str(target) => Self::alias(types, source, DependencyKey::from(target)),
                other => Err(AutowireError::invalid(
                    &source,
                    InvalidReason::ExpectedTypeName(other.type_label()),
                )),
            },
            Some(DefinitionKind::Factory) => Self::factory(types, source, &raw),
            Some(DefinitionKind::Instance) => Self::instance(types, source, raw),
            None => Self::classify_implicit(types, source, raw),
        }
    }

    fn classify_implicit(types: &dyn Introspector, source: DependencyKey, raw: Value) -> Result<Self> {
        ensure_known(types, &source)?;

        if let Value::Str(name) = &raw {
            let target = DependencyKey::new(name);
            if target != source && types.type_exists(&target) {
                return Self::alias(types, source, target);
            }
        }

        if let Some(invocable) = Resolver::reflect(types, &raw) {
            return Ok(Self::from_parts(source, Payload::Factory(invocable)));
        }

        match raw {
            Value::Object(object) if types.satisfies(&object, &source) => {
                Ok(Self::from_parts(source, Payload::Instance(object)))
            }
            other => Err(AutowireError::invalid(
                &source,
                InvalidReason::Unclassifiable(other.type_label()),
            )),
        }
    }

    /// An alias from `source` to `target`.
    pub fn alias(types: &dyn Introspector, source: DependencyKey, target: DependencyKey) -> Result<Self> {
        ensure_known(types, &source)?;
        if !types.type_exists(&target) {
            return Err(unknown_type(types, &source, &target));
        }
        if source == target {
            return Err(AutowireError::invalid(&source, InvalidReason::SelfAlias(target)));
        }
        Ok(Self::from_parts(source, Payload::Alias(target)))
    }

    /// A factory calling `callable`, reflected now.
    pub fn factory(types: &dyn Introspector, source: DependencyKey, callable: &Value) -> Result<Self> {
        ensure_known(types, &source)?;
        match Resolver::reflect(types, callable) {
            Some(invocable) => Ok(Self::from_parts(source, Payload::Factory(invocable))),
            None => Err(not_invocable(&source, callable)),
        }
    }

    /// A fixed instance; `value` must be an object satisfying `source`.
    pub fn instance(types: &dyn Introspector, source: DependencyKey, value: Value) -> Result<Self> {
        ensure_known(types, &source)?;
        match value {
            Value::Object(object) if types.satisfies(&object, &source) => {
                Ok(Self::from_parts(source, Payload::Instance(object)))
            }
            _ => {
                let reason = InvalidReason::Unsatisfied(source.clone());
                Err(AutowireError::invalid(&source, reason))
            }
        }
    }

    /// Builds a definition without validation.
    pub(crate) fn from_parts(source: DependencyKey, payload: Payload) -> Self {
        Self { source, payload }
    }

    pub fn source(&self) -> &DependencyKey {
        &self.source
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> DefinitionKind {
        match self.payload {
            Payload::Alias(_) => DefinitionKind::Alias,
            Payload::Factory(_) => DefinitionKind::Factory,
            Payload::Instance(_) => DefinitionKind::Instance,
        }
    }
}

fn ensure_known(types: &dyn Introspector, key: &DependencyKey) -> Result<()> {
    if types.type_exists(key) {
        Ok(())
    } else {
        Err(unknown_type(types, key, key))
    }
}

/// Error for a binding of `key` that mentions the unknown type `unknown`.
pub(crate) fn unknown_type(
    types: &dyn Introspector,
    key: &DependencyKey,
    unknown: &DependencyKey,
) -> AutowireError {
    let known = types.known_types();
    let names: Vec<&str> = known.iter().map(DependencyKey::as_str).collect();

    AutowireError::InvalidDefinition(InvalidDefinitionError {
        subject: Subject::Binding(key.clone()),
        reason: InvalidReason::UnknownType(unknown.clone()),
        suggestions: suggest_similar(unknown.as_str(), &names, 3),
    })
}

/// Error for a factory of `key` that is not callable.
pub(crate) fn not_invocable(key: &DependencyKey, callable: &Value) -> AutowireError {
    AutowireError::invalid(key, uninvocable_reason(callable))
}

/// Error for a value passed to `invoke` that is not callable.
pub(crate) fn not_callable(callable: &Value) -> AutowireError {
    let subject = match callable {
        Value::Str(name) => name.clone(),
        other => format!("{other:?}"),
    };
    AutowireError::InvalidDefinition(InvalidDefinitionError {
        subject: Subject::Callable(subject),
        reason: uninvocable_reason(callable),
        suggestions: Vec::new(),
    })
}

fn uninvocable_reason(callable: &Value) -> InvalidReason {
    match callable {
        Value::Str(name) => InvalidReason::Unreflectable(name.clone()),
        _ => InvalidReason::NotInvocable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::fixtures::{self, SimpleClass, StaticFactoryClass};
    use crate::reflect::Function;

    fn key(name: &str) -> DependencyKey {
        DependencyKey::new(name)
    }

    fn simple() -> Value {
        Value::from(Object::new("SimpleClass", SimpleClass))
    }

    fn closure() -> Value {
        Value::from(Function::closure(vec![], |_| Ok(Value::Null)))
    }

    fn reason(result: Result<Definition>) -> InvalidReason {
        match result {
            Err(AutowireError::InvalidDefinition(e)) => e.reason,
            Err(other) => panic!("Expected InvalidDefinition, got: {other:?}"),
            Ok(definition) => panic!("Expected an error, got: {definition:?}"),
        }
    }

    #[test]
    fn implicit_classification() {
        let types = fixtures::catalog();
        let cases = [
            ("SimpleClassInterface", Value::from("SimpleClass"), DefinitionKind::Alias),
            ("SimpleClassInterface", closure(), DefinitionKind::Factory),
            ("SimpleClassInterface", Value::from("StaticFactoryClass::build"), DefinitionKind::Factory),
            ("SimpleClass", Value::from("trim"), DefinitionKind::Factory),
            (
                "SimpleClassInterface",
                Value::from(Object::new("InvokableClass", fixtures::InvokableClass)),
                DefinitionKind::Factory,
            ),
            ("SimpleClassInterface", simple(), DefinitionKind::Instance),
            ("SimpleClass", simple(), DefinitionKind::Instance),
        ];

        for (source, raw, expected) in cases {
            let definition = Definition::classify(&types, key(source), raw, None).unwrap();
            assert_eq!(definition.kind(), expected, "{source}");
            assert_eq!(definition.source(), &key(source));
        }
    }

    #[test]
    fn explicit_kind_is_constructed_directly() {
        let types = fixtures::catalog();

        let alias = Definition::classify(
            &types,
            key("SimpleClassInterface"),
            Value::from("SimpleClass"),
            Some(DefinitionKind::Alias),
        )
        .unwrap();
        assert!(matches!(alias.payload(), Payload::Alias(target) if target == &key("SimpleClass")));

        let factory = Definition::classify(
            &types,
            key("SimpleClassInterface"),
            closure(),
            Some(DefinitionKind::Factory),
        )
        .unwrap();
        assert_eq!(factory.kind(), DefinitionKind::Factory);

        let instance = Definition::classify(
            &types,
            key("SimpleClassInterface"),
            simple(),
            Some(DefinitionKind::Instance),
        )
        .unwrap();
        assert_eq!(instance.kind(), DefinitionKind::Instance);
    }

    #[test]
    fn explicit_kind_rejects_wrong_shape() {
        let types = fixtures::catalog();

        assert_eq!(
            reason(Definition::classify(&types, key("SimpleClassInterface"), simple(), Some(DefinitionKind::Alias))),
            InvalidReason::ExpectedTypeName("object")
        );
        assert_eq!(
            reason(Definition::classify(&types, key("SimpleClassInterface"), simple(), Some(DefinitionKind::Factory))),
            InvalidReason::NotInvocable
        );
        assert_eq!(
            reason(Definition::classify(&types, key("SimpleClassInterface"), closure(), Some(DefinitionKind::Instance))),
            InvalidReason::Unsatisfied(key("SimpleClassInterface"))
        );
    }

    #[test]
    fn invalid_aliases() {
        let types = fixtures::catalog();

        assert_eq!(
            reason(Definition::alias(&types, key("SimpleClass"), key("SimpleClass"))),
            InvalidReason::SelfAlias(key("SimpleClass"))
        );
        assert_eq!(
            reason(Definition::alias(&types, key("Foo"), key("SimpleClass"))),
            InvalidReason::UnknownType(key("Foo"))
        );
        assert_eq!(
            reason(Definition::alias(&types, key("SimpleClassInterface"), key("Foo"))),
            InvalidReason::UnknownType(key("Foo"))
        );
        assert_eq!(
            reason(Definition::alias(&types, key("Foo"), key("Foo"))),
            InvalidReason::UnknownType(key("Foo"))
        );
    }

    #[test]
    fn self_alias_rejected_for_every_known_type() {
        let types = fixtures::catalog();
        for known in types.known_types() {
            assert_eq!(
                reason(Definition::alias(&types, known.clone(), known.clone())),
                InvalidReason::SelfAlias(known)
            );
        }
    }

    #[test]
    fn invalid_factories() {
        let types = fixtures::catalog();

        assert_eq!(
            reason(Definition::factory(&types, key("notAClassname"), &closure())),
            InvalidReason::UnknownType(key("notAClassname"))
        );
        assert_eq!(
            reason(Definition::factory(&types, key("SimpleClassInterface"), &Value::from("notACallable"))),
            InvalidReason::Unreflectable("notACallable".into())
        );
        assert_eq!(
            reason(Definition::factory(&types, key("SimpleClassInterface"), &Value::from("unknownClass::method"))),
            InvalidReason::Unreflectable("unknownClass::method".into())
        );
    }

    #[test]
    fn invalid_instances() {
        let types = fixtures::catalog();

        assert_eq!(
            reason(Definition::instance(&types, key("notAClassname"), simple())),
            InvalidReason::UnknownType(key("notAClassname"))
        );
        let factory = Value::from(Object::new("StaticFactoryClass", StaticFactoryClass));
        assert_eq!(
            reason(Definition::instance(&types, key("SimpleClassInterface"), factory)),
            InvalidReason::Unsatisfied(key("SimpleClassInterface"))
        );
        assert_eq!(
            reason(Definition::instance(&types, key("SimpleClass"), Value::from("SimpleClass"))),
            InvalidReason::Unsatisfied(key("SimpleClass"))
        );
    }

    #[test]
    fn implicit_classification_failures() {
        let types = fixtures::catalog();
        let factory = Value::from(Object::new("StaticFactoryClass", StaticFactoryClass));
        let cases = [
            ("SimpleClass", Value::from("SimpleClass")),
            ("Foo", Value::from("SimpleClass")),
            ("SimpleClassInterface", Value::from("Foo")),
            ("Foo", Value::from("Foo")),
            ("notAClassname", closure()),
            ("SimpleClassInterface", Value::from("notACallable")),
            ("notAClassname", simple()),
            ("SimpleClassInterface", factory),
            ("SimpleClass", Value::from(42)),
        ];

        for (source, raw) in cases {
            let result = Definition::classify(&types, key(source), raw, None);
            assert!(
                matches!(result, Err(AutowireError::InvalidDefinition(_))),
                "{source}: {result:?}"
            );
        }
    }

    #[test]
    fn unknown_source_carries_suggestions() {
        let types = fixtures::catalog();
        let err = Definition::classify(&types, key("SimpleClas"), simple(), None).unwrap_err();

        match err {
            AutowireError::InvalidDefinition(e) => {
                assert!(e.suggestions.contains(&"SimpleClass".to_string()));
                assert!(e.to_string().contains("Did you mean"));
            }
            other => panic!("Expected InvalidDefinition, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_source_is_checked_first_on_empty_catalog() {
        let types = TypeCatalog::new();
        assert_eq!(
            reason(Definition::classify(&types, key("SimpleClass"), simple(), None)),
            InvalidReason::UnknownType(key("SimpleClass"))
        );
    }
}

//! Error types for container operations.
//!
//! The three resolution failures are kept apart so callers can tell a broken
//! binding ([`AutowireError::InvalidDefinition`]) from a broken graph
//! ([`AutowireError::CircularDependency`]) and from missing information
//! ([`AutowireError::NotResolvable`]).

use std::fmt;

use autowire_support::rendering::render_chain;

use crate::key::DependencyKey;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum AutowireError {
    /// A binding is malformed, or an unbound type cannot be instantiated.
    #[error("{}", .0)]
    InvalidDefinition(InvalidDefinitionError),

    /// A type was requested while already being resolved on the same chain.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A required parameter has no override, no default and no class type.
    #[error("{}", .0)]
    NotResolvable(NotResolvableError),

    /// A user supplied constructor, factory or method failed.
    #[error("Failed to call {owner}: {source}")]
    ConstructionFailed {
        owner: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A callable read an argument that is missing or of another shape.
    #[error("Argument `{parameter}` is missing or is not {expected}")]
    BadArgument {
        parameter: String,
        expected: &'static str,
    },
}

impl AutowireError {
    /// Wraps an arbitrary error raised by user code.
    pub fn construction(
        owner: impl fmt::Display,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConstructionFailed {
            owner: owner.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid(key: &DependencyKey, reason: InvalidReason) -> Self {
        Self::InvalidDefinition(InvalidDefinitionError {
            subject: Subject::Binding(key.clone()),
            reason,
            suggestions: Vec::new(),
        })
    }
}

/// Why a definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("`{0}` is not a known class or interface")]
    UnknownType(DependencyKey),

    #[error("`{0}` cannot be an alias of itself")]
    SelfAlias(DependencyKey),

    #[error("value is not invocable")]
    NotInvocable,

    #[error("value does not satisfy `{0}`")]
    Unsatisfied(DependencyKey),

    #[error("callable `{0}` cannot be reflected")]
    Unreflectable(String),

    #[error("`{0}` is not instantiable")]
    NotInstantiable(DependencyKey),

    #[error("expected a type name, got {0}")]
    ExpectedTypeName(&'static str),

    #[error("{0} value is neither a known type name, a callable nor a matching instance")]
    Unclassifiable(&'static str),
}

/// What a rejected definition was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A binding, or an auto-wired type, under this identifier.
    Binding(DependencyKey),
    /// A value passed to `invoke`.
    Callable(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Binding(key) => write!(f, "Invalid definition for {key}"),
            Subject::Callable(callable) => write!(f, "Cannot invoke {callable}"),
        }
    }
}

/// Error for a malformed binding or callable.
#[derive(Debug)]
pub struct InvalidDefinitionError {
    pub subject: Subject,
    pub reason: InvalidReason,
    /// Known identifiers close to an unknown one
    pub suggestions: Vec<String>,
}

impl fmt::Display for InvalidDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.reason)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        match &self.reason {
            InvalidReason::NotInstantiable(key) => write!(
                f,
                "\n  Hint: bind an alias, factory or instance for {key}"
            ),
            _ => Ok(()),
        }
    }
}

/// Error when a circular dependency is detected.
///
/// `chain` runs from the outermost request to the repeated identifier,
/// e.g. `["A", "B", "A"]`.
#[derive(Debug)]
pub struct CircularDependencyError {
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  ")?;
        write!(f, "{}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: break the cycle with a factory or supply one side as an instance"
        )
    }
}

/// Error when a required parameter cannot be guessed.
#[derive(Debug)]
pub struct NotResolvableError {
    pub parameter: String,
    /// The type or callable declaring the parameter
    pub owner: String,
}

impl fmt::Display for NotResolvableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter `{}` of {} has no class type and cannot be resolved",
            self.parameter, self.owner
        )?;
        write!(
            f,
            "\n  Hint: pass an override named \"{}\"",
            self.parameter
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, AutowireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_definition_display() {
        let err = AutowireError::InvalidDefinition(InvalidDefinitionError {
            subject: Subject::Binding(DependencyKey::new("Foo")),
            reason: InvalidReason::UnknownType(DependencyKey::new("Foo")),
            suggestions: vec!["FooService".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Invalid definition for Foo"));
        assert!(msg.contains("not a known class"));
        assert!(msg.contains("FooService"));
    }

    #[test]
    fn uninvocable_callable_display() {
        let err = AutowireError::InvalidDefinition(InvalidDefinitionError {
            subject: Subject::Callable("42".into()),
            reason: InvalidReason::NotInvocable,
            suggestions: Vec::new(),
        });

        let msg = format!("{err}");
        assert!(msg.starts_with("Cannot invoke 42"));
        assert!(!msg.contains("Invalid definition"));
    }

    #[test]
    fn circular_dependency_error_display() {
        let err = AutowireError::CircularDependency(CircularDependencyError {
            chain: vec![
                DependencyKey::new("A"),
                DependencyKey::new("B"),
                DependencyKey::new("A"),
            ],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Circular"));
        assert!(msg.contains("A → B → A"));
    }

    #[test]
    fn not_resolvable_error_display() {
        let err = AutowireError::NotResolvable(NotResolvableError {
            parameter: "foo".into(),
            owner: "BuiltinParameter::new".into(),
        });

        let msg = format!("{err}");
        assert!(msg.contains("`foo`"));
        assert!(msg.contains("BuiltinParameter::new"));
        assert!(msg.contains("override"));
    }

    #[test]
    fn construction_failed_keeps_source() {
        use std::error::Error as _;

        let err = AutowireError::construction("Mailer::new", "smtp unreachable");
        assert!(err.to_string().contains("Mailer::new"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("smtp unreachable"));
    }
}

//! Provider trait: a group of related bindings.
//!
//! # Examples
//! ```rust,ignore
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container.set_alias("MailerInterface", "SmtpMailer")?;
//!         container.set_factory("Transport", "TransportFactory::build")
//!     }
//! }
//! ```

use crate::container::Container;
use crate::error::Result;

/// Registers related bindings into a container.
///
/// Applied in order by [`ContainerBuilder::build`](crate::container::ContainerBuilder::build);
/// the first error aborts the build. Any `Fn(&Container) -> Result<()>` is a
/// provider.
pub trait Provider: Send + Sync {
    fn register(&self, container: &Container) -> Result<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Provider for F
where
    F: Fn(&Container) -> Result<()> + Send + Sync,
{
    fn register(&self, container: &Container) -> Result<()> {
        self(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerBuilder;
    use crate::error::AutowireError;
    use crate::fixtures;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AliasProvider;

    impl Provider for AliasProvider {
        fn register(&self, container: &Container) -> Result<()> {
            container.set_alias("SimpleClassInterface", "SimpleClass")
        }
    }

    fn builder() -> ContainerBuilder {
        Container::builder().types(Arc::new(fixtures::catalog()))
    }

    #[test]
    fn provider_registers_bindings() {
        let container = builder().provider(AliasProvider).build().unwrap();
        assert!(container.has_definition("SimpleClassInterface"));
        assert!(container.has("SimpleClassInterface"));
    }

    #[test]
    fn providers_run_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let first = calls.clone();
        let second = calls.clone();

        builder()
            .provider(move |_: &Container| {
                assert_eq!(first.fetch_add(1, Ordering::SeqCst), 0);
                Ok(())
            })
            .provider(move |_: &Container| {
                assert_eq!(second.fetch_add(1, Ordering::SeqCst), 1);
                Ok(())
            })
            .build()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_provider_stops_build() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = builder()
            .provider(|c: &Container| c.set_alias("SimpleClass", "SimpleClass"))
            .provider(move |_: &Container| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        assert!(matches!(result, Err(AutowireError::InvalidDefinition(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn provider_has_name() {
        assert!(AliasProvider.name().contains("AliasProvider"));
    }
}

//! # Autowire: an auto-wiring dependency injection container
//!
//! Bind identifiers to aliases, factories or instances, or let the container
//! build them by resolving constructor parameters recursively.
//!
//! ```rust
//! use autowire::prelude::*;
//! use std::sync::Arc;
//!
//! struct Clock;
//!
//! let types = Arc::new(TypeCatalog::new());
//! types
//!     .declare(TypeInfo::interface("ClockInterface"))
//!     .declare(TypeInfo::concrete("SystemClock").implements("ClockInterface").bare(|| Clock));
//!
//! let container = Container::new(types);
//! container.set_alias("ClockInterface", "SystemClock")?;
//! assert!(container.get_as::<Clock>("ClockInterface").is_ok());
//! # Ok::<(), AutowireError>(())
//! ```

pub use autowire_container::*;
pub use autowire_support::*;

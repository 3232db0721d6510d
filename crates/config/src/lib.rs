//! Layered ini configuration and typed option descriptors for Girder.
//!
//! The crate has three layers:
//!
//! - [`ini`]: the textual document model, with canonical serialization.
//! - [`store`]: [`Configuration`], which stacks one ini file on top of the
//!   parents named by its `[inherit] file` entry and resolves reads
//!   through own data, parents, registered defaults, and finally the
//!   caller's default.
//! - [`option`]: static [`OptionDef`] declarations collected into an
//!   [`OptionRegistry`] at link time, giving every known key a type, a
//!   normalized default, and documentation.
//!
//! The [`extension`] module bridges to `girder-component`: option values
//! can name component implementations by short class name, and the
//! `[components]` section feeds the prefix-based enablement policy.
//!
//! ```ignore
//! static STRICT: OptionDef = OptionDef::bool(
//!     "orders", "strict_validation", "enabled",
//!     "Reject orders that fail any validation rule.",
//! );
//! inventory::submit!(OptionReg(&STRICT));
//!
//! let config = Configuration::new("girder.ini")?;
//! if config.getbool("orders", "strict_validation", "") {
//!     // ...
//! }
//! ```

pub mod error;
pub mod extension;
pub mod file;
pub mod ini;
pub mod option;
pub mod store;

pub use error::ConfigError;
pub use extension::{component_rules, extension_component, ordered_extensions};
pub use ini::IniDocument;
pub use option::{OptionDef, OptionKind, OptionReg, OptionRegistry, OptionValue, as_bool};
pub use store::{Configuration, Section};

//! phphints-linters: External PHP linters behind one interface
//!
//! Three adapters wrap the tools this crate knows about:
//!
//! - `phplint`: nikic/PHP-Parser's `php-parse` script, for syntax errors
//! - `phpmd`: PHP Mess Detector, one run per matching ruleset
//! - `phpcs`: PHP_CodeSniffer, one run per matching standard
//!
//! Each adapter launches its tool once per request, blocks until it exits
//! and turns the report into [`Hint`](phphints_core::Hint)s. The
//! [`HintManager`] runs the active adapters over a temporary copy of a
//! document and returns the combined hints sorted by priority.
//!
//! # Example
//!
//! ```ignore
//! use phphints_linters::{HintManager, ToolPaths};
//!
//! let mut manager = HintManager::with_defaults(&ToolPaths::default(), data_dir)?;
//! manager.set_adapter_state("phpcs", true)?;
//! let report = manager.hints_for_file(Path::new("src/Foo.php"), None)?;
//! ```

pub mod adapters;
mod csv;
mod manager;
mod registry;

pub use adapters::{Adapter, AdapterError, PhpCs, PhpLint, PhpMd, ToolPaths};
pub use manager::{AdapterFailure, HintManager, LintReport, ManagerError};
pub use registry::{RegistryError, Ruleset, RulesetRegistry};

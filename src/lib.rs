//! ansible-setup: run ansible playbooks as per-test setup
//!
//! A thin harness plugin: test cases declare the playbooks their setup
//! needs, and a fixture shells out to `ansible-playbook` for each one before
//! the test body runs. A nonzero exit from any playbook errors the test
//! early, so the body never executes against a half-converged environment.
//!
//! # Overview
//!
//! Three pieces:
//!
//! - [`SetupArgs`] / [`SetupConfig`] — the command-line options and the
//!   once-validated session configuration built from them. Validation runs
//!   once, before any test, and aborts the whole session on a bad path.
//! - [`MarkerRegistry`] — a side-table mapping test-case names to the
//!   playbook files their setup runs, filled in at test-definition time.
//! - [`PlaybookRunner`] — the fixture: looks the requesting test up in the
//!   registry and runs its playbooks in declared order, stopping at the
//!   first failure.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ansible_setup::{MarkerRegistry, PlaybookRunner, SetupConfig};
//!
//! let config = SetupConfig::new()
//!     .playbook_directory("/srv/playbooks")
//!     .inventory("inventory.ini");
//! config.validate().expect("bad ansible-playbook options");
//!
//! let mut registry = MarkerRegistry::new();
//! registry.mark("converges_cluster", ["site.yml"]);
//!
//! let mut runner = PlaybookRunner::new(config);
//! runner.run_setup_or_panic("converges_cluster", &registry);
//! ```
//!
//! # Options
//!
//! | Option | Description |
//! |--------|-------------|
//! | `--ansible-playbook-directory PLAYBOOK_DIR` | Directory where playbooks are stored; also the working directory for each invocation |
//! | `--ansible-playbook-inventory INVENTORY_FILE` | Inventory file, absolute or relative to the playbook directory |
//!
//! Each playbook runs as `ansible-playbook -vv -i <inventory> <playbook>`
//! with inherited stdio, so the verbose output streams live to the console.
//! Exit 0 means success; anything else errors the requesting test and skips
//! the rest of its declared playbooks.

mod config;
mod error;
mod marker;
mod runner;

pub use config::{SetupArgs, SetupConfig};
pub use error::{ErrorKind, SetupError};
pub use marker::{MarkerRegistry, PlaybookSet};
pub use runner::{program_on_path, PlaybookRunner, DEFAULT_PROGRAM};

//! Session configuration
//!
//! Two command-line options registered with the host binary's argument
//! parser, and the once-per-session validation that rejects bad paths before
//! any test runs. Failing fast here keeps a mistyped path from surfacing as
//! a confusing per-test error later.

use std::path::PathBuf;

use clap::Args;

use crate::error::SetupError;

/// Command-line options for playbook-driven setup.
///
/// Flatten into the host binary's parser to register them:
///
/// ```rust,no_run
/// use clap::Parser;
/// use ansible_setup::SetupArgs;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     setup: SetupArgs,
/// }
///
/// let config = Cli::parse().setup.into_config();
/// ```
///
/// No validation happens at parse time; call [`SetupConfig::validate`] once
/// the session configuration is complete.
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "ansible-playbook")]
pub struct SetupArgs {
    /// Directory where ansible playbooks are stored
    #[arg(long = "ansible-playbook-directory", value_name = "PLAYBOOK_DIR")]
    pub playbook_directory: Option<PathBuf>,

    /// Ansible inventory file, absolute or relative to the playbook directory
    #[arg(long = "ansible-playbook-inventory", value_name = "INVENTORY_FILE")]
    pub inventory: Option<PathBuf>,
}

impl SetupArgs {
    /// Convert parsed options into a session configuration.
    pub fn into_config(self) -> SetupConfig {
        SetupConfig {
            playbook_directory: self.playbook_directory,
            inventory: self.inventory,
        }
    }
}

/// Session configuration: set once at session start, immutable thereafter.
///
/// Both fields are optional. When set, [`validate`](Self::validate) requires
/// the directory to exist as a directory and the resolved inventory to exist
/// as a file.
#[derive(Debug, Clone, Default)]
pub struct SetupConfig {
    /// Directory holding playbook files; also the working directory for
    /// every playbook invocation.
    pub playbook_directory: Option<PathBuf>,
    /// Inventory file, absolute or relative to `playbook_directory`.
    pub inventory: Option<PathBuf>,
}

impl SetupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the playbook directory.
    pub fn playbook_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.playbook_directory = Some(dir.into());
        self
    }

    /// Set the inventory file.
    pub fn inventory(mut self, inventory: impl Into<PathBuf>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    /// Resolve the inventory path.
    ///
    /// A relative inventory joins onto the playbook directory when one is
    /// configured. With no directory configured, a relative inventory is
    /// used as given and resolves against the process working directory.
    pub fn resolved_inventory(&self) -> Option<PathBuf> {
        let inventory = self.inventory.as_ref()?;
        if inventory.is_relative() {
            if let Some(ref dir) = self.playbook_directory {
                return Some(dir.join(inventory));
            }
        }
        Some(inventory.clone())
    }

    /// Validate the configured paths.
    ///
    /// Invoked once, after options are parsed and before any test executes.
    /// An error here is session-fatal: the caller must abort the whole run
    /// with the message, which names the offending path.
    pub fn validate(&self) -> Result<(), SetupError> {
        if let Some(ref dir) = self.playbook_directory {
            if !dir.is_dir() {
                return Err(SetupError::config(format!(
                    "value of --ansible-playbook-directory option ({}) is not a directory",
                    dir.display(),
                )));
            }
        }
        let inventory = match self.resolved_inventory() {
            Some(path) => path,
            None => return Ok(()),
        };
        if !inventory.is_file() {
            return Err(SetupError::config(format!(
                "value of --ansible-playbook-inventory option ({}) is not accessible",
                inventory.display(),
            )));
        }
        Ok(())
    }
}

//! Setup errors

use std::fmt;

/// The kind of setup error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad option value, caught at session configuration time
    Config,
    /// Missing or empty playbook declaration on a test case
    Usage,
    /// The automation program exited with a nonzero status
    Exec,
    /// IO error while spawning the automation program
    Io,
}

/// A setup error with test-case and playbook context
#[derive(Debug)]
pub struct SetupError {
    pub kind: ErrorKind,
    pub message: String,
    pub test: Option<String>,
    pub playbook: Option<String>,
}

impl SetupError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            test: None,
            playbook: None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, msg)
    }

    pub fn exec(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Exec, msg)
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    pub fn with_playbook(mut self, playbook: impl Into<String>) -> Self {
        self.playbook = Some(playbook.into());
        self
    }

    /// Session-fatal: the whole run must abort before any test executes.
    pub fn is_config(&self) -> bool {
        self.kind == ErrorKind::Config
    }

    /// Test-fatal: the requesting test case errors, the session continues.
    pub fn is_usage(&self) -> bool {
        self.kind == ErrorKind::Usage
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref test) = self.test {
            write!(f, "{}: ", test)?;
        }
        if let Some(ref playbook) = self.playbook {
            write!(f, "{}: ", playbook)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SetupError {}

impl From<std::io::Error> for SetupError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

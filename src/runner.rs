//! Playbook setup runner
//!
//! The fixture half of the plugin: a test case asks the runner to execute
//! its declared playbooks before the test body runs. Execution is
//! synchronous and strictly sequential; the first nonzero exit aborts the
//! remaining playbooks and errors the requesting test. Process stdout and
//! stderr are inherited, so the automation tool's verbose output streams
//! live to the test run's console.

use std::process::Command;

use crate::config::SetupConfig;
use crate::error::{ErrorKind, SetupError};
use crate::marker::{MarkerRegistry, PlaybookSet};

/// The automation program invoked for each playbook.
pub const DEFAULT_PROGRAM: &str = "ansible-playbook";

/// Runs a test case's declared playbooks as its setup.
///
/// Holds a validated [`SetupConfig`]; one runner can serve many test cases.
pub struct PlaybookRunner {
    config: SetupConfig,
    program: String,
    quiet: bool,
    log: String,
}

impl PlaybookRunner {
    pub fn new(config: SetupConfig) -> Self {
        Self {
            config,
            program: DEFAULT_PROGRAM.to_string(),
            quiet: false,
            log: String::new(),
        }
    }

    /// Override the automation program. Tests point this at a stub.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Suppress invocation logging.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Invocation log accumulated across runs.
    pub fn log(&self) -> &str {
        &self.log
    }

    fn logf(&mut self, msg: &str) {
        self.log.push_str(msg);
        if !msg.ends_with('\n') {
            self.log.push('\n');
        }
    }

    /// Run the playbooks declared for `test_name`, in declared order.
    ///
    /// Errors before any process is spawned when the test has no declaration
    /// in `registry`, or an empty one. Otherwise each playbook runs as
    /// `<program> -vv [-i <inventory>] <playbook>` with the playbook
    /// directory as working directory, and the first failure aborts the rest.
    ///
    /// `Ok(())` is the only success signal; no result value is produced.
    pub fn run_setup(
        &mut self,
        test_name: &str,
        registry: &MarkerRegistry,
    ) -> Result<(), SetupError> {
        let set = registry.get(test_name).ok_or_else(|| {
            SetupError::usage(format!(
                "no playbook declared for this test case; add a declaration like \
                 `registry.mark(\"{}\", [\"playbook.yml\"])` so the setup runner \
                 knows which playbook to use",
                test_name,
            ))
            .with_test(test_name)
        })?;
        if set.is_empty() {
            return Err(SetupError::usage(format!(
                "playbook declaration for this test case is empty; add at least \
                 one playbook file name, e.g. \
                 `registry.mark(\"{}\", [\"playbook.yml\"])`",
                test_name,
            ))
            .with_test(test_name));
        }
        self.run_set(test_name, set)
    }

    /// Run the playbooks declared for `test_name`, panicking on any setup
    /// error so the requesting test errors before its body executes.
    ///
    /// Usage in cargo tests:
    /// ```rust,ignore
    /// #[test]
    /// fn converges_cluster() {
    ///     runner().run_setup_or_panic("converges_cluster", &registry());
    ///     // test body runs only after every playbook exited 0
    /// }
    /// ```
    pub fn run_setup_or_panic(&mut self, test_name: &str, registry: &MarkerRegistry) {
        if let Err(e) = self.run_setup(test_name, registry) {
            panic!("{}", e);
        }
    }

    /// Run an explicit playbook set under a label, bypassing the registry.
    /// The CLI driver uses this; test fixtures go through [`run_setup`]
    /// (which enforces the non-empty declaration invariant).
    ///
    /// [`run_setup`]: Self::run_setup
    pub fn run_set(&mut self, label: &str, set: &PlaybookSet) -> Result<(), SetupError> {
        for playbook in set.iter() {
            self.run_playbook(label, playbook)?;
        }
        Ok(())
    }

    fn run_playbook(&mut self, label: &str, playbook: &str) -> Result<(), SetupError> {
        let inventory = self.config.resolved_inventory();

        let mut cmd = Command::new(&self.program);
        cmd.arg("-vv");
        if let Some(ref inv) = inventory {
            cmd.arg("-i").arg(inv);
        }
        cmd.arg(playbook);
        if let Some(ref dir) = self.config.playbook_directory {
            cmd.current_dir(dir);
        }

        if !self.quiet {
            let line = match inventory {
                Some(ref inv) => {
                    format!("> {} -vv -i {} {}", self.program, inv.display(), playbook)
                }
                None => format!("> {} -vv {}", self.program, playbook),
            };
            self.logf(&line);
        }

        // stdio is inherited: verbose output streams straight to the console
        let status = cmd.status().map_err(|e| {
            SetupError::new(
                ErrorKind::Io,
                format!("failed to execute '{}': {}", self.program, e),
            )
            .with_test(label)
            .with_playbook(playbook)
        })?;

        if !status.success() {
            let detail = match status.code() {
                Some(code) => format!("{} failed with exit code {}", self.program, code),
                None => format!("{} terminated by signal", self.program),
            };
            return Err(SetupError::exec(detail)
                .with_test(label)
                .with_playbook(playbook));
        }
        Ok(())
    }
}

/// Check whether `name` is an executable on the process's PATH.
///
/// Used by the CLI's `--probe` and by tests that skip when the automation
/// tool is not installed.
pub fn program_on_path(name: &str) -> bool {
    let path_var = match std::env::var_os("PATH") {
        Some(v) => v,
        None => return false,
    };

    #[cfg(windows)]
    let extensions: Vec<String> = std::env::var("PATHEXT")
        .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
        .split(';')
        .map(|s| s.to_lowercase())
        .collect();

    for dir in std::env::split_paths(&path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = std::fs::metadata(&candidate) {
                if meta.is_file() && meta.permissions().mode() & 0o111 != 0 {
                    return true;
                }
            }
        }

        #[cfg(windows)]
        {
            if candidate.is_file() {
                return true;
            }
            for ext in &extensions {
                let with_ext = candidate.with_extension(ext.trim_start_matches('.'));
                if with_ext.is_file() {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerRegistry;

    fn runner() -> PlaybookRunner {
        PlaybookRunner::new(SetupConfig::new())
    }

    #[test]
    fn missing_declaration_is_a_usage_error_naming_the_marker() {
        let registry = MarkerRegistry::new();
        let err = runner().run_setup("undeclared", &registry).unwrap_err();
        assert!(err.is_usage());
        assert_eq!(err.test.as_deref(), Some("undeclared"));
        assert!(err.message.contains("mark("));
        assert!(err.message.contains("no playbook declared"));
    }

    #[test]
    fn empty_declaration_is_a_usage_error() {
        let mut registry = MarkerRegistry::new();
        registry.mark("empty", Vec::<String>::new());
        let err = runner().run_setup("empty", &registry).unwrap_err();
        assert!(err.is_usage());
        assert!(err.message.contains("at least one playbook file name"));
    }

    #[test]
    #[should_panic(expected = "no playbook declared")]
    fn run_setup_or_panic_panics_on_missing_declaration() {
        let registry = MarkerRegistry::new();
        runner().run_setup_or_panic("undeclared", &registry);
    }

    #[cfg(unix)]
    mod with_stub {
        use super::*;
        use std::path::Path;

        /// Write an executable stub that records its working directory and
        /// arguments to `log`, then exits with `exit_code`.
        fn write_stub(dir: &Path, log: &Path, exit_code: i32) -> String {
            use std::os::unix::fs::PermissionsExt;
            let path = dir.join("fake-ansible-playbook");
            let script = format!(
                "#!/bin/sh\necho \"$(pwd)|$*\" >> \"{}\"\nexit {}\n",
                log.display(),
                exit_code,
            );
            std::fs::write(&path, script).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.display().to_string()
        }

        fn read_lines(log: &Path) -> Vec<String> {
            std::fs::read_to_string(log)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[test]
        fn runs_playbooks_in_declared_order_with_inventory_and_cwd() {
            let scratch = tempfile::tempdir().unwrap();
            let playbooks = tempfile::tempdir().unwrap();
            std::fs::write(playbooks.path().join("inv.ini"), "[all]\n").unwrap();
            let log = scratch.path().join("calls.log");
            let stub = write_stub(scratch.path(), &log, 0);

            let config = SetupConfig::new()
                .playbook_directory(playbooks.path())
                .inventory("inv.ini");
            let mut registry = MarkerRegistry::new();
            registry.mark("two_playbooks", ["a.yml", "b.yml"]);

            let mut runner = PlaybookRunner::new(config).program(stub.as_str());
            runner.run_setup("two_playbooks", &registry).unwrap();

            let calls = read_lines(&log);
            assert_eq!(calls.len(), 2);
            let inventory = playbooks.path().join("inv.ini");
            assert!(calls[0].ends_with(&format!("-vv -i {} a.yml", inventory.display())));
            assert!(calls[1].ends_with(&format!("-vv -i {} b.yml", inventory.display())));
            // Working directory is the playbook directory
            let cwd = playbooks.path().canonicalize().unwrap();
            for call in &calls {
                assert!(call.starts_with(&cwd.display().to_string()));
            }
        }

        #[test]
        fn first_failure_skips_remaining_playbooks() {
            let scratch = tempfile::tempdir().unwrap();
            let log = scratch.path().join("calls.log");
            let stub = write_stub(scratch.path(), &log, 2);

            let mut registry = MarkerRegistry::new();
            registry.mark("fails_early", ["a.yml", "b.yml"]);

            let mut runner = PlaybookRunner::new(SetupConfig::new()).program(stub.as_str());
            let err = runner.run_setup("fails_early", &registry).unwrap_err();

            assert_eq!(err.kind, ErrorKind::Exec);
            assert_eq!(err.playbook.as_deref(), Some("a.yml"));
            assert!(err.message.contains("exit code 2"));
            assert_eq!(read_lines(&log).len(), 1);
        }

        #[test]
        fn no_inventory_omits_the_flag() {
            let scratch = tempfile::tempdir().unwrap();
            let log = scratch.path().join("calls.log");
            let stub = write_stub(scratch.path(), &log, 0);

            let mut registry = MarkerRegistry::new();
            registry.mark("bare", ["site.yml"]);

            let mut runner = PlaybookRunner::new(SetupConfig::new()).program(stub.as_str());
            runner.run_setup("bare", &registry).unwrap();

            let calls = read_lines(&log);
            assert_eq!(calls.len(), 1);
            assert!(calls[0].ends_with("-vv site.yml"));
            assert!(!calls[0].contains("-i "));
        }

        #[test]
        fn log_records_each_invocation() {
            let scratch = tempfile::tempdir().unwrap();
            let log = scratch.path().join("calls.log");
            let stub = write_stub(scratch.path(), &log, 0);

            let mut registry = MarkerRegistry::new();
            registry.mark("logged", ["site.yml"]);

            let mut runner = PlaybookRunner::new(SetupConfig::new()).program(stub.as_str());
            runner.run_setup("logged", &registry).unwrap();
            assert!(runner.log().contains(&format!("> {} -vv site.yml", stub)));

            let mut quiet = PlaybookRunner::new(SetupConfig::new())
                .program(stub.as_str())
                .quiet(true);
            quiet.run_setup("logged", &registry).unwrap();
            assert!(quiet.log().is_empty());
        }

        #[test]
        fn spawn_failure_is_an_io_error() {
            let mut registry = MarkerRegistry::new();
            registry.mark("t", ["site.yml"]);
            let mut runner =
                PlaybookRunner::new(SetupConfig::new()).program("/no/such/program");
            let err = runner.run_setup("t", &registry).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Io);
            assert!(err.message.contains("failed to execute"));
        }
    }

    #[test]
    fn program_on_path_finds_sh_but_not_nonsense() {
        #[cfg(unix)]
        assert!(program_on_path("sh"));
        assert!(!program_on_path("definitely-not-a-real-program-2a78"));
    }
}

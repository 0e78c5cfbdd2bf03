use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{OdiffError, Result};

/// Program name looked up on `PATH` when no executable is configured.
pub const DEFAULT_PROGRAM: &str = "odiff";

/// Captured result of one odiff invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that can execute odiff with an argument vector.
///
/// The comparison façade only talks to this trait, so tests (or callers
/// embedding odiff differently) can swap the subprocess out.
pub trait Runner {
    fn run(&self, args: &[OsString]) -> Result<RunOutput>;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn run(&self, args: &[OsString]) -> Result<RunOutput> {
        (**self).run(args)
    }
}

/// The odiff executable on disk, run as a blocking subprocess.
///
/// Arguments are handed to the OS as a vector (no shell involved), so
/// quoting follows the host convention without extra escaping.
#[derive(Debug, Clone)]
pub struct Executable {
    program: PathBuf,
}

impl Executable {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).stdin(Stdio::null());
        cmd
    }

    /// Run with stdout/stderr inherited from the current process, so the
    /// user sees odiff's own output. Returns the exit code.
    pub fn run_inherited(&self, args: &[OsString]) -> Result<Option<i32>> {
        debug!(program = %self.program.display(), ?args, "running odiff (inherited stdio)");
        let status = self
            .command(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| OdiffError::Launch {
                program: self.program.clone(),
                source,
            })?;
        debug!(code = ?status.code(), "odiff exited");
        Ok(status.code())
    }
}

impl Default for Executable {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Runner for Executable {
    fn run(&self, args: &[OsString]) -> Result<RunOutput> {
        debug!(program = %self.program.display(), ?args, "running odiff");
        let output = self
            .command(args)
            .output()
            .map_err(|source| OdiffError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let out = RunOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(code = ?out.code, stdout = %out.stdout.trim_end(), "odiff exited");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn missing_executable_is_launch_error() {
        let exe = Executable::new("/definitely/not/here/odiff");
        let err = exe.run(&os_args(&["--version"])).unwrap_err();
        match err {
            OdiffError::Launch { program, source } => {
                assert_eq!(program, PathBuf::from("/definitely/not/here/odiff"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected launch error, got {other:?}"),
        }
    }

    #[test]
    fn default_program_is_odiff_on_path() {
        assert_eq!(Executable::default().program(), Path::new("odiff"));
    }

    // The scripts are run through `/bin/sh` rather than exec'd directly, which
    // avoids ETXTBSY races with freshly written files under parallel tests.
    #[cfg(unix)]
    mod unix {
        use super::*;

        fn script(dir: &tempfile::TempDir, body: &str) -> OsString {
            let path = dir.path().join("fake-odiff.sh");
            std::fs::write(&path, body).unwrap();
            path.into_os_string()
        }

        fn run_script(body: &str, args: &[&str]) -> RunOutput {
            let dir = tempfile::TempDir::new().unwrap();
            let mut argv = vec![script(&dir, body)];
            argv.extend(os_args(args));
            Executable::new("/bin/sh").run(&argv).unwrap()
        }

        #[test]
        fn captures_exit_code_and_streams() {
            let out = run_script(
                "echo \"7789;1.16;\"\necho \"warn: $1\" >&2\nexit 22\n",
                &["--parsable-stdout"],
            );
            assert_eq!(out.code, Some(22));
            assert_eq!(out.stdout, "7789;1.16;\n");
            assert_eq!(out.stderr, "warn: --parsable-stdout\n");
        }

        #[test]
        fn arguments_are_passed_verbatim() {
            let out = run_script(
                "for a in \"$@\"; do echo \"[$a]\"; done\n",
                &["with space", "quote\"d", "$HOME"],
            );
            assert_eq!(out.code, Some(0));
            assert_eq!(out.stdout, "[with space]\n[quote\"d]\n[$HOME]\n");
            assert_eq!(out.stderr, "");
        }

        #[test]
        fn unknown_option_stderr_is_kept() {
            let out = run_script(
                "echo \"odiff: unknown option '$1'\" >&2\nexit 124\n",
                &["--unknown"],
            );
            assert_eq!(out.code, Some(124));
            assert_eq!(out.stdout, "");
            assert!(out.stderr.starts_with("odiff: unknown option '--unknown'"));
        }

        #[test]
        fn inherited_run_reports_code() {
            let dir = tempfile::TempDir::new().unwrap();
            let argv = vec![script(&dir, "exit 3\n")];
            let code = Executable::new("/bin/sh").run_inherited(&argv).unwrap();
            assert_eq!(code, Some(3));
        }
    }
}

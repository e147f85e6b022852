//! Thin seam over child-process execution so argument building and fallback
//! logic can be exercised without the real binaries.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::trace;

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Whether a long-running child shows its own output on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Inherit stdout/stderr so progress is visible as it happens
    #[default]
    Live,
    /// Discard child output (used when several jobs run at once)
    Silent,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr.
    async fn capture(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput>;

    /// Run to completion without capturing; returns the exit code.
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        mode: OutputMode,
    ) -> std::io::Result<Option<i32>>;
}

/// Runs real processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn capture(&self, program: &Path, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        trace!("capture: {} {:?}", program.display(), args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        mode: OutputMode,
    ) -> std::io::Result<Option<i32>> {
        trace!("run ({:?}): {} {:?}", mode, program.display(), args);
        let mut cmd = Command::new(program);
        cmd.args(args);

        match mode {
            OutputMode::Live => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Silent => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
            }
        }

        let status = cmd.status().await?;
        Ok(status.code())
    }
}

/// Convenience for building argument vectors from string literals.
pub(crate) fn push_args<I, S>(args: &mut Vec<OsString>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.extend(items.into_iter().map(Into::into));
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner used by resolver and orchestrator tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub enum Scripted {
        Output(ProcessOutput),
        NotFound,
        /// Exit code for `run`, plus lines to append to the `--print-to-file` target
        Run(Option<i32>, Vec<String>),
    }

    #[derive(Default)]
    pub struct FakeRunner {
        pub script: Mutex<VecDeque<Scripted>>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, args: &[OsString]) -> Vec<String> {
            let args: Vec<String> = args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            self.calls.lock().unwrap().push(args.clone());
            args
        }

        fn next(&self) -> Scripted {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("runner called more times than scripted")
        }
    }

    pub fn ok(stdout: &str) -> Scripted {
        Scripted::Output(ProcessOutput {
            code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    pub fn fail(code: i32, stderr: &str) -> Scripted {
        Scripted::Output(ProcessOutput {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn capture(
            &self,
            _program: &Path,
            args: &[OsString],
        ) -> std::io::Result<ProcessOutput> {
            self.record(args);
            match self.next() {
                Scripted::Output(out) => Ok(out),
                Scripted::NotFound => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file",
                )),
                Scripted::Run(..) => panic!("expected capture, script has run"),
            }
        }

        async fn run(
            &self,
            _program: &Path,
            args: &[OsString],
            _mode: OutputMode,
        ) -> std::io::Result<Option<i32>> {
            let args = self.record(args);
            match self.next() {
                Scripted::Run(code, lines) => {
                    if let Some(pos) = args.iter().position(|a| a == "--print-to-file") {
                        let target = &args[pos + 2];
                        let mut body = std::fs::read_to_string(target).unwrap_or_default();
                        for line in lines {
                            body.push_str(&line);
                            body.push('\n');
                        }
                        std::fs::write(target, body)?;
                    }
                    Ok(code)
                }
                Scripted::NotFound => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file",
                )),
                Scripted::Output(_) => panic!("expected run, script has capture output"),
            }
        }
    }
}

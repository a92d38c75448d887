//! Boundary around the external compose CLI. The three operations are used
//! as black boxes: spawn, block, report the exit status.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Result, SequenceError};

/// Overrides compose binary detection. The named program is invoked as-is,
/// with the compose subcommand arguments appended.
pub const COMPOSE_BIN_ENV: &str = "ODUP_COMPOSE_BIN";

// ---------------------------------------------------------------------------
// Step / StepResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Apply,
    Stop,
    Start,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Apply => write!(f, "apply"),
            Step::Stop => write!(f, "stop"),
            Step::Start => write!(f, "start"),
        }
    }
}

/// Exit status of one forwarded operation. Only consulted to decide whether
/// the next step may run; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    pub step: Step,
    pub code: i32,
}

impl StepResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

// ---------------------------------------------------------------------------
// ComposeRunner
// ---------------------------------------------------------------------------

/// The three compose operations the sequencer forwards to.
pub trait ComposeRunner {
    /// `run --rm <service> <command...>`: one-off container, removed after it
    /// exits. Blocks until the command finishes.
    fn run_one_off(&self, service: &str, command: &[String]) -> Result<StepResult>;

    /// `stop <service>`.
    fn stop(&self, service: &str) -> Result<StepResult>;

    /// `up -d <service>`.
    fn start_detached(&self, service: &str) -> Result<StepResult>;
}

impl<R: ComposeRunner + ?Sized> ComposeRunner for &R {
    fn run_one_off(&self, service: &str, command: &[String]) -> Result<StepResult> {
        (**self).run_one_off(service, command)
    }

    fn stop(&self, service: &str) -> Result<StepResult> {
        (**self).stop(service)
    }

    fn start_detached(&self, service: &str) -> Result<StepResult> {
        (**self).start_detached(service)
    }
}

// ---------------------------------------------------------------------------
// DockerCompose
// ---------------------------------------------------------------------------

/// The real compose CLI. Prefers the `docker compose` plugin form, falls back
/// to the standalone `docker-compose` binary. `ODUP_COMPOSE_BIN` overrides
/// both (the integration tests point it at a stub).
pub struct DockerCompose {
    program: PathBuf,
    plugin: bool,
}

impl DockerCompose {
    pub fn detect() -> Result<Self> {
        if let Some(bin) = std::env::var_os(COMPOSE_BIN_ENV) {
            return Ok(Self {
                program: PathBuf::from(bin),
                plugin: false,
            });
        }
        if let Ok(docker) = which::which("docker") {
            return Ok(Self {
                program: docker,
                plugin: true,
            });
        }
        if let Ok(compose) = which::which("docker-compose") {
            return Ok(Self {
                program: compose,
                plugin: false,
            });
        }
        Err(SequenceError::ComposeNotFound)
    }

    /// Spawn with inherited stdio and block. A signal death has no code;
    /// report it as a plain failure.
    fn invoke(&self, step: Step, args: &[&str]) -> Result<StepResult> {
        let mut cmd = Command::new(&self.program);
        if self.plugin {
            cmd.arg("compose");
        }
        cmd.args(args);
        tracing::debug!(%step, ?cmd, "forwarding to compose");
        let status = cmd.status()?;
        let code = status.code().unwrap_or(1);
        Ok(StepResult { step, code })
    }
}

impl ComposeRunner for DockerCompose {
    fn run_one_off(&self, service: &str, command: &[String]) -> Result<StepResult> {
        let mut args = vec!["run", "--rm", service];
        args.extend(command.iter().map(String::as_str));
        self.invoke(Step::Apply, &args)
    }

    fn stop(&self, service: &str) -> Result<StepResult> {
        self.invoke(Step::Stop, &["stop", service])
    }

    fn start_detached(&self, service: &str) -> Result<StepResult> {
        self.invoke(Step::Start, &["up", "-d", service])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins_over_path_lookup() {
        // Set and unset in one test: the var is process-global.
        std::env::set_var(COMPOSE_BIN_ENV, "/tmp/fake-compose");
        let runner = DockerCompose::detect().unwrap();
        std::env::remove_var(COMPOSE_BIN_ENV);

        assert_eq!(runner.program, PathBuf::from("/tmp/fake-compose"));
        assert!(!runner.plugin);
    }

    #[test]
    fn step_result_success_is_exit_zero() {
        assert!(StepResult { step: Step::Apply, code: 0 }.success());
        assert!(!StepResult { step: Step::Stop, code: 137 }.success());
    }
}

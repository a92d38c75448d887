//! The three-step sequence: apply modules in a one-off container, stop the
//! service, start it detached. Each step is gated on the previous exit code;
//! nothing is retried and nothing is rolled back.

use crate::compose::{ComposeRunner, Step, StepResult};
use crate::error::{Result, SequenceError};
use crate::invocation::{Action, Invocation};
use crate::workdir::WorkdirGuard;

/// File names the compose CLI looks for in its project directory.
const COMPOSE_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

pub struct Sequencer<R> {
    runner: R,
}

impl<R: ComposeRunner> Sequencer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run apply, stop, start in that order, halting at the first failure.
    ///
    /// The working directory is switched to the compose path for the whole
    /// sequence and restored on every return path.
    pub fn run(&self, inv: &Invocation) -> Result<()> {
        let _workdir = WorkdirGuard::enter(&inv.compose_path)?;

        if !COMPOSE_FILES.iter().any(|f| inv.compose_path.join(f).is_file()) {
            tracing::warn!(
                path = %inv.compose_path.display(),
                "no compose file found in the compose path"
            );
        }

        self.apply(inv)?;
        self.stop(inv)?;
        self.start(inv)?;

        println!("Done. '{}' is back up with the applied modules.", inv.service);
        Ok(())
    }

    /// Step 1: install/update in a throwaway container that stops itself
    /// after initialization. On failure the service keeps running as before,
    /// so the restart steps are skipped.
    fn apply(&self, inv: &Invocation) -> Result<()> {
        let verb = match inv.action {
            Action::Install(_) => "Installing",
            Action::Update(_) => "Updating",
        };
        println!(
            "{verb} [{}] on database '{}'...",
            inv.action.modules_arg(),
            inv.database
        );

        let command = vec![
            "odoo".to_string(),
            "--stop-after-init".to_string(),
            "-d".to_string(),
            inv.database.clone(),
            inv.action.odoo_flag().to_string(),
            inv.action.modules_arg(),
        ];
        check(self.runner.run_one_off(&inv.service, &command)?)
    }

    /// Step 2: stop the running service. A failure here leaves it partially
    /// stopped; the modules are already applied and there is no rollback.
    fn stop(&self, inv: &Invocation) -> Result<()> {
        println!("Stopping '{}'...", inv.service);
        check(self.runner.stop(&inv.service)?)
    }

    /// Step 3: bring the service back up detached. A failure leaves it
    /// stopped.
    fn start(&self, inv: &Invocation) -> Result<()> {
        println!("Starting '{}' detached...", inv.service);
        check(self.runner.start_detached(&inv.service)?)
    }
}

fn check(result: StepResult) -> Result<()> {
    if result.success() {
        println!("  ok");
        return Ok(());
    }
    Err(match result.step {
        Step::Apply => SequenceError::ApplyFailed { code: result.code },
        Step::Stop => SequenceError::StopFailed { code: result.code },
        Step::Start => SequenceError::StartFailed { code: result.code },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::Invocation;
    use crate::workdir::test_support::CWD_LOCK;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FakeRunner {
        calls: RefCell<Vec<String>>,
        apply_code: i32,
        stop_code: i32,
        start_code: i32,
    }

    impl FakeRunner {
        fn ok() -> Self {
            Self::with_codes(0, 0, 0)
        }

        fn with_codes(apply_code: i32, stop_code: i32, start_code: i32) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                apply_code,
                stop_code,
                start_code,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ComposeRunner for FakeRunner {
        fn run_one_off(&self, service: &str, command: &[String]) -> crate::Result<StepResult> {
            self.calls
                .borrow_mut()
                .push(format!("run {service} {}", command.join(" ")));
            Ok(StepResult { step: Step::Apply, code: self.apply_code })
        }

        fn stop(&self, service: &str) -> crate::Result<StepResult> {
            self.calls.borrow_mut().push(format!("stop {service}"));
            Ok(StepResult { step: Step::Stop, code: self.stop_code })
        }

        fn start_detached(&self, service: &str) -> crate::Result<StepResult> {
            self.calls.borrow_mut().push(format!("up {service}"));
            Ok(StepResult { step: Step::Start, code: self.start_code })
        }
    }

    fn invocation(dir: &TempDir) -> Invocation {
        Invocation::new(Some("a,b,c"), None, Some("training"), Some(dir.path()), "odoo").unwrap()
    }

    #[test]
    fn success_runs_all_steps_in_order() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::ok();

        Sequencer::new(&runner).run(&invocation(&dir)).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "run odoo odoo --stop-after-init -d training -i a,b,c",
                "stop odoo",
                "up odoo",
            ]
        );
    }

    #[test]
    fn apply_failure_skips_stop_and_start_and_restores_cwd() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();
        let runner = FakeRunner::with_codes(1, 0, 0);

        let err = Sequencer::new(&runner).run(&invocation(&dir)).unwrap_err();

        assert!(matches!(err, SequenceError::ApplyFailed { code: 1 }));
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn stop_failure_skips_start() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::with_codes(0, 1, 0);

        let err = Sequencer::new(&runner).run(&invocation(&dir)).unwrap_err();

        assert!(matches!(err, SequenceError::StopFailed { code: 1 }));
        assert_eq!(runner.calls(), vec![
            "run odoo odoo --stop-after-init -d training -i a,b,c",
            "stop odoo",
        ]);
    }

    #[test]
    fn start_failure_carries_the_exit_code() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::with_codes(0, 0, 7);

        let err = Sequencer::new(&runner).run(&invocation(&dir)).unwrap_err();

        assert!(matches!(err, SequenceError::StartFailed { code: 7 }));
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn update_forwards_the_u_flag() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let inv = Invocation::new(None, Some("sd_library_mgmt"), Some("training"), Some(dir.path()), "odoo")
            .unwrap();
        let runner = FakeRunner::ok();

        Sequencer::new(&runner).run(&inv).unwrap();

        assert_eq!(
            runner.calls()[0],
            "run odoo odoo --stop-after-init -d training -u sd_library_mgmt"
        );
    }

    #[test]
    fn service_name_reaches_every_step() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let inv = Invocation::new(Some("base"), None, Some("db"), Some(dir.path()), "web").unwrap();
        let runner = FakeRunner::ok();

        Sequencer::new(&runner).run(&inv).unwrap();

        assert_eq!(runner.calls(), vec![
            "run web odoo --stop-after-init -d db -i base",
            "stop web",
            "up web",
        ]);
    }

    #[test]
    fn cwd_is_restored_after_success() {
        let _cwd = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();
        let runner = FakeRunner::ok();

        Sequencer::new(&runner).run(&invocation(&dir)).unwrap();

        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}

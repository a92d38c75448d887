use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Scoped working-directory change.
///
/// Captures the current directory, switches to `path`, and switches back when
/// dropped — exactly once on every exit path, early aborts included.
#[derive(Debug)]
pub struct WorkdirGuard {
    original: PathBuf,
}

impl WorkdirGuard {
    pub fn enter(path: &Path) -> io::Result<Self> {
        let original = env::current_dir()?;
        env::set_current_dir(path)?;
        Ok(Self { original })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            tracing::warn!(
                original = %self.original.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

use std::path::{Path, PathBuf};

use crate::error::{Result, SequenceError};

/// Compose service the Odoo server runs under when none is given.
pub const DEFAULT_SERVICE: &str = "odoo";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What the apply step does with the module list.
///
/// Built exactly once while parsing the invocation, so the invalid
/// "both install and update" state cannot exist past construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Install(Vec<String>),
    Update(Vec<String>),
}

impl Action {
    pub fn modules(&self) -> &[String] {
        match self {
            Action::Install(m) | Action::Update(m) => m,
        }
    }

    /// Comma-joined module list, in the order the user gave it.
    pub fn modules_arg(&self) -> String {
        self.modules().join(",")
    }

    /// The Odoo server flag this action maps to.
    pub fn odoo_flag(&self) -> &'static str {
        match self {
            Action::Install(_) => "-i",
            Action::Update(_) => "-u",
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One validated tool invocation. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub action: Action,
    pub database: String,
    /// Absolute directory holding the compose file; the whole sequence runs
    /// from here.
    pub compose_path: PathBuf,
    pub service: String,
}

impl Invocation {
    /// Validate and freeze one invocation. Every pre-flight refusal happens
    /// here, before any external process is spawned.
    pub fn new(
        install: Option<&str>,
        update: Option<&str>,
        database: Option<&str>,
        compose_path: Option<&Path>,
        service: &str,
    ) -> Result<Self> {
        let action = match (install, update) {
            (Some(_), Some(_)) => return Err(SequenceError::ConflictingAction),
            (Some(m), None) => Action::Install(parse_modules(m)?),
            (None, Some(m)) => Action::Update(parse_modules(m)?),
            (None, None) => return Err(SequenceError::MissingAction),
        };

        let database = database.unwrap_or("").trim();
        if database.is_empty() {
            return Err(SequenceError::MissingDatabase);
        }

        let compose_path = resolve_compose_path(compose_path)?;

        Ok(Self {
            action,
            database: database.to_string(),
            compose_path,
            service: service.to_string(),
        })
    }
}

fn parse_modules(raw: &str) -> Result<Vec<String>> {
    let modules: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if modules.is_empty() {
        return Err(SequenceError::EmptyModules);
    }
    Ok(modules)
}

/// Default to the current directory; refuse anything that is not an existing
/// directory. Canonicalized after the check so `InvalidPath` carries the path
/// as the user wrote it.
fn resolve_compose_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !path.is_dir() {
        return Err(SequenceError::InvalidPath(path));
    }
    Ok(path.canonicalize()?)
}

//! Project host collaborators.
//!
//! The pipeline never touches the project directly for these three
//! concerns; it calls a [`ProjectHost`] at fixed points:
//!
//! 1. `confirm_overwrite` when the model class file already exists
//! 2. `ensure_dir` before writing each artifact
//! 3. `refresh_assets` once both artifacts are written

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::logs::log_info;

/// Collaborator surface the conversion pipeline relies on
pub trait ProjectHost {
    /// Make sure `dir` exists, creating parents as needed.
    fn ensure_dir(&mut self, dir: &Path) -> io::Result<()>;

    /// Ask whether an existing file may be replaced.
    fn confirm_overwrite(&mut self, path: &Path) -> bool;

    /// Tell the host that project assets changed.
    fn refresh_assets(&mut self);
}

/// What to do when a generated file already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Prompt on the terminal
    #[default]
    Ask,
    Always,
    Never,
}

/// Host backed by the local filesystem and terminal
#[derive(Debug, Default)]
pub struct FsHost {
    policy: OverwritePolicy,
}

impl FsHost {
    pub fn new(policy: OverwritePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OverwritePolicy {
        self.policy
    }
}

impl ProjectHost for FsHost {
    fn ensure_dir(&mut self, dir: &Path) -> io::Result<()> {
        if !dir.is_dir() {
            std::fs::create_dir_all(dir)?;
            log_info(format!("Created folder {}", dir.display()));
        }
        Ok(())
    }

    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        match self.policy {
            OverwritePolicy::Always => true,
            OverwritePolicy::Never => false,
            OverwritePolicy::Ask => {
                let stdin = io::stdin();
                prompt_yes_no(
                    &mut stdin.lock(),
                    &mut io::stderr(),
                    &format!(
                        "A model script named {} already exists. Replace it?",
                        path.file_stem().and_then(|s| s.to_str()).unwrap_or("?")
                    ),
                )
            }
        }
    }

    fn refresh_assets(&mut self) {
        log_info("Project assets changed; refresh the editor asset database");
    }
}

/// Ask a yes/no question; anything but `y`/`yes` means no.
pub fn prompt_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> bool {
    if write!(output, "{} [y/N] ", question).and_then(|_| output.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

//! External tool invocation.
//!
//! `versions` drives `mkdocs` and `mike`, `convert` drives `pandoc`. Both go
//! through [`ToolRunner`] so the command logic can be tested without the
//! tools installed.

use std::path::Path;
use std::process::Command;

use crate::error::CliError;

/// Runs an external program and returns its standard output.
pub(crate) trait ToolRunner {
    /// Run `program` with `args`, optionally inside `cwd`.
    ///
    /// Fails when the program cannot be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>)
    -> Result<String, CliError>;
}

/// Runs tools as child processes.
pub(crate) struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, CliError> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        tracing::debug!(program, ?args, "Running external tool");

        let output = command.output().map_err(|e| CliError::Tool {
            program: program.to_owned(),
            message: format!("could not start: {e}"),
        })?;
        if !output.status.success() {
            return Err(CliError::Tool {
                program: program.to_owned(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Convert string-like values into an argument list.
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

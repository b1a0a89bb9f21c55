//! Downstream compilers.
//!
//! The script and template compilers are external programs. Each gets the
//! source text on stdin and answers with the compiled text on stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tokio::runtime::{Handle, RuntimeFlavor};

use super::error::StageError;
use crate::source::display_name;

/// Placeholder replaced with the source path in command arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Placeholder replaced with the source display name in command arguments.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Turns CoffeeScript into JavaScript.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, text: &str, source: &Path) -> Result<String, StageError>;
}

/// Turns a component template into a UI module.
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, text: &str, display_name: &str) -> Result<String, StageError>;
}

/// Runs a configured command line as a compiler.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    stage: &'static str,
    argv: Vec<String>,
}

impl CommandCompiler {
    /// `stage` names the compiler in errors ("script", "template").
    pub fn new(stage: &'static str, argv: Vec<String>) -> Self {
        Self { stage, argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    fn run(&self, text: &str, file: &str, name: &str) -> Result<String, StageError> {
        blocking(|| self.run_blocking(text, file, name))
    }

    fn run_blocking(&self, text: &str, file: &str, name: &str) -> Result<String, StageError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(StageError::NotConfigured { stage: self.stage });
        };
        let args: Vec<String> = args
            .iter()
            .map(|arg| {
                arg.replace(FILE_PLACEHOLDER, file)
                    .replace(NAME_PLACEHOLDER, name)
            })
            .collect();
        let command_line = self.argv.join(" ");

        crate::debug_event!("compile", "running", "{command_line} < {name}");

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| StageError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a chatty compiler cannot
        // deadlock on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.as_bytes().to_vec();
            std::thread::spawn(move || stdin.write_all(&input))
        });

        let output = child.wait_with_output().map_err(|source| StageError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        if let Some(writer) = writer {
            // A compiler that exits without reading stdin is judged by its status
            let _ = writer.join();
        }

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                msg => msg.to_string(),
            };
            Err(StageError::Compile {
                command: command_line,
                message,
                original: text.to_string(),
            })
        }
    }
}

/// Run `f` on the current thread, first handing this worker's other tasks
/// to the rest of the pool when called from a multi-threaded runtime.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

impl ScriptCompiler for CommandCompiler {
    fn compile(&self, text: &str, source: &Path) -> Result<String, StageError> {
        let file = source.display().to_string();
        self.run(text, &file, &display_name(source))
    }
}

impl TemplateCompiler for CommandCompiler {
    fn compile(&self, text: &str, display_name: &str) -> Result<String, StageError> {
        self.run(text, display_name, display_name)
    }
}

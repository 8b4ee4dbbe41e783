// src/command.rs

// a compiler that shells out to an external asset build command

// dependencies
use crate::errors::CompileError;
use crate::invoker::Compile;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs an external asset compiler (e.g. `sass src/styles:public/css`) as a child process.
///
/// A non-zero exit status is a failure carrying the command's stderr.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Builder-style: append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builder-style: append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builder-style: run the command from this directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Compile for CommandCompiler {
    fn compile(&self) -> Result<(), CompileError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| CompileError::Spawn {
            program: self.program_name(),
            source,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CompileError::ExitStatus {
                program: self.program_name(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

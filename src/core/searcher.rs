/// Recursive license search
///
/// This module spawns the external `grep` that finds license lines and streams
/// its null-delimited output back one record at a time.

use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use log::{debug, info, warn};

/// Program used for the search
pub const SEARCH_PROGRAM: &str = "grep";

/// Arguments for a recursive, case-insensitive, null-delimited search for "license"
pub const SEARCH_ARGS: [&str; 3] = ["-Zir", "license", "."];

/// Errors raised by the search child process
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search program could not be started
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting for the search program to exit failed
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The search program exited with a failure status
    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Description of the search to run
#[derive(Debug, Clone)]
pub struct SearchCommand {
    program: OsString,
    args: Vec<OsString>,
    root: PathBuf,
}

impl SearchCommand {
    /// Create the license search rooted at `root`
    ///
    /// The search runs with `root` as its working directory, so reported
    /// filenames stay relative (`./src/main.rs`).
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            program: OsString::from(SEARCH_PROGRAM),
            args: SEARCH_ARGS.iter().map(OsString::from).collect(),
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the license search over the current working directory
    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    /// Replace the program that gets spawned
    pub fn with_program<S: AsRef<OsStr>>(mut self, program: S) -> Self {
        self.program = program.as_ref().to_os_string();
        self
    }

    /// Replace the argument list passed to the program
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        self
    }

    /// Directory the search runs in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Program name as shown in diagnostics
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Spawn the search with its standard output piped back to us
    ///
    /// # Returns
    ///
    /// A running `SearchProcess` yielding raw records, or `SearchError::Spawn`
    pub fn spawn(&self) -> Result<SearchProcess, SearchError> {
        info!(
            "Running {} {} in {}",
            self.program_name(),
            self.args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            self.root.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| SearchError::Spawn {
                program: self.program_name(),
                source,
            })?;

        let reader = child.stdout.take().map(BufReader::new);

        Ok(SearchProcess {
            program: self.program_name(),
            child,
            reader,
            reaped: false,
        })
    }
}

impl Default for SearchCommand {
    fn default() -> Self {
        Self::in_current_dir()
    }
}

/// A running search whose output is consumed record by record
///
/// Dropping the process closes its output pipe and waits for it, so the
/// child is reaped even when consumption stops early.
pub struct SearchProcess {
    program: String,
    child: Child,
    reader: Option<BufReader<ChildStdout>>,
    reaped: bool,
}

impl SearchProcess {
    /// Close the output stream, wait for the child and check how it exited
    ///
    /// grep exits with status 1 when it selected no lines; that is an empty
    /// result rather than a failure.
    pub fn finish(mut self) -> Result<(), SearchError> {
        let status = self.close_and_wait().map_err(|source| SearchError::Wait {
            program: self.program.clone(),
            source,
        })?;
        debug!("{} exited with {}", self.program, status);

        match status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(SearchError::Failed {
                program: self.program.clone(),
                status,
            }),
        }
    }

    fn close_and_wait(&mut self) -> io::Result<ExitStatus> {
        // Closing the pipe first lets a child blocked on write terminate
        self.reader.take();
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Iterator for SearchProcess {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut record = Vec::new();
        match reader.read_until(b'\n', &mut record) {
            Ok(0) => {
                self.reader = None;
                None
            }
            Ok(_) => Some(Ok(record)),
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

impl Drop for SearchProcess {
    fn drop(&mut self) {
        if !self.reaped {
            if let Err(e) = self.close_and_wait() {
                warn!("Failed to wait for {}: {}", self.program, e);
            }
        }
    }
}

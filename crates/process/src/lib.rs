//! Locates running processes by their command name through procfs.
//!
//! The lookup is a snapshot: the process table is walked once and the first
//! entry whose name matches wins. When several processes share a name the one
//! listed first by the procfs directory is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use nix::errno::Errno;

const DEFAULT_PROCFS_ROOT: &str = "/proc";

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("process {name} not found")]
    ProcessNotFound { name: String },
    #[error("could not enumerate {}: {source}", .path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed stat entry at {}", .path.display())]
    Malformed { path: PathBuf },
}

/// Pid and command name of a single process table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: i32,
    pub name: String,
}

/// A procfs mount to enumerate.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROCFS_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the pid of the first process whose command name equals `name`.
    pub fn find_process_by_name(&self, name: &str) -> Result<i32, LocateError> {
        for entry in self.entries()? {
            let entry = entry?;
            if entry.name == name {
                debug!("Matched process {} to pid {}", name, entry.pid);
                return Ok(entry.pid);
            }
        }

        Err(LocateError::ProcessNotFound { name: name.to_string() })
    }

    /// Snapshot of every process visible under the procfs root.
    pub fn processes(&self) -> Result<Vec<ProcessEntry>, LocateError> {
        self.entries()?.collect()
    }

    fn entries(&self) -> Result<impl Iterator<Item = Result<ProcessEntry, LocateError>> + '_, LocateError> {
        let dir_entries = fs::read_dir(&self.root)
            .map_err(|e| LocateError::Enumeration { path: self.root.clone(), source: e })?;

        let iter = dir_entries.filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_vanished(&e) => return None,
                Err(e) => return Some(Err(LocateError::Enumeration { path: self.root.clone(), source: e })),
            };

            let pid = entry.file_name()
                .to_str()
                .and_then(|n| n.parse::<i32>().ok())?;

            read_entry(&entry.path(), pid).transpose()
        });

        Ok(iter)
    }
}

/// Shorthand for a lookup against `/proc`.
pub fn find_process_by_name(name: &str) -> Result<i32, LocateError> {
    ProcFs::default().find_process_by_name(name)
}

fn read_entry(process_dir: &Path, pid: i32) -> Result<Option<ProcessEntry>, LocateError> {
    let stat_path = process_dir.join("stat");
    let contents = match fs::read_to_string(&stat_path) {
        Ok(contents) => contents,
        Err(e) if is_vanished(&e) => {
            trace!("Process {} exited during the scan", pid);
            return Ok(None);
        }
        Err(e) => return Err(LocateError::Enumeration { path: stat_path, source: e }),
    };

    let name = parse_command_name(&contents)
        .ok_or_else(|| LocateError::Malformed { path: stat_path.clone() })?;

    Ok(Some(ProcessEntry { pid, name: name.to_string() }))
}

/// Extracts the command name from a stat line, stripping the parentheses.
///
/// The name itself may contain spaces and parentheses, so it spans from the
/// first `(` to the last `)` of the line.
fn parse_command_name(stat: &str) -> Option<&str> {
    let start = stat.find('(')?;
    let end = stat.rfind(')')?;
    if end <= start {
        return None;
    }

    Some(&stat[start + 1..end])
}

// ESRCH shows up when reading stat of a process that is being reaped.
fn is_vanished(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound || error.raw_os_error() == Some(Errno::ESRCH as i32)
}

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Resolves a process to the directory holding its introspection files.
pub trait ProcessDir {
    fn dir(&self) -> PathBuf;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid pid {0:?}: expected \"self\" or a process number")]
pub struct PidError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pid {
    /// The calling process, through the `self` link.
    Current,
    Process(u32),
}

impl Pid {
    /// The caller's own numeric pid.
    pub fn this() -> Self {
        Pid::Process(nix::unistd::getpid().as_raw() as u32)
    }

    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(self.to_string())
    }
}

impl ProcessDir for Pid {
    fn dir(&self) -> PathBuf {
        self.dir_in(Path::new(DEFAULT_PROC_ROOT))
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pid::Current => write!(f, "self"),
            Pid::Process(pid) => write!(f, "{}", pid),
        }
    }
}

impl FromStr for Pid {
    type Err = PidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "self" {
            return Ok(Pid::Current);
        }
        s.parse::<u32>()
            .map(Pid::Process)
            .map_err(|_| PidError(s.to_string()))
    }
}

impl From<nix::unistd::Pid> for Pid {
    fn from(pid: nix::unistd::Pid) -> Self {
        Pid::Process(pid.as_raw() as u32)
    }
}

/// A [`Pid`] resolved under a procfs mounted somewhere other than `/proc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootedPid {
    pub root: PathBuf,
    pub pid: Pid,
}

impl RootedPid {
    pub fn new(root: impl Into<PathBuf>, pid: Pid) -> Self {
        Self {
            root: root.into(),
            pid,
        }
    }
}

impl ProcessDir for RootedPid {
    fn dir(&self) -> PathBuf {
        self.pid.dir_in(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_dirs() {
        assert_eq!(Pid::Process(1234).dir(), PathBuf::from("/proc/1234"));
        assert_eq!(Pid::Current.dir(), PathBuf::from("/proc/self"));
        assert_eq!(
            RootedPid::new("/mnt/proc", Pid::Process(9)).dir(),
            PathBuf::from("/mnt/proc/9")
        );
    }

    #[test]
    fn test_pid_from_str() {
        assert_eq!("self".parse::<Pid>(), Ok(Pid::Current));
        assert_eq!("42".parse::<Pid>(), Ok(Pid::Process(42)));
        assert!("-1".parse::<Pid>().is_err());
        assert!("init".parse::<Pid>().is_err());
    }

    #[test]
    fn test_this_matches_nix() {
        assert_eq!(Pid::this(), Pid::from(nix::unistd::getpid()));
        assert_eq!(Pid::this(), Pid::Process(std::process::id()));
    }
}

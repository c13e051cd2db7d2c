//! Cross-process exclusive bus lock.
//!
//! Every process that touches the physical bus (sensor one-shots, the
//! heater loop, the GUI's pollers) takes an exclusive `flock(2)` on a
//! well-known lock file before selecting a multiplexer channel. flock is
//! per open file description, so the same mechanism also serialises
//! threads within one process.
//!
//! Acquisition blocks indefinitely — there is no timeout and no crash
//! recovery for a *hung* holder. A holder that dies releases the lock
//! automatically when the kernel closes its descriptor.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::error::BusError;

/// Handle to the lock file. Cheap to construct; the file is opened (and
/// created if missing) on every acquisition, mirroring how each of the
/// uncoordinated rig processes opens it independently.
#[derive(Debug, Clone)]
pub struct BusLock {
    path: PathBuf,
}

/// RAII guard for the critical section. Dropping it releases the lock on
/// every exit path — success, error, or panic unwind.
#[derive(Debug)]
pub struct BusGuard {
    _lock: Flock<File>,
}

impl BusLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until exclusive ownership of the bus is obtained.
    ///
    /// No fairness is guaranteed among waiters beyond what the kernel
    /// provides.
    pub fn acquire(&self) -> Result<BusGuard, BusError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(BusError::Lock)?;
        let lock = Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|(_, errno)| BusError::Lock(std::io::Error::from(errno)))?;
        Ok(BusGuard { _lock: lock })
    }
}

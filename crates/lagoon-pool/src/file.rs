//! File-closing cleanup actions.
//!
//! A thin use of the generic cleanup chain: the action owns an open file
//! and closes it at destroy, optionally unlinking the path first.

use std::fs::{self, File};
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Cleanup action that closes a file, optionally deleting it first.
#[derive(Debug)]
pub struct FileCleanup {
    file: File,
    path: PathBuf,
    delete: bool,
}

impl FileCleanup {
    /// Close `file` at cleanup time.
    pub fn close(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
            delete: false,
        }
    }

    /// Delete `path` and then close `file` at cleanup time. A path that no
    /// longer exists is not an error.
    pub fn delete(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
            delete: true,
        }
    }

    /// Descriptor of the managed file.
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Path of the managed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path is deleted before closing.
    pub fn deletes(&self) -> bool {
        self.delete
    }

    pub(crate) fn run(self) {
        let fd = self.fd();
        debug!(fd, path = %self.path.display(), delete = self.delete, "file cleanup");

        if self.delete {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => error!(fd, path = %self.path.display(), %err, "delete failed"),
            }
        }

        // Closing happens on drop; std reports no close error.
        drop(self.file);
    }
}

//! Test utilities for `scriptbox`.
//!
//! Small helpers shared by the unit and integration tests: building an
//! on-disk scripts directory, tracking that a source reader is released,
//! and capturing script print output. Exposed publicly so external test
//! crates (and downstream users writing their own tests) can reuse them.

use std::{
    fs,
    io::{self, Cursor, Read},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use tempfile::TempDir;

use crate::host::HostApi;

/// Create a temporary scripts directory populated with the given files.
///
/// Each entry is `(relative path, contents)`; intermediate directories are
/// created as needed. The directory is deleted when the returned guard
/// drops.
pub fn scripts_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create scripts dir");
    for (name, body) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create script subdir");
        }
        fs::write(&path, body).expect("write script");
    }
    dir
}

/// A source reader that counts how many times it has been dropped.
///
/// Lets tests assert that `evaluate` releases the source exactly once on
/// every exit path.
pub struct TrackingReader {
    inner: Cursor<Vec<u8>>,
    drops: Arc<AtomicUsize>,
}

impl TrackingReader {
    /// Wrap `text` in a tracking reader, returning the drop counter.
    pub fn new(text: &str) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            inner: Cursor::new(text.as_bytes().to_vec()),
            drops: Arc::clone(&drops),
        };
        (reader, drops)
    }
}

impl Read for TrackingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackingReader {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// A host that records everything the script prints.
#[derive(Default)]
pub struct RecordingHost {
    printed: Mutex<Vec<String>>,
}

impl RecordingHost {
    /// Lines printed so far.
    pub fn printed(&self) -> Vec<String> {
        self.printed.lock().expect("print log lock").clone()
    }
}

impl HostApi for RecordingHost {
    fn on_print(&self, text: &str) {
        self.printed.lock().expect("print log lock").push(text.to_string());
    }
}

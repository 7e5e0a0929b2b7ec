//! Shared test task.

use std::sync::atomic::{AtomicUsize, Ordering};

use camino::Utf8PathBuf;

use crate::{Property, Task};

pub(crate) struct FakeTask {
    path: String,
    pub label: Property<String>,
    pub source: Property<Utf8PathBuf>,
    pub dest: Property<Utf8PathBuf>,
    pub extras: Property<Vec<Utf8PathBuf>>,
    /// Number of [`counted_label`](Self::counted_label) calls.
    pub reads: AtomicUsize,
}

impl FakeTask {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            label: Property::default(),
            source: Property::default(),
            dest: Property::default(),
            extras: Property::default(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn counted_label(&self) -> anyhow::Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.label.get())
    }
}

impl Task for FakeTask {
    fn path(&self) -> &str {
        &self.path
    }
}

pub(crate) fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let guard = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).unwrap();
    (guard, path)
}

// Shared test helpers: a synthetic proc/sys tree on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use hostagent::proc_repo::ProcRepo;

pub struct ProcFixture {
    root: TempDir,
}

impl ProcFixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        fs::create_dir_all(root.path().join("proc")).unwrap();
        fs::create_dir_all(root.path().join("sys")).unwrap();
        Self { root }
    }

    pub fn proc_dir(&self) -> PathBuf {
        self.root.path().join("proc")
    }

    pub fn sys_dir(&self) -> PathBuf {
        self.root.path().join("sys")
    }

    pub fn write_proc(&self, rel: &str, content: &str) {
        write_file(&self.proc_dir().join(rel), content);
    }

    pub fn write_sys(&self, rel: &str, content: &str) {
        write_file(&self.sys_dir().join(rel), content);
    }

    pub fn repo(&self) -> ProcRepo {
        ProcRepo::with_paths(self.proc_dir(), self.sys_dir())
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A /proc/stat with the given aggregate and two cores splitting it evenly.
pub fn stat_content(idle: u64, busy: u64, ctxt: u64) -> String {
    let user = busy;
    format!(
        "cpu  {user} 0 0 {idle} 0 0 0 0 0 0\n\
         cpu0 {} 0 0 {} 0 0 0 0 0 0\n\
         cpu1 {} 0 0 {} 0 0 0 0 0 0\n\
         ctxt {ctxt}\n\
         procs_running 2\n\
         procs_blocked 0\n",
        user / 2,
        idle / 2,
        user / 2,
        idle / 2,
    )
}

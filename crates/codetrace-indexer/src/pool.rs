//! Fixed-size worker pool over a bounded queue (§5): the only parallel
//! phase is per-file tree construction. Workers block on the input file
//! queue; the main thread blocks on worker completion; per-file trees are
//! moved to the caller once complete rather than mutated across threads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use codetrace_core::{build_file_with_timeout, ImportMap, Language, StorageSink, Tree};

use crate::reporter::Reporter;
use crate::storage::SharedStorage;

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_TIMEOUT_MICROS: u64 = 5_000_000;

pub struct FileUnitResult {
    pub path: String,
    pub tree: Option<Tree>,
    pub import_map: Option<ImportMap>,
    pub error: Option<String>,
}

/// Discovers every file under `root` matching `language`'s extension,
/// honoring `.gitignore`/`.ignore` exclusions.
pub fn discover_files(root: &Path, language: Language) -> Vec<PathBuf> {
    let suffix = format!(".{}", language.extension());
    ignore::WalkBuilder::new(root)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.into_path())
        .filter(|p| p.to_string_lossy().ends_with(&suffix))
        .collect()
}

/// Parses every file in `files` across a fixed-size worker pool (default
/// [`DEFAULT_WORKERS`]), writing typed records through `storage` and
/// reporting through `reporter`. Each worker owns one parser per file,
/// released on every exit path since `parse_one` never retains it past
/// its own return. Result order is non-deterministic (§5).
pub fn build_file_units(
    files: Vec<PathBuf>,
    language: Language,
    storage: SharedStorage,
    reporter: Arc<dyn Reporter>,
    worker_count: usize,
) -> Vec<FileUnitResult> {
    let total = files.len();
    let workers = worker_count.max(1);
    let (job_tx, job_rx) = crossbeam_channel::bounded::<PathBuf>(workers * 2);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<FileUnitResult>();

    thread::scope(|scope| {
        for worker_id in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let mut worker_storage = storage.clone();
            let reporter = Arc::clone(&reporter);
            scope.spawn(move || {
                for path in job_rx.iter() {
                    reporter.status(worker_id, &format!("parsing {}", path.display()));
                    let result = parse_one(&path, language, &mut worker_storage);
                    if result.error.is_some() {
                        reporter.status(worker_id, &format!("failed: {}", path.display()));
                    }
                    let _ = result_tx.send(result);
                }
            });
        }
        drop(result_tx);
        drop(job_rx);

        for path in files {
            let _ = job_tx.send(path);
        }
        drop(job_tx);

        let mut results = Vec::with_capacity(total);
        for (done, result) in result_rx.iter().enumerate() {
            reporter.progress(done + 1, total);
            results.push(result);
        }
        results
    })
}

fn parse_one(path: &Path, language: Language, storage: &mut dyn StorageSink) -> FileUnitResult {
    let path_str = path.to_string_lossy().into_owned();
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            return FileUnitResult {
                path: path_str,
                tree: None,
                import_map: None,
                error: Some(e.to_string()),
            };
        }
    };

    match build_file_with_timeout(
        &source,
        &path_str,
        language,
        storage,
        Some(DEFAULT_TIMEOUT_MICROS),
    ) {
        Ok(out) => FileUnitResult {
            path: path_str,
            tree: Some(out.tree),
            import_map: Some(out.import_map),
            error: None,
        },
        Err(e) => FileUnitResult {
            path: path_str,
            tree: None,
            import_map: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use std::fs;

    #[test]
    fn worker_pool_processes_every_file_independent_of_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def a():\n    pass\n").unwrap();
        fs::write(dir.path().join("b.py"), "def b():\n    pass\n").unwrap();
        fs::write(dir.path().join("broken.py"), "").unwrap();

        let files = discover_files(dir.path(), Language::Python);
        assert_eq!(files.len(), 3);

        let storage = SharedStorage::new();
        let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
        let results = build_file_units(files, Language::Python, storage, reporter, DEFAULT_WORKERS);

        assert_eq!(results.len(), 3);
        let ok_count = results.iter().filter(|r| r.error.is_none()).count();
        assert_eq!(ok_count, 2, "empty file should fail without blocking the others");
    }
}

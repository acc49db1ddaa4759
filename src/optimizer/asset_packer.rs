//! # Asset Packer Orchestrator
//!
//! Runs the packaging pipeline, strictly in this order:
//!
//! 1. clear the destination (a missing one is fine)
//! 2. recreate it empty
//! 3. copy the whole project tree into it
//! 4. enumerate `.html`/`.js`/`.css` candidates in the copy
//! 5. compress candidates one at a time, folding sizes into an `AggregateReport`
//! 6. report totals
//!
//! Steps 1-4 are structural: any failure ends the run. A failure in step 5
//! only affects that file.

use crate::{
    config::Config,
    copier::TreeCopier,
    error::PackError,
    file_manager::FileManager,
    json_output::JsonMessage,
    minifier::MinifierRegistry,
    optimizer::{
        path_resolver::{PackRequest, PathResolver},
        progress_tracker::ProgressTracker,
        task_compressor::{FileOutcome, TaskCompressor},
    },
    progress::{format_bytes, AggregateReport},
    tool_resolver::ToolPathResolver,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Main pipeline driver
pub struct AssetPacker {
    config: Config,
    registry: MinifierRegistry,
}

impl AssetPacker {
    /// Packer with an explicit minifier table
    pub fn new(config: Config, registry: MinifierRegistry) -> Self {
        Self { config, registry }
    }

    /// Packer using the configured external minifiers.
    ///
    /// Tools installed in the project's `node_modules/.bin` are found too.
    pub fn from_config(config: Config, request: &PackRequest) -> Self {
        let resolver = ToolPathResolver::new(Some(&request.source));
        let registry = MinifierRegistry::from_config(&config, &resolver);
        Self::new(config, registry)
    }

    /// Run the whole pipeline for `request`
    pub async fn run(&self, request: &PackRequest) -> Result<AggregateReport, PackError> {
        let start_time = Instant::now();

        let result = self.run_stages(request).await;

        match &result {
            Ok(report) if self.config.json_output => {
                JsonMessage::complete(report, start_time.elapsed().as_secs_f64()).emit();
            }
            Ok(_) => {}
            Err(e) => Self::report_failure(e, self.config.json_output),
        }

        result
    }

    /// One `error!` line for a fatal error, plus a JSON `error` event in JSON mode
    pub fn report_failure(e: &PackError, json_output: bool) {
        error!("❌ {}", e);
        if json_output {
            JsonMessage::failure(e).emit();
        }
    }

    async fn run_stages(&self, request: &PackRequest) -> Result<AggregateReport, PackError> {
        let source = request.source.as_path();
        let destination = request.destination.as_path();

        if self.config.json_output {
            JsonMessage::start(source, destination).emit();
        }
        info!("Packaging {} into {}", source.display(), destination.display());
        self.registry.check_dependencies();

        FileManager::reset_destination(destination).await?;
        debug!("Destination cleared and recreated: {}", destination.display());

        let summary = TreeCopier::copy_tree(source, destination).await?;
        info!(
            "✅ Project files copied to {} ({} files, {} directories, {})",
            destination.display(),
            summary.files,
            summary.directories,
            format_bytes(summary.bytes)
        );
        if self.config.json_output {
            JsonMessage::copied(&summary).emit();
        }

        let candidates = FileManager::find_candidate_files(destination)?;
        info!("Found {} files to compress", candidates.len());

        let report = self.compress_candidates(destination, candidates).await;
        Ok(report)
    }

    /// Compress candidates in order; per-file errors are reported, never propagated
    async fn compress_candidates(&self, destination: &Path, candidates: Vec<PathBuf>) -> AggregateReport {
        let tracker = ProgressTracker::new(candidates.len(), &self.config);
        let compressor = TaskCompressor::new(self.registry.clone(), destination.to_path_buf());
        let mut report = AggregateReport::new();

        for relative in &candidates {
            let file_path = PathResolver::destination_path(destination, relative);
            let result = compressor.compress(relative).await;
            tracker
                .handle_file_completion(relative, &file_path, &result)
                .await;

            match result {
                Ok(FileOutcome::Compressed(sample)) => report.add_compressed(sample),
                Ok(FileOutcome::Skipped) => report.add_skipped(),
                Err(_) => report.add_failed(),
            }
        }

        tracker.finish(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineStage;
    use crate::minifier::Minifier;
    use anyhow::Result;
    use futures::future::BoxFuture;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::fs;

    /// Keeps every second byte, and counts its invocations
    #[derive(Clone, Default)]
    struct Halve {
        calls: Arc<AtomicUsize>,
    }

    impl Minifier for Halve {
        fn name(&self) -> &str {
            "halve"
        }

        fn minify<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let contents = fs::read(input).await?;
                let halved: Vec<u8> = contents.into_iter().step_by(2).collect();
                fs::write(output, halved).await?;
                Ok::<(), anyhow::Error>(())
            })
        }
    }

    /// Fails for file names containing "bad"
    struct Picky(Halve);

    impl Minifier for Picky {
        fn name(&self) -> &str {
            "picky"
        }

        fn minify<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                let name = input.file_name().unwrap_or_default().to_string_lossy();
                if name.contains("bad") {
                    anyhow::bail!("syntax error");
                }
                self.0.minify(input, output).await
            })
        }
    }

    /// Collects formatted log output for the current thread
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn install(&self) -> tracing::subscriber::DefaultGuard {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        fn error_lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .filter(|line| line.contains("ERROR"))
                .map(str::to_string)
                .collect()
        }
    }

    fn quiet_config() -> Config {
        Config {
            show_progress: false,
            ..Config::default()
        }
    }

    fn write(root: &Path, rel: &str, len: usize) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, vec![b'x'; len]).unwrap();
    }

    fn tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        FileManager::walk_entries(root)
            .map(|entry| {
                let entry = entry.unwrap();
                let contents = entry
                    .is_file()
                    .then(|| std::fs::read(root.join(&entry.relative_path)).unwrap());
                (entry.relative_path, contents)
            })
            .collect()
    }

    struct Fixture {
        _dir: TempDir,
        request: PackRequest,
    }

    /// {a.js (100 bytes), b/c.css (200 bytes), d.txt (50 bytes)}
    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        write(&project, "a.js", 100);
        write(&project, "b/c.css", 200);
        write(&project, "d.txt", 50);
        let request =
            PackRequest::new(Some(project), Some(dir.path().join("dist"))).unwrap();
        Fixture { _dir: dir, request }
    }

    #[tokio::test]
    async fn test_pipeline_copies_and_compresses_candidates() {
        let fixture = fixture();
        let js = Halve::default();
        let css = Halve::default();
        let mut registry = MinifierRegistry::new();
        registry
            .register("js", js.clone())
            .register("css", css.clone())
            .register("html", Halve::default());

        let packer = AssetPacker::new(quiet_config(), registry);
        let report = packer.run(&fixture.request).await.unwrap();

        assert_eq!(js.calls.load(Ordering::SeqCst), 1);
        assert_eq!(css.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.files_compressed, 2);
        assert_eq!(report.files_failed, 0);
        assert_eq!(report.total_starting_size, 300);
        assert_eq!(report.total_final_size, 150);
        assert_eq!(report.saved_ratio(), 50.0);

        let dist = &fixture.request.destination;
        assert_eq!(std::fs::metadata(dist.join("a.js")).unwrap().len(), 50);
        assert_eq!(std::fs::metadata(dist.join("b/c.css")).unwrap().len(), 100);
        assert_eq!(std::fs::read(dist.join("d.txt")).unwrap(), vec![b'x'; 50]);
        assert_eq!(
            tree(&fixture.request.source).keys().collect::<Vec<_>>(),
            tree(dist).keys().collect::<Vec<_>>()
        );
        assert_eq!(
            std::fs::metadata(fixture.request.source.join("a.js")).unwrap().len(),
            100
        );
    }

    #[tokio::test]
    async fn test_copy_is_exact_mirror_before_compression() {
        let fixture = fixture();
        write(&fixture.request.source, "nested/deeper/page.HTML", 30);
        std::fs::create_dir_all(fixture.request.source.join("empty")).unwrap();

        // No minifiers registered: the pass changes nothing
        let packer = AssetPacker::new(quiet_config(), MinifierRegistry::new());
        let report = packer.run(&fixture.request).await.unwrap();

        assert_eq!(tree(&fixture.request.source), tree(&fixture.request.destination));
        assert_eq!(report.files_skipped, 3);
        assert_eq!(report.files_compressed, 0);
        assert_eq!(report.total_starting_size, 0);
    }

    #[tokio::test]
    async fn test_previous_destination_content_is_wiped() {
        let fixture = fixture();
        let dist = &fixture.request.destination;
        write(dist, "stale/old.js", 10);
        write(dist, "leftover.txt", 10);

        let packer = AssetPacker::new(quiet_config(), MinifierRegistry::new());
        packer.run(&fixture.request).await.unwrap();

        assert!(!dist.join("stale").exists());
        assert!(!dist.join("leftover.txt").exists());
        assert!(dist.join("a.js").exists());
    }

    #[tokio::test]
    async fn test_failed_file_does_not_stop_the_run() {
        let fixture = fixture();
        write(&fixture.request.source, "bad.js", 80);
        write(&fixture.request.source, "z/good.js", 40);

        let mut registry = MinifierRegistry::new();
        registry
            .register("js", Picky(Halve::default()))
            .register("css", Halve::default());

        let logs = LogBuffer::default();
        let _guard = logs.install();

        let packer = AssetPacker::new(quiet_config(), registry);
        let report = packer.run(&fixture.request).await.unwrap();

        let bad_path = fixture.request.destination.join("bad.js");
        let failures: Vec<String> = logs
            .error_lines()
            .into_iter()
            .filter(|line| line.contains("Error while compressing"))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains(&bad_path.display().to_string()));
        assert!(failures[0].contains("syntax error"));

        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_compressed, 3);
        // a.js + b/c.css + z/good.js; bad.js stays out of the totals
        assert_eq!(report.total_starting_size, 340);
        assert_eq!(report.total_final_size, 170);

        let dist = &fixture.request.destination;
        assert_eq!(std::fs::read(dist.join("bad.js")).unwrap(), vec![b'x'; 80]);
        assert_eq!(std::fs::metadata(dist.join("z/good.js")).unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_structural_failure_aborts_before_compression() {
        let fixture = fixture();
        let halve = Halve::default();
        let mut registry = MinifierRegistry::new();
        registry.register("js", halve.clone());

        // Destination parent is a regular file, so it cannot be created
        let blocker = fixture.request.destination.with_file_name("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let request = PackRequest {
            source: fixture.request.source.clone(),
            destination: blocker.join("dist"),
        };

        let logs = LogBuffer::default();
        let _guard = logs.install();

        let packer = AssetPacker::new(quiet_config(), registry);
        let err = packer.run(&request).await.unwrap_err();

        assert_eq!(logs.error_lines().len(), 1);
        assert!(matches!(
            err.stage(),
            Some(PipelineStage::ClearDestination) | Some(PipelineStage::CreateDestination)
        ));
        assert_eq!(halve.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_invocation_is_logged() {
        let logs = LogBuffer::default();
        let _guard = logs.install();

        let err = PackRequest::new(None, None).unwrap_err();
        AssetPacker::report_failure(&err, false);

        let lines = logs.error_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("please provide both"));
    }

    #[tokio::test]
    async fn test_empty_project() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("empty-project");
        std::fs::create_dir_all(&project).unwrap();
        let request = PackRequest::new(Some(project), Some(dir.path().join("out"))).unwrap();

        let packer = AssetPacker::new(quiet_config(), MinifierRegistry::new());
        let report = packer.run(&request).await.unwrap();

        assert_eq!(report, AggregateReport::default());
        assert!(request.destination.is_dir());
    }
}

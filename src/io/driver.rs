use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::bail;
use rayon::prelude::*;

use super::compression::{is_recognized, open_report};
use crate::data_structs::record::MethylationRecord;
use crate::stats::Accumulator;

/// How the driver treats an input file that cannot be opened or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenFailurePolicy {
    /// Report the file and continue with the rest of the set.
    #[default]
    Skip,
    /// Abort the whole run. Also rejects files without a recognized report
    /// extension before reading them.
    Abort,
}

/// Progress snapshot delivered after each file completes.
#[derive(Debug, Clone)]
pub struct FileProgress<'a> {
    /// 1-based position of the file in the set.
    pub index: usize,
    pub total: usize,
    pub path: &'a Path,
    /// Wall-clock time spent on this file.
    pub elapsed: Duration,
    /// Wall-clock time since the run began.
    pub total_elapsed: Duration,
}

/// Callback invoked after each file completes; purely observational.
pub type ProgressFn<'a> = dyn FnMut(&FileProgress<'_>) + 'a;

/// Feeds every line of an ordered file set into one accumulator instance.
///
/// Files are consumed strictly in sequence. A malformed line is skipped, a
/// full context registry aborts the current file only, and a mid-stream read
/// error counts as end-of-file for that source; in every case the state
/// accumulated so far is kept.
#[derive(Debug, Clone)]
pub struct FileSetDriver {
    paths: Vec<PathBuf>,
    policy: OpenFailurePolicy,
}

impl FileSetDriver {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            policy: OpenFailurePolicy::default(),
        }
    }

    pub fn with_policy(
        mut self,
        policy: OpenFailurePolicy,
    ) -> Self {
        self.policy = policy;
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sequential run: every file, in order, into `accumulator`.
    pub fn run<A: Accumulator>(
        &self,
        accumulator: &mut A,
        mut progress: Option<&mut ProgressFn<'_>>,
    ) -> anyhow::Result<()> {
        let run_start = Instant::now();
        let total = self.paths.len();

        for (index, path) in self.paths.iter().enumerate() {
            let file_start = Instant::now();
            self.consume_file(path, accumulator)?;
            if let Some(callback) = progress.as_mut() {
                callback(&FileProgress {
                    index: index + 1,
                    total,
                    path,
                    elapsed: file_start.elapsed(),
                    total_elapsed: run_start.elapsed(),
                });
            }
        }
        Ok(())
    }

    /// Parallel run: each file reduces into a private accumulator on the
    /// current rayon pool, and the partial results merge in input order, so
    /// the rendered output matches a sequential run.
    pub fn run_parallel<A>(&self) -> anyhow::Result<A>
    where
        A: Accumulator + Default + Send, {
        let partials: Vec<anyhow::Result<A>> = self
            .paths
            .par_iter()
            .map(|path| {
                let mut partial = A::default();
                self.consume_file(path, &mut partial)?;
                log::debug!("processed {}", path.display());
                Ok(partial)
            })
            .collect();

        let mut merged = A::default();
        for (path, partial) in self.paths.iter().zip(partials) {
            let partial = partial?;
            if let Err(err) = merged.merge(&partial) {
                // Same condition as a full registry mid-file: drop what does
                // not fit, keep everything else.
                log::error!("{}: {}", path.display(), err);
            }
        }
        Ok(merged)
    }

    /// Streams one file through the parser into the accumulator. Open and
    /// decode failures are governed by the configured policy; everything
    /// past a successful open never fails the run.
    fn consume_file<A: Accumulator>(
        &self,
        path: &Path,
        accumulator: &mut A,
    ) -> anyhow::Result<()> {
        let mut reader = match self.open_checked(path) {
            Ok(reader) => reader,
            Err(err) => {
                match self.policy {
                    OpenFailurePolicy::Skip => {
                        log::warn!("skipping {}: {:#}", path.display(), err);
                        return Ok(());
                    },
                    OpenFailurePolicy::Abort => {
                        return Err(err.context(format!(
                            "failed to process {}",
                            path.display()
                        )));
                    },
                }
            },
        };

        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {},
                Err(err) => {
                    // An erroring stream is treated as end-of-file.
                    log::warn!("read error in {}: {}", path.display(), err);
                    break;
                },
            }
            let Some(record) = MethylationRecord::parse(&line) else {
                continue;
            };
            if let Err(err) = accumulator.absorb(&record) {
                log::error!("{}: {}", path.display(), err);
                break;
            }
        }
        Ok(())
    }

    fn open_checked(
        &self,
        path: &Path,
    ) -> anyhow::Result<Box<dyn BufRead>> {
        if self.policy == OpenFailurePolicy::Abort && !is_recognized(path) {
            bail!("unsupported file format: {}", path.display());
        }
        open_report(path)
    }
}

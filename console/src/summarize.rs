use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::ProgressBar;
use methsum::{Accumulator, FileProgress, FileSetDriver, OpenFailurePolicy};

use crate::utils::{expand_wildcards_single, init_pbar, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct SummarizeArgs {
    #[arg(help = "Input report path or glob pattern (.txt, .gz, .bz2, .xz, .zst).")]
    input: String,

    #[arg(help = "Path for the generated output table.")]
    output: PathBuf,

    #[arg(
        long,
        help = "Abort the run when an input file cannot be read or has an \
                unrecognized extension."
    )]
    strict: bool,
}

impl SummarizeArgs {
    pub(crate) fn run<A>(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()>
    where
        A: Accumulator + Default + Send, {
        let paths = expand_wildcards_single(&self.input);
        if paths.is_empty() {
            log::warn!("no files matched pattern {}", self.input);
            eprintln!(
                "{}",
                style(format!("Warning: no files matched '{}'.", self.input)).red()
            );
        }

        let policy = if self.strict {
            OpenFailurePolicy::Abort
        }
        else {
            OpenFailurePolicy::Skip
        };
        let driver = FileSetDriver::new(paths).with_policy(policy);

        let accumulator = if utils.threads > 1 {
            driver.run_parallel::<A>()?
        }
        else {
            let progress_bar = if utils.quiet {
                ProgressBar::hidden()
            }
            else {
                init_pbar(driver.len())?
            };

            let mut on_file = |progress: &FileProgress<'_>| {
                progress_bar.inc(1);
                progress_bar.println(format!(
                    "Processed file {}/{}: {} ({:.2} s, total {:.2} s)",
                    progress.index,
                    progress.total,
                    progress.path.display(),
                    progress.elapsed.as_secs_f64(),
                    progress.total_elapsed.as_secs_f64(),
                ));
            };

            let mut accumulator = A::default();
            driver.run(&mut accumulator, Some(&mut on_file))?;
            progress_bar.finish_and_clear();
            accumulator
        };

        let output = File::create(&self.output).with_context(|| {
            format!("failed to create output file {}", self.output.display())
        })?;
        accumulator.write_tsv(BufWriter::new(output))?;
        Ok(())
    }
}

use std::path::PathBuf;

use clap::Args;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        long,
        short,
        default_value_t = 1,
        help = "Number of worker threads. Values above 1 process files in \
                parallel and merge the results."
    )]
    pub threads: usize,

    #[arg(long, short, help = "Enable verbose logging.")]
    pub verbose: bool,

    #[arg(long, help = "Hide the progress output.")]
    pub quiet: bool,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        let level = if self.verbose {
            log::LevelFilter::Debug
        }
        else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .try_init()?;

        if self.threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build_global()?;
        }
        Ok(())
    }
}

pub(crate) fn init_pbar(total: usize) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {pos:>5.green}/{len:5} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Processing...");
    Ok(progress_bar)
}

pub(crate) fn expand_wildcards_single(path: &str) -> Vec<PathBuf> {
    if path.contains('*') || path.contains('?') {
        // Expand wildcard using glob
        match glob(path) {
            Ok(matches) => matches.filter_map(Result::ok).collect(),
            Err(e) => {
                eprintln!("Error processing wildcard '{}': {}", path, e);
                Vec::new()
            },
        }
    }
    else {
        // If not a wildcard, push the path as-is
        vec![PathBuf::from(path)]
    }
}

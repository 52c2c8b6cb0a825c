mod summarize;
mod utils;

use clap::{Parser, Subcommand};
use methsum::{CoverageTable, DepthHistogram, LevelHistogram};
use summarize::SummarizeArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Per-context methylation level distribution (sparse table).
    #[command(name = "distribution")]
    Distribution {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  SummarizeArgs,
    },

    /// Per-context read depth histogram (dense table, depths 1-200).
    Depth {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  SummarizeArgs,
    },

    /// Per-chromosome coverage by CG/CHG/CHH context.
    Coverage {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  SummarizeArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Distribution { utils, args } => {
            utils.setup()?;
            args.run::<LevelHistogram>(&utils)?;
        },
        MainMenu::Depth { utils, args } => {
            utils.setup()?;
            args.run::<DepthHistogram>(&utils)?;
        },
        MainMenu::Coverage { utils, args } => {
            utils.setup()?;
            args.run::<CoverageTable>(&utils)?;
        },
    }
    Ok(())
}

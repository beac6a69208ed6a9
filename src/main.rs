use anyhow::Context;
use clap::Parser;

use dircount::cli::{Cli, Config};
use dircount::logging;
use dircount::report::{format_directory_report, format_file_report};
use dircount::scanner::run_scan;
use dircount::target::Target;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet))?;

    let config = Config::from_cli(cli).context("invalid input path")?;

    match &config.target {
        Target::File { name, size } => println!("{}", format_file_report(name, *size)),
        Target::Directory(path) => {
            let report = run_scan(config.scan_options.clone()).context("scan failed")?;
            if report.unreadable_dirs > 0 || report.skipped_files > 0 {
                tracing::warn!(
                    unreadable_dirs = report.unreadable_dirs,
                    skipped_files = report.skipped_files,
                    "totals exclude entries that could not be read"
                );
            }
            println!("{}", format_directory_report(path, &report));
        }
    }

    Ok(())
}

//! xmlsort CLI binary entry point.
//! Delegates to the library for sort/verify and prints results.

use clap::Parser;
use std::fmt::Display;
use xmlsort::cli::{Cli, Commands};
use xmlsort::config::{self, Effective, Overrides};
use xmlsort::sort_order::{self, SortOrderIndex};
use xmlsort::sorter::XmlSorter;
use xmlsort::utils::{error_prefix, info_prefix, note_prefix};
use xmlsort::{check, format, output};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Sort {
            common,
            write,
            diff,
            check,
        } => {
            let overrides = Overrides {
                write: write.then_some(true),
                diff: diff.then_some(true),
                check: check.then_some(true),
                ..common.overrides()
            };
            let (eff, sorter) = prepare(&overrides);
            // --diff and --check never write
            let eff_write = eff.write && !(eff.diff || eff.check);
            let (results, errors) = format::run_format(&eff, &sorter);
            output::print_format(&results, &eff.output, eff_write, eff.diff, &errors);
            if !errors.is_empty() {
                std::process::exit(2);
            }
            if eff.check && results.iter().any(|r| r.changed) {
                std::process::exit(1);
            }
        }
        Commands::Verify {
            common,
            verify_fail,
            verify_fail_on,
        } => {
            let overrides = Overrides {
                verify_fail,
                verify_fail_on,
                ..common.overrides()
            };
            let (eff, sorter) = prepare(&overrides);
            let (result, errors) = check::run_verify(&eff, &sorter);
            output::print_verify(&result, &eff.output, &errors);
            if !errors.is_empty() {
                std::process::exit(2);
            }
            if result.summary.failed > 0 {
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn bail(message: impl Display) -> ! {
    eprintln!("{} {}", error_prefix(), message);
    std::process::exit(2);
}

/// Resolve settings and build the sorter; configuration problems end the
/// process before any file is read.
fn prepare(overrides: &Overrides) -> (Effective, XmlSorter) {
    let eff = config::resolve_effective(overrides).unwrap_or_else(|e| bail(e));
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No xmlsort.toml found; using defaults.", note_prefix());
    }
    let template =
        sort_order::load_template(&eff.sort_order, &eff.repo_root).unwrap_or_else(|e| bail(e));
    let index = SortOrderIndex::build(&template);
    if index.is_empty() {
        bail(format!("sort order template {} has no elements", eff.sort_order));
    }
    if eff.output != "json" && eff.sort_order != config::DEFAULT_SORT_ORDER {
        eprintln!("{} Using sort order {}.", info_prefix(), eff.sort_order);
    }
    log::debug!("using sort order {}", eff.sort_order);
    let sorter = XmlSorter::new(index, eff.policy.clone(), eff.serialize.clone());
    (eff, sorter)
}

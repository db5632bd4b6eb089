use std::{sync::Barrier, thread};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fatalreport::{
    arg::infer,
    config::{self, DEFAULT_PREFIX},
    fatal, report_fatal, FatalArg, ReporterConfig,
};
use log::LevelFilter;

const DEFAULT_THREADS: u16 = 1;

fn parse_args(raw: &[String], strings_only: bool) -> Vec<FatalArg<'_>> {
    raw.iter()
        .map(|arg: &String| {
            if strings_only {
                FatalArg::Str(arg)
            } else {
                infer(arg)
            }
        })
        .collect()
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();
}

fn race(threads: usize, template: &str, args: &[FatalArg<'_>]) -> ! {
    let barrier: Barrier = Barrier::new(threads);
    thread::scope(|scope| {
        for _ in 1..threads {
            scope.spawn(|| {
                barrier.wait();
                report_fatal(template, args);
            });
        }
        barrier.wait();
        report_fatal(template, args);
    });
    fatal!("all {} reporters returned", threads)
}

pub fn main() -> anyhow::Result<()> {
    let matches: ArgMatches = Command::new("fatalreport")
        .about("Report a fatal assertion failure on stderr and abort")
        .arg(
            Arg::new("template")
                .help("message template, `{}` and `{N}` are replaced by arguments")
                .required(true),
        )
        .arg(
            Arg::new("args")
                .help("values substituted into the template")
                .num_args(0..)
                .allow_negative_numbers(true),
        )
        .arg(
            Arg::new("prefix")
                .help(format!(
                    "diagnostic prefix written before the message (default: {:?})",
                    DEFAULT_PREFIX
                ))
                .required(false)
                .short('p')
                .long("prefix"),
        )
        .arg(
            Arg::new("newline")
                .help("end the report with a newline")
                .short('n')
                .long("newline")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strings")
                .help(
                    "pass every argument as a string instead of inferring its type \
                     (text that would not print back unchanged, like 007, is always a string)",
                )
                .short('s')
                .long("strings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threads")
                .help(format!(
                    "number of threads racing into the reporter (default: {})",
                    DEFAULT_THREADS
                ))
                .required(false)
                .short('t')
                .long("threads")
                .value_parser(value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("log")
                .help("mirror the report to the log output")
                .short('L')
                .long("log")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("enable debug logging")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue),
        )
        .get_matches();
    init_logging(matches.get_flag("verbose"));
    let mut reporter_config: ReporterConfig = ReporterConfig::default()
        .with_trailing_newline(matches.get_flag("newline"))
        .with_mirror_to_log(matches.get_flag("log"));
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        reporter_config = reporter_config.with_prefix(prefix.to_owned());
    }
    config::install(reporter_config).context("cannot configure the reporter")?;
    let template: &String = matches
        .get_one::<String>("template")
        .context("missing message template")?;
    let raw_args: Vec<String> = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let args: Vec<FatalArg<'_>> = parse_args(&raw_args, matches.get_flag("strings"));
    let threads: u16 = matches
        .get_one::<u16>("threads")
        .copied()
        .unwrap_or(DEFAULT_THREADS);
    log::debug!(
        "reporting {:?} with {} argument(s) from {} thread(s)",
        template,
        args.len(),
        threads
    );
    if threads == 1 {
        report_fatal(template, &args)
    }
    race(threads as usize, template, &args)
}

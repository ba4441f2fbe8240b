#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]

use clap::{ArgAction, CommandFactory, Parser, ValueHint, value_parser};
use clap_complete::aot::{Shell, generate};
use dirscan::{
    DirError, DirLister, OpenOptions, TraversalError, Walker,
    fs::{SortSpec, SortStrategy},
};
use std::io::{self, stdout};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod printer;
use printer::{Layout, write_entries, write_errors};

#[cfg(all(
    feature = "mimalloc",
    any(target_os = "linux", target_os = "macos", target_os = "android")
))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Environment variable holding the log filter, `warn` when unset.
const LOG_ENV: &str = "DIRSCAN_LOG";

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "List directories, resolving junctions and symlinks")]
#[allow(clippy::struct_excessive_bools)]
///generate our arguments and parse them.
pub struct Args {
    #[arg(
        value_name = "PATH_SPEC",
        help = "Directory and/or wildcard, e.g. 'src', '*.rs' or 'C:\\Windows\\*.dll' (defaults to the current directory)",
        value_hint = ValueHint::AnyPath,
        index = 1
    )]
    path_spec: Option<String>,

    #[arg(short = 'r', long = "recursive", help = "Walk into sub-directories")]
    recursive: bool,

    #[arg(
        short = 's',
        long = "sort",
        default_value_t = SortStrategy::Unsorted,
        help = "Sort order: none, name, files (files first) or dirs (directories first)"
    )]
    sort: SortStrategy,

    #[arg(short = 'R', long = "reverse", help = "Reverse the sort order")]
    reverse: bool,

    #[arg(short = 'e', long = "exact-case", help = "Compare names case-sensitively when sorting")]
    exact_case: bool,

    #[arg(short = 'd', long = "depth", help = "Maximum depth for --recursive (1 lists the top level only)")]
    depth: Option<u32>,

    #[arg(
        short = 'L',
        long = "follow-links",
        help = "Descend into junctions and directory symlinks during --recursive"
    )]
    follow_links: bool,

    #[arg(short = 'l', long = "long", help = "Show attributes, size, write time and link targets")]
    long: bool,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, help = "Log more (-v debug, -vv trace)")]
    verbose: u8,

    #[arg(
        long = "generate",
        action = ArgAction::Set,
        value_parser = value_parser!(Shell),
        help = "Generate shell completions"
    )]
    generate: Option<Shell>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(generator) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_owned();
        generate(generator, &mut cmd, name, &mut stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(RunError::Dir(e)) => {
            eprintln!("dirscan: {e}");
            ExitCode::FAILURE
        }
        // a closed pipe (`dirscan | head`) is not worth reporting
        Err(RunError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(RunError::Output(e)) => {
            eprintln!("dirscan: cannot write output: {e}");
            ExitCode::FAILURE
        }
    }
}

enum RunError {
    Dir(DirError),
    Output(io::Error),
}

impl From<DirError> for RunError {
    fn from(e: DirError) -> Self {
        Self::Dir(e)
    }
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        Self::Output(e)
    }
}

fn run(args: &Args) -> Result<ExitCode, RunError> {
    let lister = DirLister::new();
    let spec = lister.split_path_spec(args.path_spec.as_deref().unwrap_or(""))?;
    let sort = SortSpec::new(args.sort)
        .reverse(args.reverse)
        .exact_case(args.exact_case);
    let layout = if args.long { Layout::Long } else { Layout::Short };
    tracing::debug!(%spec, "listing");

    if args.recursive {
        let walker = Walker::init(&spec.directory)
            .pattern(&spec.pattern)
            .sort(sort)
            .max_depth(args.depth)
            .follow_links(args.follow_links)
            .keep_dirs(true)
            .resolve_links(args.long)
            .build()?;
        let report = walker.traverse()?;
        write_entries(report.entries.iter().map(|found| &found.entry), layout)?;
        write_errors(&report.errors);
        return Ok(if report.errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        });
    }

    let options = OpenOptions::new()
        .pattern(&spec.pattern)
        .sort(sort)
        .resolve_links(args.long);
    let handle = lister.open_with(&spec.directory, &options)?;
    write_entries(&handle, layout)?;
    let skipped: Vec<TraversalError> = handle
        .skipped()
        .iter()
        .map(|path| TraversalError {
            path: path.clone(),
            error: DirError::NonUnicodeName { path: path.clone() },
        })
        .collect();
    handle.close();
    write_errors(&skipped);
    Ok(if skipped.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

//! crates/catalog/src/cli.rs
//! Command-line front end of `l4cdefgen`.
//!
//! ```text
//! l4cdefgen --lib NAME [--defs FILE] [--init FILE] [-v]... CATALOG...
//! ```
//!
//! Output files are opened before any catalog is read, so a bad output path
//! fails fast with exit status 1. Catalog problems are reported as warnings
//! and never change the exit status.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::builder::OsStringValueParser;
use clap::{Arg, ArgAction, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::error::{Error, Result};
use crate::parse::Catalog;
use crate::render::{render_defs, render_init};

/// Program name used in diagnostics.
pub const PROGRAM: &str = "l4cdefgen";

/// Environment variable that overrides the verbosity-derived log filter.
pub const LOG_ENV: &str = "L4CDEFGEN_LOG";

#[derive(Debug)]
struct ParsedArgs {
    show_help: bool,
    show_version: bool,
    lib: Option<String>,
    defs: Option<PathBuf>,
    init: Option<PathBuf>,
    verbosity: u8,
    inputs: Vec<PathBuf>,
}

fn clap_command() -> Command {
    Command::new(PROGRAM)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg_required_else_help(false)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lib")
                .long("lib")
                .short('L')
                .value_name("NAME")
                .help("Library name used for output file and function names.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("defs")
                .long("defs")
                .short('H')
                .value_name("FILE")
                .help("Definitions output file (default <lib>_logdef.rs).")
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .short('C')
                .value_name("FILE")
                .help("Registration output file (default <lib>_logdef_init.rs).")
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase diagnostic verbosity; repeat for more.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("files")
                .value_name("CATALOG")
                .action(ArgAction::Append)
                .num_args(0..)
                .value_parser(OsStringValueParser::new()),
        )
}

fn parse_args<I, S>(arguments: I) -> std::result::Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    let path_arg = |matches: &mut clap::ArgMatches, id: &str| {
        matches.remove_one::<OsString>(id).map(PathBuf::from)
    };
    let defs = path_arg(&mut matches, "defs");
    let init = path_arg(&mut matches, "init");

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        lib: matches.remove_one::<String>("lib"),
        defs,
        init,
        verbosity: matches.get_count("verbose"),
        inputs: matches
            .remove_many::<OsString>("files")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default(),
    })
}

/// Help text printed by `--help`.
pub fn render_help() -> String {
    let mut command = clap_command();
    command.render_help().to_string()
}

/// Maps `-v` occurrences to a log level: none shows errors only.
pub fn verbosity_level(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Default definitions file name for `lib`.
pub fn default_defs_path(lib: &str) -> PathBuf {
    PathBuf::from(format!("{lib}_logdef.rs"))
}

/// Default registration file name for `lib`.
pub fn default_init_path(lib: &str) -> PathBuf {
    PathBuf::from(format!("{lib}_logdef_init.rs"))
}

/// Runs the generator with `arguments` (program name first) and returns the
/// process exit status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let _ = write!(stderr, "{error}");
            1
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        return match stdout.write_all(render_help().as_bytes()) {
            Ok(()) => 0,
            Err(_) => 1,
        };
    }

    if parsed.show_version {
        return match writeln!(stdout, "{PROGRAM} {}", env!("CARGO_PKG_VERSION")) {
            Ok(()) => 0,
            Err(_) => 1,
        };
    }

    let Some(lib) = parsed.lib.as_deref().filter(|lib| !lib.is_empty()) else {
        let _ = writeln!(
            stderr,
            "{PROGRAM}: --lib cannot be empty. See {PROGRAM} --help"
        );
        return 1;
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level(parsed.verbosity).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .finish();

    let defs = parsed.defs.clone().unwrap_or_else(|| default_defs_path(lib));
    let init = parsed.init.clone().unwrap_or_else(|| default_init_path(lib));

    let outcome = tracing::subscriber::with_default(subscriber, || {
        generate(lib, &parsed.inputs, &defs, &init)
    });
    match outcome {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(stderr, "{PROGRAM}: {error}");
            1
        }
    }
}

/// Reads `inputs` and writes both generated files for `lib`.
pub fn generate(lib: &str, inputs: &[PathBuf], defs: &Path, init: &Path) -> Result<()> {
    let mut defs_out = create(defs)?;
    let mut init_out = create(init)?;

    let catalog = Catalog::load(inputs);
    info!(
        target: "catalog",
        lib,
        modules = catalog.modules().len(),
        messages = catalog.len(),
        "loaded catalog"
    );

    write_out(defs, &mut defs_out, |out| render_defs(&catalog, out))?;
    write_out(init, &mut init_out, |out| render_init(&catalog, lib, out))?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn write_out<F>(path: &Path, out: &mut BufWriter<File>, render: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    render(out)
        .and_then(|()| out.flush())
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests;

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/cli/src/lib.rs
//!
//! # Overview
//!
//! `logrig-cli` implements the `logrig` command-line tool: `init` writes a
//! fresh `logrig.ini` with the master logger section and the default color
//! palette, `add` appends a logger section to an existing file, `remove`
//! deletes one, and `upgrade` rewrites legacy-layout files in place. All
//! file work is delegated to `logrig-conf`; this crate only parses
//! arguments, sequences the operations, and renders diagnostics.
//!
//! # Design
//!
//! [`run`] accepts an argument iterator together with handles for standard
//! output and error, so the whole surface is testable without spawning a
//! process. A [`clap`](https://docs.rs/clap/) command tree performs the
//! parse; each subcommand maps to one function returning [`CliError`] on
//! failure. Diagnostics intended for machines (`tracing` events from the
//! lower crates) are enabled separately through the `LOGRIG_LOG`
//! environment variable.
//!
//! # Invariants
//!
//! - [`run`] never panics; every failure surfaces as a non-zero exit code
//!   with a one-line diagnostic on standard error.
//! - Usage problems exit with `2`, operation failures with `1`, matching
//!   the conventions of both `clap` and the wider tooling this command
//!   sits beside.
//! - `init` and `add` validate the requested level and create the log
//!   path's parent directories before touching the configuration file, so
//!   a rejected invocation never leaves a half-written file behind.
//!
//! # Errors
//!
//! [`CliError`] covers the command-layer failures (missing project root,
//! refusing to overwrite, protected sections) and wraps everything the
//! file layer reports.
//!
//! # Examples
//!
//! ```
//! use logrig_cli::run;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["logrig", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(!stdout.is_empty());
//! assert!(stderr.is_empty());
//! ```
//!
//! # See also
//!
//! - `src/bin/logrig.rs` for the binary that wires [`run`] into `main`.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command, error::ErrorKind};
use logrig_conf::{
    COLOR_SECTION, ConfigFile, FILE_NAME, MASTER_SECTION, TemplateOptions, color_template,
    logger_template,
};
use thiserror::Error;

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Default record template written by `init` and `add`.
const DEFAULT_FORMATTER: &str = "{asctime} - {name} - {levelname} - {message}";

/// Environment variable controlling diagnostic output from the lower
/// crates.
const DIAGNOSTICS_ENV: &str = "LOGRIG_LOG";

/// Command-layer failures, each with its user-facing diagnostic.
#[derive(Debug, Error)]
pub enum CliError {
    /// The `init` target directory does not exist and `--mkdir` was not
    /// given.
    #[error("'{}' does not exist; pass --mkdir to create it", .0.display())]
    MissingRoot(PathBuf),

    /// `init` found an existing file and `--override` was not given.
    #[error("logrig.ini already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// `add`, `remove`, and `upgrade` need an existing configuration file.
    #[error("no logrig.ini in '{}'; run 'logrig init' there first", .0.display())]
    NoConfig(PathBuf),

    /// The file exists but carries no master section.
    #[error("{} is not a valid logrig.ini file; the 'logrig' master section is missing", .0.display())]
    NotManaged(PathBuf),

    /// The master section cannot be removed.
    #[error("'logrig' is the master configuration and cannot be removed")]
    MasterProtected,

    /// The color table cannot be removed, only emptied.
    #[error("'colors' cannot be removed; to disable color logging, set every color value to 'None'")]
    ColorsProtected,

    /// A file-layer operation failed.
    #[error(transparent)]
    Conf(#[from] logrig_conf::Error),

    /// Reading or writing outside the file layer failed.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

/// Runs the CLI using the provided argument iterator and output handles.
///
/// Returns the process exit code for the caller: `0` on success, `1` when
/// a command fails, `2` for usage errors.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    init_diagnostics();

    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from("logrig"));
    }

    let matches = match clap_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => return report_parse_outcome(&error, stdout, stderr),
    };

    match dispatch(&matches, stdout) {
        Ok(()) => 0,
        Err(failure) => {
            let _ = writeln!(stderr, "logrig: {failure}");
            1
        }
    }
}

/// Maps a [`run`] return value onto a process [`ExitCode`].
#[must_use]
pub fn exit_code_from(code: i32) -> ExitCode {
    u8::try_from(code.clamp(0, MAX_EXIT_CODE)).map_or(ExitCode::FAILURE, ExitCode::from)
}

/// Route clap's help/version "errors" to stdout with a success code;
/// genuine usage errors go to stderr with code 2.
fn report_parse_outcome<Out, Err>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(stdout, "{}", error.render());
            0
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = write!(stdout, "{}", error.render());
            2
        }
        _ => {
            let _ = write!(stderr, "{}", error.render());
            2
        }
    }
}

/// Enable `tracing` output when `LOGRIG_LOG` asks for it.
fn init_diagnostics() {
    use tracing_subscriber::EnvFilter;

    let Ok(filter) = EnvFilter::try_from_env(DIAGNOSTICS_ENV) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_command() -> Command {
    Command::new("logrig")
        .about("Manage logrig.ini logging configuration files")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("init")
                .about("Create a logrig.ini with the master logger configuration")
                .arg(project_root_arg())
                .arg(
                    Arg::new("mkdir")
                        .long("mkdir")
                        .help("Create the project root directory if it is missing.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("override")
                        .long("override")
                        .short('o')
                        .help("Replace an existing logrig.ini.")
                        .action(ArgAction::SetTrue),
                )
                .arg(level_arg())
                .arg(formatter_arg())
                .arg(log_path_arg()),
        )
        .subcommand(
            Command::new("add")
                .about("Add a logger section to an existing logrig.ini")
                .arg(
                    Arg::new("name")
                        .help("Name of the logger section to add.")
                        .required(true),
                )
                .arg(project_root_arg())
                .arg(level_arg())
                .arg(formatter_arg())
                .arg(log_path_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a logger section from an existing logrig.ini")
                .arg(
                    Arg::new("name")
                        .help("Name of the logger section to remove.")
                        .required(true),
                )
                .arg(project_root_arg()),
        )
        .subcommand(
            Command::new("upgrade")
                .about("Rewrite a legacy-layout logrig.ini in the current layout")
                .arg(project_root_arg()),
        )
}

fn project_root_arg() -> Arg {
    Arg::new("project-root")
        .long("project-root")
        .short('p')
        .value_name("DIR")
        .help("Directory holding (or receiving) the logrig.ini file.")
        .default_value(".")
}

fn level_arg() -> Arg {
    Arg::new("level")
        .long("level")
        .short('l')
        .value_name("LEVEL")
        .help("Logging level for the new section.")
        .default_value("DEBUG")
}

fn formatter_arg() -> Arg {
    Arg::new("formatter")
        .long("formatter")
        .short('f')
        .value_name("TEMPLATE")
        .help("Record template for the new section.")
        .default_value(DEFAULT_FORMATTER)
}

fn log_path_arg() -> Arg {
    Arg::new("log-path")
        .long("log-path")
        .value_name("FILE")
        .help("Log file path written into the (inactive) file handler.")
}

fn dispatch<Out: Write>(matches: &ArgMatches, stdout: &mut Out) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("init", sub)) => init_command(sub),
        Some(("add", sub)) => add_command(sub),
        Some(("remove", sub)) => remove_command(sub),
        Some(("upgrade", sub)) => upgrade_command(sub, stdout),
        _ => Ok(()),
    }
}

fn init_command(sub: &ArgMatches) -> Result<(), CliError> {
    let options = template_options(sub);
    let entries = logger_template(&options)?;
    prepare_log_dir(&options)?;

    let root = project_root(sub)?;
    if !root.exists() {
        if !sub.get_flag("mkdir") {
            return Err(CliError::MissingRoot(root));
        }
        fs::create_dir_all(&root)?;
    }

    let target = root.join(FILE_NAME);
    if target.exists() && !sub.get_flag("override") {
        return Err(CliError::AlreadyInitialized(target));
    }

    let mut file = ConfigFile::empty(&target);
    file.set_section(COLOR_SECTION, &color_template())?;
    file.set_section(MASTER_SECTION, &entries)?;
    file.save()?;
    tracing::debug!(path = %target.display(), "initialized configuration");
    Ok(())
}

fn add_command(sub: &ArgMatches) -> Result<(), CliError> {
    let (root, path) = existing_config(sub)?;
    let mut file = ConfigFile::load(&path)?;

    let name = section_name(sub);
    if file.has_section(name) {
        return Err(logrig_conf::Error::SectionExists {
            name: name.to_owned(),
            path,
        }
        .into());
    }
    if !file.has_section(MASTER_SECTION) {
        return Err(CliError::NotManaged(path));
    }

    let options = template_options(sub);
    let entries = logger_template(&options)?;
    prepare_log_dir(&options)?;

    file.add_section(name, &entries)?;
    file.save()?;
    tracing::debug!(section = name, root = %root.display(), "added logger section");
    Ok(())
}

fn remove_command(sub: &ArgMatches) -> Result<(), CliError> {
    let name = section_name(sub);
    if name == MASTER_SECTION {
        return Err(CliError::MasterProtected);
    }
    if name == COLOR_SECTION {
        return Err(CliError::ColorsProtected);
    }

    let (_, path) = existing_config(sub)?;
    let mut file = ConfigFile::load(path)?;
    file.remove_section(name)?;
    file.save()?;
    Ok(())
}

fn upgrade_command<Out: Write>(sub: &ArgMatches, stdout: &mut Out) -> Result<(), CliError> {
    let (_, path) = existing_config(sub)?;
    let mut file = ConfigFile::load(&path)?;
    logrig_conf::upgrade_config(&mut file)?;
    file.save()?;
    writeln!(
        stdout,
        "{} has been upgraded to the current handler layout",
        path.display()
    )?;
    Ok(())
}

/// The `name` argument of `add` and `remove`; clap enforces presence.
fn section_name(sub: &ArgMatches) -> &str {
    sub.get_one::<String>("name").map_or("", String::as_str)
}

fn project_root(sub: &ArgMatches) -> Result<PathBuf, CliError> {
    let root = sub
        .get_one::<String>("project-root")
        .map_or(".", String::as_str);
    Ok(std::path::absolute(root)?)
}

/// Resolve the project root and require its configuration file to exist.
fn existing_config(sub: &ArgMatches) -> Result<(PathBuf, PathBuf), CliError> {
    let root = project_root(sub)?;
    let path = root.join(FILE_NAME);
    if !path.is_file() {
        return Err(CliError::NoConfig(root));
    }
    Ok((root, path))
}

fn template_options(sub: &ArgMatches) -> TemplateOptions {
    let mut options = TemplateOptions::new();
    if let Some(level) = sub.get_one::<String>("level") {
        options = options.level(level);
    }
    if let Some(formatter) = sub.get_one::<String>("formatter") {
        options = options.formatter(formatter);
    }
    if let Some(path) = sub.get_one::<String>("log-path") {
        options = options.filename(path);
    }
    options
}

/// Create the parent directories of a requested log path up front, so the
/// file handler can be activated later without more setup.
fn prepare_log_dir(options: &TemplateOptions) -> Result<(), CliError> {
    let Some(path) = options.log_path() else {
        return Ok(());
    };
    let absolute = std::path::absolute(Path::new(path))?;
    if let Some(parent) = absolute.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

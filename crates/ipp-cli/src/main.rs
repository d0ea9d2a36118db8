use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use commands::test::{TestArgs, TestMode};
use config::{Config, DEFAULT_LOG_FILTER};
use error::exit_code_for;
use ipp_runtime::exit_codes;

/// IPPcode22 interpreter and tooling.
///
/// Executes programs in the IPPcode22 XML interchange format, or in the
/// textual assembly form with --text.
///
/// EXAMPLES:
///     ipp run --source prog.xml              Run, READ takes lines from stdin
///     ipp run --source prog.xml --input in   Run with READ input from a file
///     ipp run --input in < prog.xml          Program on stdin
///     ipp parse prog.ipp > prog.xml          Translate text to XML
///     ipp check --source prog.xml            Validate without running
///     ipp disasm --source prog.xml           Print a listing
///     ipp test --directory cases             Run regression cases
///
/// ENVIRONMENT VARIABLES:
///     IPP_STATS      Default statistics file for `run`
///     IPP_JSON       Set to '1' for JSON statistics, check and test output
///     IPP_LOG        tracing filter for diagnostics on stderr (default: warn)
///     NO_COLOR       Set to disable colored output
#[derive(Parser)]
#[command(name = "ipp")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an IPPcode22 program
    ///
    /// At least one of --source and --input must be given; the other
    /// stream is read from stdin. The process exits with the code the
    /// program passes to EXIT, 0 when it runs off the end, or the error
    /// code of the failure that stopped it.
    ///
    /// EXAMPLES:
    ///     ipp run --source prog.xml --input data.txt
    ///     ipp run --source prog.ipp --text --stats stats.txt
    #[command(visible_alias = "r")]
    Run {
        /// Program file (stdin when omitted)
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        /// Input for READ (stdin when omitted)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Write execution statistics to FILE
        #[arg(long, value_name = "FILE")]
        stats: Option<PathBuf>,
        /// Write statistics as JSON
        #[arg(long, env = "IPP_JSON")]
        json: bool,
        /// Source is IPPcode22 text instead of XML
        #[arg(long)]
        text: bool,
    },

    /// Translate IPPcode22 text into XML
    ///
    /// EXAMPLES:
    ///     ipp parse prog.ipp > prog.xml
    ///     ipp parse < prog.ipp
    ///     ipp parse prog.ipp -o prog.xml
    Parse {
        /// Source file (stdin when omitted)
        file: Option<PathBuf>,
        /// Write XML to FILE instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Load and validate a program without running it
    ///
    /// Reports structural and lexical errors, and duplicate labels.
    ///
    /// EXAMPLES:
    ///     ipp check --source prog.xml
    ///     ipp check --source prog.ipp --text --json
    #[command(visible_alias = "c")]
    Check {
        /// Program file (stdin when omitted)
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        /// Source is IPPcode22 text instead of XML
        #[arg(long)]
        text: bool,
        /// Output the result as JSON
        #[arg(long, env = "IPP_JSON")]
        json: bool,
    },

    /// Print a listing of the loaded program
    ///
    /// Instructions appear in execution order with their order numbers.
    Disasm {
        /// Program file (stdin when omitted)
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        /// Source is IPPcode22 text instead of XML
        #[arg(long)]
        text: bool,
    },

    /// Run a directory of regression cases
    ///
    /// Each case is NAME.src with optional NAME.in, NAME.out and NAME.rc
    /// beside it. Exits 1 when any case fails.
    ///
    /// EXAMPLES:
    ///     ipp test --directory tests/cases
    ///     ipp test --directory tests/xml --int-only --recursive
    #[command(visible_alias = "t")]
    Test {
        /// Directory holding the cases
        #[arg(long, default_value = ".", value_name = "DIR")]
        directory: PathBuf,
        /// Search subdirectories too
        #[arg(long)]
        recursive: bool,
        /// Only assemble; compare against the expected XML
        #[arg(long, conflicts_with = "int_only")]
        parse_only: bool,
        /// Sources are XML programs
        #[arg(long)]
        int_only: bool,
        /// Output results as JSON
        #[arg(long, env = "IPP_JSON")]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures
            let code = if err.use_stderr() {
                exit_codes::INVALID_ARGUMENTS
            } else {
                0
            };
            let _ = err.print();
            return exit_code(code);
        }
    };

    let cli_config = Config::from_env();
    init_logging(&cli_config);
    if cli_config.no_color {
        colored::control::set_override(false);
    }

    let code = match execute(cli.command, &cli_config) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            exit_code_for(&err)
        }
    };
    exit_code(code)
}

fn execute(command: Commands, cli_config: &Config) -> anyhow::Result<i32> {
    match command {
        Commands::Run {
            source,
            input,
            stats,
            json,
            text,
        } => {
            // Command-line flags override environment variables
            let args = commands::run::RunArgs {
                source,
                input,
                stats: stats.or_else(|| cli_config.stats_file.clone()),
                json: json || cli_config.default_json,
                text,
            };
            commands::run::run(args)
        }
        Commands::Parse { file, output } => {
            commands::parse::run(commands::parse::ParseArgs { file, output })
        }
        Commands::Check { source, text, json } => {
            let args = commands::check::CheckArgs {
                source,
                text,
                json: json || cli_config.default_json,
            };
            commands::check::run(args)
        }
        Commands::Disasm { source, text } => commands::disasm::run(source, text),
        Commands::Test {
            directory,
            recursive,
            parse_only,
            int_only,
            json,
        } => {
            let mode = if parse_only {
                TestMode::ParseOnly
            } else if int_only {
                TestMode::IntOnly
            } else {
                TestMode::Both
            };
            commands::test::run(TestArgs {
                directory,
                recursive,
                mode,
                json: json || cli_config.default_json,
            })
        }
    }
}

fn init_logging(cli_config: &Config) {
    let filter = EnvFilter::try_new(&cli_config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!cli_config.no_color)
        .try_init();
}

fn report(err: &anyhow::Error) {
    eprintln!("{}: {}", "error".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(exit_codes::INTERNAL as u8))
}

//! Graymark CLI - dual-layer visually-bound barcode tool.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "Exit codes:
  0   success
  1   general error
  65  verification or decoding failed
  66  cannot open input
  74  cannot write output";

#[derive(Parser)]
#[command(name = "graymark")]
#[command(author, version, about = "Dual-layer visually-bound barcode authentication", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Increase log verbosity
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress user-facing output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyScheme {
    /// ECDSA P-256 key pair (PEM files)
    Ecdsa,
    /// Raw 32-byte symmetric master key
    Hmac,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signed composite barcode image
    Generate {
        /// Public data to encode
        #[arg(value_name = "DATA")]
        data: String,

        /// Secret message to embed in the signed payload
        #[arg(short, long, default_value = "")]
        secret: String,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Key file: raw 32-byte master key or PEM private key
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Also write a plain black-and-white QR of the same data
        #[arg(long)]
        standard: bool,
    },

    /// Verify a composite barcode image
    Verify {
        /// Path to the barcode image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Key file: raw 32-byte master key or PEM public/private key
        #[arg(short, long)]
        key: Option<PathBuf>,
    },

    /// Read any barcode image, composite or standard
    Read {
        /// Path to the barcode image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Key file used to check authenticity when present
        #[arg(short, long)]
        key: Option<PathBuf>,
    },

    /// Generate key material for signing
    Keygen {
        /// Directory to write key files into
        #[arg(short, long, default_value = "./keys")]
        dir: PathBuf,

        /// Key type to generate
        #[arg(short, long, value_enum, default_value_t = KeyScheme::Ecdsa)]
        scheme: KeyScheme,

        /// Overwrite existing key files
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool, quiet: bool, color: ColorMode) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let ansi = match color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stderr().is_terminal(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .init();
}

fn apply_color(color: ColorMode) {
    match color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

fn main() {
    let cli = Cli::parse();
    apply_color(cli.color);
    init_tracing(cli.verbose, cli.quiet, cli.color);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Generate {
            data,
            secret,
            output,
            key,
            standard,
        } => commands::generate::execute(&data, &secret, &output, key.as_deref(), standard, quiet),
        Commands::Verify { image, key } => commands::verify::execute(&image, key.as_deref(), quiet),
        Commands::Read { image, key } => commands::read::execute(&image, key.as_deref(), quiet),
        Commands::Keygen { dir, scheme, force } => {
            commands::keygen::execute(&dir, scheme, force, quiet)
        }
    };

    if let Err(err) = result {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = &exit.message {
            eprintln!("{} {message}", "Error:".red().bold());
        }
        process::exit(exit.code);
    }
}

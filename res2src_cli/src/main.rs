//! res2src - compile binary resources into C++ source arrays
//!
//! Usage: res2src [OPTIONS] [INPUTS]...

use std::{error::Error as _, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, ValueEnum};
use res2src::{Config, Input, Method};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "RES2SRC_LOG";

/// Compile binary resources into a C++ source/header pair
#[derive(Parser, Debug)]
#[command(name = "res2src")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files as `path[=name]`, or `path name` pairs with --pairs
    inputs: Vec<String>,

    /// Treat inputs as legacy `path name path name ...` pairs
    #[arg(long)]
    pairs: bool,

    /// Also embed every `@<n>` scaled variant of this file (repeatable)
    #[arg(short, long, value_name = "PATH")]
    scaled: Vec<PathBuf>,

    /// Compress each resource before embedding it
    #[arg(short, long, value_enum, default_value_t = Compression::None)]
    compress: Compression,

    /// Compression level (range depends on the method)
    #[arg(long)]
    level: Option<u32>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Basename of the generated files
    #[arg(short, long, default_value = res2src::DEFAULT_BASENAME)]
    name: String,

    /// Emit a registry table of all resources under this name
    #[arg(short, long, value_name = "NAME")]
    array: Option<String>,

    /// Name of the registry record type
    #[arg(long = "sn", visible_alias = "struct-name", default_value = res2src::DEFAULT_STRUCT_NAME)]
    struct_name: String,

    /// Maximum line length of generated code
    #[arg(long, default_value_t = res2src::DEFAULT_WRAP_WIDTH)]
    length: usize,

    /// Prefix for generated identifiers
    #[arg(long, default_value = "")]
    prefix: String,

    /// Write only the source file
    #[arg(long)]
    no_header: bool,

    /// Resolve inputs relative to this directory
    #[arg(long, value_name = "DIR")]
    cd: Option<PathBuf>,

    /// Check that every compressed resource decompresses to its input
    #[arg(long)]
    verify: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Compression {
    None,
    Gzip,
    Bz2,
    Xz,
    Zstd,
}

impl From<Compression> for Method {
    fn from(c: Compression) -> Self {
        match c {
            Compression::None => Self::None,
            Compression::Gzip => Self::Gzip,
            Compression::Bz2 => Self::Bz2,
            Compression::Xz => Self::Xz,
            Compression::Zstd => Self::Zstd,
        }
    }
}

impl Cli {
    fn into_config(self) -> res2src::Result<Config> {
        let inputs = if self.pairs {
            Input::pairs(&self.inputs)?
        } else {
            self.inputs.iter().map(|t| Input::parse(t)).collect()
        };

        let mut config = Config::new(self.output)
            .inputs(inputs)
            .inputs(self.scaled.into_iter().map(Input::Scaled))
            .basename(self.name)
            .compress(self.compress.into())
            .struct_name(self.struct_name)
            .wrap_width(self.length)
            .prefix(self.prefix)
            .header(!self.no_header)
            .verify(self.verify);
        if let Some(level) = self.level {
            config = config.level(level);
        }
        if let Some(array) = self.array {
            config = config.array(array);
        }
        if let Some(dir) = self.cd {
            config = config.base_dir(dir);
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.into_config().and_then(Config::run) {
        Ok(outputs) => {
            tracing::info!(source = %outputs.source.display(), "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn compression_names_match_the_library() {
        for c in Compression::value_variants() {
            let name = c.to_possible_value().unwrap().get_name().to_owned();
            assert_eq!(name.parse::<Method>().unwrap(), Method::from(*c));
        }
    }

    #[test]
    fn odd_pairs_fail_before_io() {
        let cli = Cli::parse_from(["res2src", "--pairs", "a.bin", "a", "b.bin"]);
        assert!(matches!(cli.into_config(), Err(res2src::Error::Argument(_))));
    }
}

//! Command-line parsing.
//!
//! ```text
//! farmstead-admin [--config PATH] [--database-url URL] [--reset] [--yes]
//!                 [--dump-schema PATH] [--quiet]
//! ```

use std::path::PathBuf;

use crate::error::AdminError;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "farmstead-config.yaml";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Configuration file to load.
    pub config: PathBuf,
    /// Overrides the configured `PostgreSQL` URL.
    pub database_url: Option<String>,
    /// Truncate every farm table before seeding.
    pub reset: bool,
    /// Skip the interactive confirmation for `--reset`.
    pub yes: bool,
    /// Write the schema SQL to this file and exit.
    pub dump_schema: Option<PathBuf>,
    /// Only log warnings and errors.
    pub quiet: bool,
    /// Print usage and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            database_url: None,
            reset: false,
            yes: false,
            dump_schema: None,
            quiet: false,
            help: false,
        }
    }
}

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Initialise or migrate the Farmstead database.

Usage: farmstead-admin [OPTIONS]

Options:
  --config PATH        Configuration file (default: farmstead-config.yaml)
  --database-url URL   Override the configured PostgreSQL URL
  --reset              Delete all farm data before seeding (asks first)
  --yes                Do not ask before --reset
  --dump-schema PATH   Write the schema SQL to PATH and exit
  --quiet              Only log warnings and errors
  --help               Show this message";

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, AdminError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = PathBuf::from(value_for(&arg, args.next())?),
                "--database-url" => parsed.database_url = Some(value_for(&arg, args.next())?),
                "--reset" => parsed.reset = true,
                "--yes" | "-y" => parsed.yes = true,
                "--dump-schema" => {
                    parsed.dump_schema = Some(PathBuf::from(value_for(&arg, args.next())?));
                }
                "--quiet" | "-q" => parsed.quiet = true,
                "--help" | "-h" => parsed.help = true,
                other => {
                    return Err(AdminError::Usage {
                        message: format!("unknown argument {other:?}"),
                    });
                }
            }
        }
        Ok(parsed)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, AdminError> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| AdminError::Usage {
            message: format!("{flag} needs a value"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, AdminError> {
        Args::parse(args.iter().map(|a| (*a).to_owned()))
    }

    #[test]
    fn no_arguments_is_default() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
        assert_eq!(Args::default().config, PathBuf::from("farmstead-config.yaml"));
    }

    #[test]
    fn every_flag_parses() {
        let args = parse(&[
            "--config",
            "farm.yaml",
            "--database-url",
            "postgres://x@y/z",
            "--reset",
            "--yes",
            "--dump-schema",
            "schema.sql",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("farm.yaml"));
        assert_eq!(args.database_url.as_deref(), Some("postgres://x@y/z"));
        assert!(args.reset && args.yes && args.quiet);
        assert_eq!(args.dump_schema, Some(PathBuf::from("schema.sql")));
        assert!(!args.help);
    }

    #[test]
    fn missing_value_is_usage_error() {
        assert!(matches!(
            parse(&["--dump-schema"]),
            Err(AdminError::Usage { .. })
        ));
        assert!(matches!(
            parse(&["--config", "--quiet"]),
            Err(AdminError::Usage { .. })
        ));
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        assert!(matches!(parse(&["--drop"]), Err(AdminError::Usage { .. })));
    }
}

//! Command-line argument definitions for the classmap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the source root, the output path,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the classmap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source root scanned for `.java` files
    #[arg(help = "Source root directory [default: from config, else src/main/java]")]
    pub input: Option<String>,

    /// Path to the output PlantUML file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Diagram title, overriding the configured one
    #[arg(long)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["classmap"]);
        assert_eq!(args.input, None);
        assert_eq!(args.output, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "classmap",
            "app/src/main/java",
            "-o",
            "out.puml",
            "-c",
            "classmap.toml",
            "--log-level",
            "debug",
            "--title",
            "Shop",
        ]);
        assert_eq!(args.input.as_deref(), Some("app/src/main/java"));
        assert_eq!(args.output.as_deref(), Some("out.puml"));
        assert_eq!(args.config.as_deref(), Some("classmap.toml"));
        assert_eq!(args.log_level, "debug");
        assert_eq!(args.title.as_deref(), Some("Shop"));
    }
}

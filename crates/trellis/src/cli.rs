use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis - function and prompt filter pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "trellis.toml")]
        path: PathBuf,
    },
    /// Invoke the configured function through the filter pipeline
    Run {
        /// Function to invoke (defaults to kernel.function from config)
        #[arg(long)]
        function: Option<String>,
        /// Function argument as key=value (repeatable)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
        /// Print the result (value + metadata) as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured filters in execution order
    Filters,
}

/// Parse a `key=value` argument
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected key=value, got '{}'", s);
    };
    if key.trim().is_empty() {
        bail!("empty argument name in '{}'", s);
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("input=new input").unwrap(),
            ("input".to_string(), "new input".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from(["trellis", "run", "--set", "input=hi", "--json"]);
        match cli.command {
            Commands::Run { function, set, json } => {
                assert!(function.is_none());
                assert_eq!(set, vec![("input".to_string(), "hi".to_string())]);
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }
}

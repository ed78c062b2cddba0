use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use clap::{ArgAction, Parser};
use site_validator::output::{write_human, write_json, write_validator_list};
use site_validator::{RunOptions, SiteConfig, ValidationService};

use crate::logging;

#[derive(Parser, Debug)]
#[command(name = "site-validator")]
#[command(about = "Validate site content: redirects, SEO metadata, structured data and registries", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// List available validators and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Comma-separated validators to run (default: all)
    #[arg(short = 'v', long, value_delimiter = ',', value_name = "NAMES")]
    pub validators: Vec<String>,

    /// Print the report as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Include per-validator artifacts in the report
    #[arg(short = 'a', long)]
    pub artifacts: bool,

    /// Add a timestamp to the JSON report
    #[arg(long)]
    pub timestamp: bool,

    /// Site root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: site-validator.yml under the root, if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (repeatable)
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Parse arguments and run. Returns whether the run passed.
pub fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = SiteConfig::load(&cli.root, cli.config.as_deref())?;
    let mut service = ValidationService::with_default_validators(config);
    let mut stdout = std::io::stdout().lock();

    if cli.list {
        write_validator_list(&service.validator_metadata(), &mut stdout)?;
        return Ok(true);
    }

    let options = RunOptions {
        validators: (!cli.validators.is_empty()).then(|| cli.validators.clone()),
        include_artifacts: cli.artifacts,
    };
    let result = service.run_validators(&options);

    if cli.json {
        let timestamp = cli
            .timestamp
            .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        write_json(&result, &mut stdout, timestamp.as_deref())?;
    } else {
        write_human(&result, &mut stdout)?;
    }
    stdout.flush()?;
    Ok(result.ok())
}

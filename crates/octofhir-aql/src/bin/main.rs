//! AQL command-line interface

use clap::{Parser, Subcommand};
use octofhir_aql::cli::output::{self, OutputFormat};
use octofhir_aql::cli::{bind, evaluate, render, restrict};
use std::path::PathBuf;

/// AQL command-line tool
#[derive(Parser)]
#[command(name = "aql")]
#[command(author, version, about = "AQL query restriction and cohort evaluation tools", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json, pretty)
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: String,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print it in canonical form
    Render {
        /// AQL file to render
        file: PathBuf,
    },

    /// Restrict a query to EHRs, templates or consented records
    Restrict {
        /// AQL file to restrict
        file: PathBuf,

        /// Allowed EHR id (repeatable)
        #[arg(long = "ehr-id")]
        ehr_ids: Vec<String>,

        /// Allowed template id (repeatable)
        #[arg(long = "template")]
        templates: Vec<String>,

        /// Required consent identifier
        #[arg(long)]
        consent_oid: Option<String>,
    },

    /// Bind parameters into a query
    Bind {
        /// AQL file with $parameters
        file: PathBuf,

        /// Parameters (name=value, name=null for absent)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Evaluate a cohort against a fixture engine
    Evaluate {
        /// Cohort definition (JSON)
        cohort: PathBuf,

        /// Fixture engine definition (JSON)
        #[arg(long)]
        fixtures: PathBuf,

        /// Do not apply the consent restriction
        #[arg(long)]
        allow_outside_eu: bool,

        /// Settings file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Consent identifier, overrides the settings file
        #[arg(long)]
        consent_oid: Option<String>,

        /// AQL file to export the cohort's records with
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let format = OutputFormat::from_name(&cli.format);

    let result = match cli.command {
        Commands::Render { file } => render::render(render::RenderConfig {
            file,
            format,
            output_file: cli.output.clone(),
        }),

        Commands::Restrict {
            file,
            ehr_ids,
            templates,
            consent_oid,
        } => restrict::restrict(restrict::RestrictConfig {
            file,
            ehr_ids,
            templates,
            consent_oid,
            output_file: cli.output.clone(),
        }),

        Commands::Bind { file, params } => bind::bind(bind::BindConfig {
            file,
            params,
            output_file: cli.output.clone(),
        }),

        Commands::Evaluate {
            cohort,
            fixtures,
            allow_outside_eu,
            config,
            consent_oid,
            export,
        } => {
            let config = evaluate::EvaluateConfig {
                cohort_file: cohort,
                fixtures,
                allow_outside_eu,
                config_file: config,
                consent_oid,
                export,
                format,
                output_file: cli.output.clone(),
            };
            evaluate::evaluate(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

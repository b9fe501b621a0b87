//! Print the OpenAPI document as JSON (default) or YAML.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use planner::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// Dump the planner OpenAPI document to stdout.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();
    let rendered = match cli.format {
        Format::Json => doc
            .to_pretty_json()
            .wrap_err("failed to render OpenAPI JSON")?,
        Format::Yaml => doc.to_yaml().wrap_err("failed to render OpenAPI YAML")?,
    };
    println!("{rendered}");
    Ok(())
}

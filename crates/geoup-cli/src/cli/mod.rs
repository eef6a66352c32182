//! CLI for the GeoUp mapping-data client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use geoup_core::api::ApiClient;
use geoup_core::config::{self, RetryConfig};
use geoup_core::auth;
use std::path::PathBuf;

use commands::{
    run_clean_tags, run_display_rules, run_mosaic_report, run_projects, run_retag_rasters,
    run_upload,
};

/// Top-level CLI for the GeoUp mapping-data client.
#[derive(Debug, Parser)]
#[command(name = "geoup")]
#[command(about = "GeoUp: resumable geospatial uploads and bulk maintenance", long_about = None)]
pub struct Cli {
    /// Number of times to retry failed chunk sends before giving up.
    #[arg(long, global = true, env = "GEOUP_RETRY")]
    pub retry: Option<u32>,

    /// Chunk size in bytes for resumable uploads.
    #[arg(long, global = true, env = "GEOUP_CHUNK_SIZE")]
    pub chunk_size: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload a geospatial file to an asset via a resumable session.
    Upload {
        /// Local file to upload (raster, vector part, or table).
        file: PathBuf,

        /// Destination asset identifier.
        #[arg(long)]
        asset_id: String,
    },

    /// List accessible projects.
    Projects,

    /// Bulk maintenance tools over the paginated API.
    #[command(subcommand)]
    Tools(ToolsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// Apply and remove a marker tag on every raster in a project to force
    /// a server-side ACL refresh.
    RetagRasters {
        /// Project to process.
        #[arg(long)]
        project_id: String,

        /// Marker tag to apply and remove.
        #[arg(long, default_value = "geoup-retag")]
        tag: String,
    },

    /// Render a layer's display rules to an HTML report.
    DisplayRules {
        /// Layer to describe.
        #[arg(long)]
        layer_id: String,

        /// HTML file to write.
        outfile: PathBuf,
    },

    /// Write a CSV of image layers backed by more than one datasource.
    MosaicReport {
        /// Project to scan.
        #[arg(long)]
        project_id: String,

        /// Only consider layers created by this user.
        #[arg(long)]
        creator_email: Option<String>,

        /// CSV file to write.
        outfile: PathBuf,
    },

    /// Strip leading/trailing whitespace from asset tags, logging every
    /// patched asset to an audit CSV.
    CleanTags {
        /// Project to process.
        #[arg(long)]
        project_id: String,

        /// Audit CSV file to write.
        outfile: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(max_retries) = cli.retry {
            cfg.retry = Some(RetryConfig { max_retries });
        }
        if let Some(chunk_size) = cli.chunk_size {
            cfg.chunk_size_bytes = chunk_size;
        }
        tracing::debug!("loaded config: {:?}", cfg);

        let token = auth::load_access_token()?;
        let client = ApiClient::new(&cfg.api_base_url, token)?;

        match cli.command {
            CliCommand::Upload { file, asset_id } => {
                run_upload(&cfg, &client, &file, &asset_id)?
            }
            CliCommand::Projects => run_projects(&client)?,
            CliCommand::Tools(tool) => match tool {
                ToolsCommand::RetagRasters { project_id, tag } => {
                    run_retag_rasters(&client, &project_id, &tag)?
                }
                ToolsCommand::DisplayRules { layer_id, outfile } => {
                    run_display_rules(&client, &layer_id, &outfile)?
                }
                ToolsCommand::MosaicReport {
                    project_id,
                    creator_email,
                    outfile,
                } => run_mosaic_report(&client, &project_id, creator_email.as_deref(), &outfile)?,
                ToolsCommand::CleanTags {
                    project_id,
                    outfile,
                } => run_clean_tags(&client, &project_id, &outfile)?,
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

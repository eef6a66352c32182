//! CLI command handlers. Each command is in its own file for clarity.

mod clean_tags;
mod display_rules;
mod mosaic_report;
mod projects;
mod retag_rasters;
mod upload;

pub use clean_tags::run_clean_tags;
pub use display_rules::run_display_rules;
pub use mosaic_report::run_mosaic_report;
pub use projects::run_projects;
pub use retag_rasters::run_retag_rasters;
pub use upload::run_upload;

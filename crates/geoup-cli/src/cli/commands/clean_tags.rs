//! `geoup tools clean-tags` – strip leading/trailing whitespace from asset
//! tags, patching each changed asset and appending an audit CSV row.
//!
//! The audit row is flushed per asset so an interrupted run still leaves a
//! usable record of what was already patched.

use anyhow::{Context, Result};
use geoup_core::api::pager::{items, paginate};
use geoup_core::api::ApiClient;
use geoup_core::model::AssetSummary;
use geoup_core::report::csv_line;
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Tag-count ceiling above which the service rejects patches.
const MAX_TAGS: usize = 25;

pub fn run_clean_tags(client: &ApiClient, project_id: &str, outfile: &Path) -> Result<()> {
    let mut audit = File::create(outfile)
        .with_context(|| format!("create audit file {}", outfile.display()))?;
    audit.write_all(csv_line(&["id", "name", "tags_original", "tags_cleaned", "processed"]).as_bytes())?;

    let mut patched = 0u32;
    let mut skipped = 0u32;

    paginate(
        |token| {
            let mut query = vec![
                ("projectId", project_id),
                ("fields", "nextPageToken,assets/id,assets/name,assets/tags"),
            ];
            if let Some(token) = token {
                query.push(("pageToken", token));
            }
            Ok(client.get("assets", &query)?)
        },
        |page| -> Result<()> {
            for entry in items(page, "assets") {
                let asset: AssetSummary = serde_json::from_value(entry.clone())?;
                let cleaned: Vec<String> =
                    asset.tags.iter().map(|t| t.trim().to_string()).collect();
                if cleaned == asset.tags {
                    continue;
                }

                let processed = if asset.tags.len() > MAX_TAGS {
                    println!(
                        "{} ({}) skipped: more than {} tags",
                        asset.id, asset.name, MAX_TAGS
                    );
                    skipped += 1;
                    false
                } else {
                    client.patch(
                        &format!("assets/{}", asset.id),
                        &json!({ "tags": cleaned }),
                    )?;
                    println!("{} ({}) patched", asset.id, asset.name);
                    patched += 1;
                    true
                };

                audit.write_all(
                    csv_line(&[
                        &asset.id,
                        &asset.name,
                        &asset.tags.join(","),
                        &cleaned.join(","),
                        if processed { "true" } else { "false" },
                    ])
                    .as_bytes(),
                )?;
                audit.flush()?;
            }
            Ok(())
        },
    )?;

    println!(
        "Cleaned tags on {} asset(s), skipped {}, audit at {}",
        patched,
        skipped,
        outfile.display()
    );
    Ok(())
}

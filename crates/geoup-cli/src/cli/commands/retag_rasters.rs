//! `geoup tools retag-rasters` – apply-and-remove a marker tag on every
//! raster in a project so the server refreshes its access-control records.

use anyhow::Result;
use geoup_core::api::pager::{items, paginate};
use geoup_core::api::ApiClient;
use geoup_core::model::AssetSummary;
use serde_json::json;

pub fn run_retag_rasters(client: &ApiClient, project_id: &str, marker_tag: &str) -> Result<()> {
    let mut patched = 0u32;

    paginate(
        |token| {
            let mut query = vec![
                ("projectId", project_id),
                ("fields", "nextPageToken,rasters/id,rasters/tags"),
            ];
            if let Some(token) = token {
                query.push(("pageToken", token));
            }
            Ok(client.get("rasters", &query)?)
        },
        |page| -> Result<()> {
            for entry in items(page, "rasters") {
                let raster: AssetSummary = serde_json::from_value(entry.clone())?;
                let mut marked = raster.tags.clone();
                marked.push(marker_tag.to_string());
                client.patch(&format!("rasters/{}", raster.id), &json!({ "tags": marked }))?;
                client.patch(
                    &format!("rasters/{}", raster.id),
                    &json!({ "tags": raster.tags }),
                )?;
                println!("{} patched OK", raster.id);
                patched += 1;
            }
            Ok(())
        },
    )?;

    println!("Retagged {} raster(s) in project {}", patched, project_id);
    Ok(())
}

//! `geoup tools mosaic-report` – CSV of image layers with multiple
//! datasources (mosaics), largest first.

use anyhow::{Context, Result};
use geoup_core::api::pager::{items, paginate};
use geoup_core::api::ApiClient;
use geoup_core::model::{LayerDatasources, LayerSummary};
use geoup_core::report::{mosaic_csv, MosaicRow};
use std::fs;
use std::path::Path;

pub fn run_mosaic_report(
    client: &ApiClient,
    project_id: &str,
    creator_email: Option<&str>,
    outfile: &Path,
) -> Result<()> {
    let mut rows: Vec<MosaicRow> = Vec::new();

    paginate(
        |token| {
            let mut query = vec![
                ("projectId", project_id),
                (
                    "fields",
                    "nextPageToken,layers/id,layers/name,layers/datasourceType",
                ),
            ];
            if let Some(email) = creator_email {
                query.push(("creatorEmail", email));
            }
            if let Some(token) = token {
                query.push(("pageToken", token));
            }
            Ok(client.get("layers", &query)?)
        },
        |page| -> Result<()> {
            for entry in items(page, "layers") {
                let layer: LayerSummary = serde_json::from_value(entry.clone())?;
                if layer.datasource_type.as_deref() != Some("image") {
                    continue;
                }
                let detail = client.get(
                    &format!("layers/{}", layer.id),
                    &[("fields", "datasources")],
                )?;
                let detail: LayerDatasources = serde_json::from_value(detail)?;
                if detail.datasources.len() > 1 {
                    rows.push(MosaicRow {
                        id: layer.id,
                        name: layer.name,
                        datasource_count: detail.datasources.len(),
                    });
                }
            }
            Ok(())
        },
    )?;

    fs::write(outfile, mosaic_csv(&rows))
        .with_context(|| format!("write {}", outfile.display()))?;
    println!(
        "Wrote {} mosaic layer(s) to {}",
        rows.len(),
        outfile.display()
    );
    Ok(())
}

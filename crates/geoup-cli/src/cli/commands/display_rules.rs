//! `geoup tools display-rules` – render a layer's display rules as HTML.

use anyhow::{Context, Result};
use geoup_core::api::ApiClient;
use geoup_core::model::StyledLayer;
use geoup_core::report::display_rules_html;
use std::fs;
use std::path::Path;

pub fn run_display_rules(client: &ApiClient, layer_id: &str, outfile: &Path) -> Result<()> {
    let response = client.get(&format!("layers/{}", layer_id), &[("fields", "style")])?;
    let layer: StyledLayer = serde_json::from_value(response)?;
    let rules = layer.style.map(|s| s.display_rules).unwrap_or_default();

    let html = display_rules_html(layer_id, &rules);
    fs::write(outfile, html).with_context(|| format!("write {}", outfile.display()))?;
    println!(
        "Wrote {} display rule(s) for layer {} to {}",
        rules.len(),
        layer_id,
        outfile.display()
    );
    Ok(())
}

//! Typed models for the service API responses the tool consumes.
//!
//! Only the fields the commands actually read are modeled; list endpoints
//! are asked for exactly these fields, so everything else stays out.

use serde::Deserialize;

/// One accessible project.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Response of the projects list endpoint (not paginated).
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Asset entry from a paginated raster/asset listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Layer entry from a paginated layer listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub datasource_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Datasource {
    pub id: String,
}

/// Layer detail fetched with `fields=datasources`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDatasources {
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

/// Layer detail fetched with `fields=style`.
#[derive(Debug, Clone, Deserialize)]
pub struct StyledLayer {
    #[serde(default)]
    pub style: Option<LayerStyle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    #[serde(default)]
    pub display_rules: Vec<DisplayRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRule {
    #[serde(default)]
    pub name: String,
    pub zoom_levels: ZoomLevels,
    #[serde(default)]
    pub polygon_options: Option<PolygonOptions>,
    #[serde(default)]
    pub filters: Vec<DisplayFilter>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZoomLevels {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolygonOptions {
    pub fill: Paint,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paint {
    pub color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub opacity: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayFilter {
    pub column: String,
    pub operator: String,
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_project_list() {
        let v = json!({
            "projects": [
                {"id": "p1", "name": "Cadastre"},
                {"id": "p2", "name": "Imagery"}
            ]
        });
        let list: ProjectList = serde_json::from_value(v).unwrap();
        assert_eq!(list.projects.len(), 2);
        assert_eq!(list.projects[0].id, "p1");
        assert_eq!(list.projects[1].name, "Imagery");
    }

    #[test]
    fn parse_asset_summary_with_missing_fields() {
        let v = json!({"id": "r1"});
        let a: AssetSummary = serde_json::from_value(v).unwrap();
        assert_eq!(a.id, "r1");
        assert!(a.name.is_empty());
        assert!(a.tags.is_empty());
    }

    #[test]
    fn parse_styled_layer() {
        let v = json!({
            "style": {
                "displayRules": [{
                    "name": "Urban lots",
                    "zoomLevels": {"min": 5, "max": 17},
                    "polygonOptions": {
                        "fill": {"color": "#ff0000", "opacity": 0.25},
                        "stroke": {"color": "#000000", "opacity": 1.0, "width": 1.5}
                    },
                    "filters": [
                        {"column": "zone", "operator": "==", "value": "urban"}
                    ]
                }]
            }
        });
        let layer: StyledLayer = serde_json::from_value(v).unwrap();
        let rules = &layer.style.unwrap().display_rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "Urban lots");
        assert_eq!(rules[0].zoom_levels.min, 5);
        assert_eq!(rules[0].zoom_levels.max, 17);
        let poly = rules[0].polygon_options.as_ref().unwrap();
        assert_eq!(poly.fill.color, "#ff0000");
        assert_eq!(rules[0].filters[0].operator, "==");
    }

    #[test]
    fn parse_layer_summary_camel_case() {
        let v = json!({"id": "l1", "name": "Mosaic", "datasourceType": "image"});
        let l: LayerSummary = serde_json::from_value(v).unwrap();
        assert_eq!(l.datasource_type.as_deref(), Some("image"));
    }
}

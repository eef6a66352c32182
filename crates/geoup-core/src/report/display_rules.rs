//! HTML rendering of a layer's display rules.

use crate::model::{DisplayFilter, DisplayRule, PolygonOptions};

/// Render a layer's display rules as a small standalone HTML document.
pub fn display_rules_html(layer_id: &str, rules: &[DisplayRule]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str(&format!(
        "<title>Display rules for layer {}</title>\n",
        escape(layer_id)
    ));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!(
        "<h1>Display rules for layer {}</h1>\n",
        escape(layer_id)
    ));
    for rule in rules {
        out.push_str("<div class=\"rule\">\n");
        out.push_str(&format!("<h2>{}</h2>\n", escape(&rule.name)));
        out.push_str(&format!(
            "<p>Zoom levels: {} &ndash; {}</p>\n",
            rule.zoom_levels.min, rule.zoom_levels.max
        ));
        if let Some(poly) = &rule.polygon_options {
            out.push_str(&polygon_html(poly));
        }
        if !rule.filters.is_empty() {
            out.push_str(&format!("<p>Filters: {}</p>\n", filters_text(&rule.filters)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn polygon_html(poly: &PolygonOptions) -> String {
    format!(
        "<p>Fill: {} (opacity {:.2})<br>Stroke: {} (opacity {:.2}), width {}</p>\n",
        escape(&poly.fill.color),
        poly.fill.opacity,
        escape(&poly.stroke.color),
        poly.stroke.opacity,
        poly.stroke.width
    )
}

fn filters_text(filters: &[DisplayFilter]) -> String {
    let parts: Vec<String> = filters
        .iter()
        .map(|f| format!("{} {} {}", escape(&f.column), escape(&f.operator), f.value))
        .collect();
    parts.join(" and ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

//! Report builders for the export commands.
//!
//! Pure string builders so the commands stay thin and the formats are
//! testable without a service.

mod display_rules;
mod mosaic;

pub use display_rules::display_rules_html;
pub use mosaic::{mosaic_csv, MosaicRow};

/// One CSV line from raw fields, quoting where needed (RFC 4180 style).
pub fn csv_line(fields: &[&str]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(|c| c == ',' || c == '"' || c == '\n') {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
    out
}

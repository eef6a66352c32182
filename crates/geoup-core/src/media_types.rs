//! File-extension to media-type resolution for uploads.
//!
//! The service rejects uploads without a declared content type, so an
//! unresolvable extension is a configuration error caught before any
//! network traffic. Besides common defaults, the registry carries the
//! geospatial sidecar types the service expects (shapefile parts, JPEG
//! 2000 rasters) and accepts extra mappings from config.

use std::collections::HashMap;
use std::path::Path;

/// Extension → media type registry. Lookup is case-insensitive on the
/// extension; registration overrides built-ins.
#[derive(Debug, Clone)]
pub struct MediaTypeRegistry {
    by_extension: HashMap<String, String>,
}

impl Default for MediaTypeRegistry {
    fn default() -> Self {
        let mut r = Self {
            by_extension: HashMap::new(),
        };
        // Common defaults.
        r.register("json", "application/json");
        r.register("csv", "text/csv");
        r.register("zip", "application/zip");
        r.register("png", "image/png");
        r.register("jpg", "image/jpeg");
        r.register("jpeg", "image/jpeg");
        r.register("tif", "image/tiff");
        r.register("tiff", "image/tiff");
        r.register("kml", "application/vnd.google-earth.kml+xml");
        // Geospatial set the service expects.
        r.register("jp2", "image/jpeg");
        r.register("shp", "application/shp");
        r.register("shx", "application/shx");
        r.register("dbf", "application/dbf");
        r.register("prj", "application/prj");
        r
    }
}

impl MediaTypeRegistry {
    /// Registry with the built-in table only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping (extension without the leading dot).
    pub fn register(&mut self, extension: &str, media_type: &str) {
        self.by_extension
            .insert(extension.to_ascii_lowercase(), media_type.to_string());
    }

    /// Merge extra mappings, e.g. the `[media_types]` config table.
    pub fn register_all<'a, I>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (ext, mt) in mappings {
            self.register(ext, mt);
        }
    }

    /// Resolve the media type for an extension.
    pub fn resolve_extension(&self, extension: &str) -> Option<&str> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Resolve the media type for a file path from its extension.
    pub fn resolve_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.resolve_extension(ext)
    }
}

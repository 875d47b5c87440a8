//! XML sitemap generation.

use std::{fs, path::Path};

use thiserror::Error;
use tracing::info;

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("failed to write sitemap: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sitemap generation.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Sitemap generator.
#[derive(Debug, Clone)]
pub struct SitemapGenerator {
    domain: String,
}

impl SitemapGenerator {
    /// Create a generator for a public domain such as `https://example.com`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        let domain: String = domain.into();
        Self {
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    /// Generate the sitemap XML for site-relative paths, in the given order.
    #[must_use]
    pub fn generate<S: AsRef<str>>(&self, paths: &[S]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for path in paths {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&format!("{}{}", self.domain, path.as_ref()))
            ));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write `sitemap.xml` into a directory. Returns the number of entries.
    pub fn write<S: AsRef<str>>(&self, output_dir: &Path, paths: &[S]) -> Result<usize> {
        info!(entries = paths.len(), "generating sitemap");
        fs::write(output_dir.join("sitemap.xml"), self.generate(paths))?;
        Ok(paths.len())
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

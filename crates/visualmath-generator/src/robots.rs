//! Robots.txt generation.
//!
//! Generates the robots.txt file for search engine crawlers.

use std::{fs::File, io::Write, path::Path};

use thiserror::Error;
use tracing::info;

/// Robots generation errors.
#[derive(Debug, Error)]
pub enum RobotsError {
    /// IO error.
    #[error("failed to write robots.txt: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for robots generation.
pub type Result<T> = std::result::Result<T, RobotsError>;

/// Robots.txt generator.
#[derive(Debug, Clone)]
pub struct RobotsGenerator {
    domain: String,
}

impl RobotsGenerator {
    /// Create a new robots generator for a public domain.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        let domain: String = domain.into();
        Self {
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    /// Write robots.txt into a directory.
    pub fn generate(&self, output_dir: &Path) -> Result<()> {
        info!("generating robots.txt");

        let mut file = File::create(output_dir.join("robots.txt"))?;
        self.write_to(&mut file)?;
        Ok(())
    }

    /// Write the robots.txt body to a writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "User-agent: *")?;
        writeln!(writer, "Allow: /")?;
        writeln!(writer)?;
        writeln!(writer, "Sitemap: {}/sitemap.xml", self.domain)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_body() {
        let mut out = Vec::new();
        RobotsGenerator::new("https://example.com/")
            .write_to(&mut out)
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "User-agent: *\nAllow: /\n\nSitemap: https://example.com/sitemap.xml\n"
        );
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        RobotsGenerator::new("https://x.org").generate(dir.path()).unwrap();

        let body = std::fs::read_to_string(dir.path().join("robots.txt")).unwrap();
        assert!(body.starts_with("User-agent: *"));
    }
}

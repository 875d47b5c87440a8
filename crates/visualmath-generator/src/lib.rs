//! VisualMath Generator Library
//!
//! Static export of the lesson site.
//!
//! # Modules
//!
//! - [`template`] - HTML template system with escaping and helpers
//! - [`theme`] - Built-in templates
//! - [`route`] - Route planning and base-path handling
//! - [`html`] - Page rendering for every route kind
//! - [`sitemap`] - XML sitemap generation
//! - [`robots`] - robots.txt generation
//! - [`build`] - Export orchestration

pub mod build;
pub mod html;
pub mod robots;
pub mod route;
pub mod sitemap;
pub mod template;
pub mod theme;

pub use build::{BuildError, BuildStats, Builder, export};
pub use html::HtmlGenerator;
pub use robots::RobotsGenerator;
pub use route::{BasePath, PathResolver, ResolvedRoute, Route, StaticPage};
pub use sitemap::SitemapGenerator;
pub use template::{Helpers, Template, TemplateContext, TemplateError, TemplateRegistry};

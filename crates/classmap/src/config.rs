//! Configuration types for classmap diagram generation.
//!
//! This module provides configuration structures that control what the
//! generated diagram looks like and where sources and output live. All types
//! implement [`serde::Deserialize`] so they can be loaded from a TOML file,
//! and every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining diagram and source settings.
//! - [`DiagramConfig`] - Title, theme, direction and what to draw.
//! - [`SourceConfig`] - Default source root and output path.
//!
//! # Example
//!
//! ```
//! # use classmap::config::{AppConfig, Direction};
//! let config = AppConfig::default();
//! assert_eq!(config.diagram().title(), "classmap");
//! assert_eq!(config.diagram().direction(), Direction::LeftToRight);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Diagram configuration section.
    #[serde(default)]
    diagram: DiagramConfig,

    /// Source configuration section.
    #[serde(default)]
    source: SourceConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    ///
    /// # Arguments
    ///
    /// * `diagram` - What the generated diagram contains and how it is laid out.
    /// * `source` - Where sources are read from and the diagram is written to.
    pub fn new(diagram: DiagramConfig, source: SourceConfig) -> Self {
        Self { diagram, source }
    }

    /// Returns the diagram configuration.
    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    /// Returns the source configuration.
    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Replaces the diagram title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.diagram.title = title.into();
        self
    }
}

/// Overall direction PlantUML lays the diagram out in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl Direction {
    /// Returns the PlantUML directive for this direction.
    pub fn directive(self) -> &'static str {
        match self {
            Direction::LeftToRight => "left to right direction",
            Direction::TopToBottom => "top to bottom direction",
        }
    }
}

/// Diagram appearance configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    title: String,
    theme: Option<String>,
    direction: Direction,
    hide_empty_members: bool,
    show_members: bool,
    footer: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            title: "classmap".to_string(),
            theme: None,
            direction: Direction::default(),
            hide_empty_members: true,
            show_members: true,
            footer: true,
        }
    }
}

impl DiagramConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_members(mut self, show_members: bool) -> Self {
        self.show_members = show_members;
        self
    }

    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Returns the title shown above the diagram.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the PlantUML theme, if one is configured.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if `hide empty members` is written to the header.
    pub fn hide_empty_members(&self) -> bool {
        self.hide_empty_members
    }

    /// Returns `true` if fields, components and constants are drawn.
    pub fn show_members(&self) -> bool {
        self.show_members
    }

    pub fn footer(&self) -> bool {
        self.footer
    }
}

/// Source and output locations.
///
/// Relative paths are resolved against the working directory by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    root: PathBuf,
    output: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src/main/java"),
            output: PathBuf::from("docs/diagrams/src/class-diagram.puml"),
        }
    }
}

impl SourceConfig {
    /// Creates a new [`SourceConfig`].
    ///
    /// # Arguments
    ///
    /// * `root` - Directory scanned for `.java` files.
    /// * `output` - File the diagram is written to.
    pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        let diagram = config.diagram();

        assert_eq!(diagram.title(), "classmap");
        assert_eq!(diagram.theme(), None);
        assert!(diagram.hide_empty_members());
        assert!(diagram.show_members());
        assert!(diagram.footer());
        assert_eq!(config.source().root(), Path::new("src/main/java"));
        assert_eq!(
            config.source().output(),
            Path::new("docs/diagrams/src/class-diagram.puml")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [diagram]
            title = "Shop"
            theme = "blueprint"
            direction = "top-to-bottom"
            "#,
        )
        .unwrap();

        assert_eq!(config.diagram().title(), "Shop");
        assert_eq!(config.diagram().theme(), Some("blueprint"));
        assert_eq!(config.diagram().direction(), Direction::TopToBottom);
        assert!(config.diagram().show_members());
        assert_eq!(config.source().root(), Path::new("src/main/java"));
    }

    #[test]
    fn test_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.diagram().title(), "classmap");
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[diagram]\ndirection = \"diagonal\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_title_override() {
        let config = AppConfig::default().with_title("Billing");
        assert_eq!(config.diagram().title(), "Billing");
        assert_eq!(Direction::TopToBottom.directive(), "top to bottom direction");
    }
}

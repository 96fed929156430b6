//! Template loading and per-target rendering

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::ConfigurationError;
use crate::metrics::RenderMetrics;
use crate::target::Target;

use super::engine;
use super::types::{Parameters, RenderResult, TARGET_PARAMETER};

/// Renders one template, once per target.
///
/// The template is read once at construction. Relative includes resolve
/// against the template's own directory, which is held here instead of
/// being installed as the process working directory.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    path: PathBuf,
    base_dir: PathBuf,
    source: String,
}

impl TemplateRenderer {
    /// Load the template at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let requested = path.as_ref();
        let path = fs::canonicalize(requested).map_err(|source| ConfigurationError::Template {
            path: requested.to_path_buf(),
            source,
        })?;
        let source = fs::read_to_string(&path).map_err(|source| ConfigurationError::Template {
            path: path.clone(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        tracing::info!(
            path = %path.display(),
            base_dir = %base_dir.display(),
            "Loaded template"
        );

        Ok(Self {
            path,
            base_dir,
            source,
        })
    }

    /// Build a renderer from an in-memory template
    pub fn from_source(
        path: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            base_dir: base_dir.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the template for `target`.
    ///
    /// The unset target passes no `target` parameter at all.
    pub fn render(&self, target: &Target) -> RenderResult<String> {
        let started = Instant::now();
        let parameters = parameters_for(target);
        let result = engine::expand(&self.source, &self.path, &self.base_dir, &parameters);
        RenderMetrics::record_duration(started.elapsed());
        result
    }
}

/// Engine parameters for a target
pub fn parameters_for(target: &Target) -> Parameters {
    let mut parameters = Parameters::new();
    if let Some(value) = target.value() {
        parameters.insert(TARGET_PARAMETER.to_string(), value.to_string());
    }
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RenderError;

    const TEMPLATE: &str = r#"<robot xmlns:xacro="http://www.ros.org/wiki/xacro" name="bot">
  <xacro:arg name="target" default="full"/>
  <link name="$(arg target)"/>
</robot>"#;

    #[test]
    fn test_unset_target_passes_no_parameter() {
        assert!(parameters_for(&Target::Unset).is_empty());
    }

    #[test]
    fn test_named_target_passes_single_parameter() {
        let parameters = parameters_for(&Target::named("left_arm"));
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters.get("target").map(String::as_str), Some("left_arm"));
    }

    #[test]
    fn test_render_per_target() {
        let renderer = TemplateRenderer::from_source("bot.xacro", ".", TEMPLATE);

        let unset = renderer.render(&Target::Unset).unwrap();
        assert!(unset.contains(r#"<link name="full"/>"#));

        let arm = renderer.render(&Target::named("arm")).unwrap();
        assert!(arm.contains(r#"<link name="arm"/>"#));
    }

    #[test]
    fn test_render_malformed_template() {
        let renderer = TemplateRenderer::from_source("bad.xacro", ".", "<robot><link></robot>");
        let err = renderer.render(&Target::Unset).unwrap_err();
        assert!(matches!(err, RenderError::Malformed { .. }));
    }

    #[test]
    fn test_load_resolves_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("urdf")).unwrap();
        let file = dir.path().join("urdf/bot.xacro");
        fs::write(&file, TEMPLATE).unwrap();

        let renderer = TemplateRenderer::load(&file).unwrap();
        let expected = fs::canonicalize(dir.path().join("urdf")).unwrap();
        assert_eq!(renderer.base_dir, expected);
        assert!(renderer.render(&Target::Unset).is_ok());
    }

    #[test]
    fn test_load_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateRenderer::load(dir.path().join("missing.xacro")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Template { .. }));
    }
}

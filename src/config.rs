use crate::error::Result;
use crate::links::LinkConfig;
use crate::render::RenderSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_PIPELINE_ENDPOINT: &str = "http://127.0.0.1:5000/run-pipeline";

/// External command behind the `/run-pipeline` route
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PipelineCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the command runs in; the server's current directory if unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Settings for the viewer server and CLI
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// {
///   "bind": "0.0.0.0:8080",
///   "links": { "local_prefix": "D:\\work\\" },
///   "pipeline_command": { "program": "python", "args": ["generate_crr_report.py"] }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub bind: String,
    pub links: LinkConfig,
    pub collapse_after: usize,
    pub pipeline_endpoint: String,
    pub pipeline_command: Option<PipelineCommand>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let render = RenderSettings::default();
        ViewerConfig {
            bind: DEFAULT_BIND.to_string(),
            links: render.links,
            collapse_after: render.collapse_after,
            pipeline_endpoint: DEFAULT_PIPELINE_ENDPOINT.to_string(),
            pipeline_command: None,
        }
    }
}

impl ViewerConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            links: self.links.clone(),
            collapse_after: self.collapse_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "bind": "0.0.0.0:8080", "collapse_after": 120 }"#).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.collapse_after, 120);
        assert_eq!(config.pipeline_endpoint, DEFAULT_PIPELINE_ENDPOINT);
        assert_eq!(config.links, LinkConfig::default());
        assert!(config.pipeline_command.is_none());
    }

    #[test]
    fn pipeline_command_args_are_optional() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "pipeline_command": { "program": "./run.sh" } }"#).unwrap();
        let command = config.pipeline_command.unwrap();
        assert_eq!(command.program, "./run.sh");
        assert!(command.args.is_empty());
        assert!(command.working_dir.is_none());
    }
}

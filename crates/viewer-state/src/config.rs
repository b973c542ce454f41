//! Configuration for the viewer controller.

use std::path::Path;

use om_reader::BackendConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::state::AxisRoles;

/// Configuration for the viewer controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Axis roles used by a fresh (or reset) state.
    #[serde(default)]
    pub axis_roles: AxisRoles,

    /// Plot type in the published payload.
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Colorscale in the published payload.
    #[serde(default = "default_colorscale")]
    pub colorscale: String,

    /// Backend options.
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_kind() -> String {
    "heatmap".to_string()
}

fn default_colorscale() -> String {
    "Viridis".to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            axis_roles: AxisRoles::default(),
            kind: default_kind(),
            colorscale: default_colorscale(),
            backend: BackendConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            backend: BackendConfig::from_env(),
            ..Default::default()
        };

        if let Some(axis) = env_axis("OM_TIME_AXIS") {
            config.axis_roles.time = axis;
        }
        if let Some(axis) = env_axis("OM_ROW_AXIS") {
            config.axis_roles.row = axis;
        }
        if let Some(axis) = env_axis("OM_COL_AXIS") {
            config.axis_roles.col = axis;
        }
        if let Ok(val) = std::env::var("OM_COLORSCALE") {
            config.colorscale = val;
        }

        config
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> ViewerResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate().map_err(ViewerError::Config)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.axis_roles.is_distinct() {
            return Err(format!(
                "axis roles must be distinct: time={}, row={}, col={}",
                self.axis_roles.time, self.axis_roles.row, self.axis_roles.col
            ));
        }
        if self.kind.is_empty() {
            return Err("plot kind must not be empty".to_string());
        }
        self.backend.validate()
    }
}

fn env_axis(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

use serde::{Deserialize, Serialize};
use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;

/// 编辑器配置
/// 所有字段都有默认值，YAML 中只需写需要覆盖的部分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub api_base_url: String,
    /// Model label sent with every node creation request
    pub ai_model: String,
    pub temperature: f64,
    pub node_width: f64,
    pub node_height: f64,
    /// Vertical gap between ranks
    pub rank_sep: f64,
    /// Horizontal gap between siblings in the same rank
    pub node_sep: f64,
    pub max_jitter: f64,
    /// Where a new node lands relative to its parent before layout runs
    pub insert_offset: (f64, f64),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            ai_model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            node_width: 250.0,
            node_height: 80.0,
            rank_sep: 100.0,
            node_sep: 50.0,
            max_jitter: 0.001,
            insert_offset: (200.0, 100.0),
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EditorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file from {}", path.display()))?;

    let config: EditorConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to deserialize config from {}", path.display()))?;

    Ok(config)
}

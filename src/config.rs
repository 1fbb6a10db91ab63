use serde::Deserialize;

use surveyor_markers::DEFAULT_MARKER_RANGE;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SurveyorConfig {
    #[serde(default)] pub markers: MarkerConfig,
    #[serde(default)] pub zone: ZoneConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MarkerConfig {
    #[serde(default = "default_range")] pub range: i32,
    #[serde(default = "default_powered")] pub powered_on_place: bool,
}
fn default_range() -> i32 { DEFAULT_MARKER_RANGE }
fn default_powered() -> bool { false }
impl Default for MarkerConfig { fn default() -> Self { Self { range: default_range(), powered_on_place: default_powered() } } }

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ZoneConfig {
    #[serde(default = "default_seed")] pub seed: u64,
    #[serde(default = "default_samples")] pub samples: usize,
}
fn default_seed() -> u64 { 0x5eed }
fn default_samples() -> usize { 4 }
impl Default for ZoneConfig { fn default() -> Self { Self { seed: default_seed(), samples: default_samples() } } }

impl Default for SurveyorConfig {
    fn default() -> Self {
        Self { markers: MarkerConfig::default(), zone: ZoneConfig::default() }
    }
}

impl SurveyorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        let cfg: SurveyorConfig = toml::from_str(s).map_err(|e| format!("parse error: {}", e))?;
        if cfg.markers.range <= 0 {
            return Err(format!("markers.range must be positive, got {}", cfg.markers.range));
        }
        Ok(cfg)
    }
}

pub fn load_config_from_path(path: &std::path::Path) -> Result<SurveyorConfig, String> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("read error: {}", e))?;
    SurveyorConfig::from_toml_str(&s)
}

use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "KISS_SURFACE_CONFIG";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub angle_step_deg: f32,
    pub depth_steps: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            angle_step_deg: 0.5,
            depth_steps: 500,
        }
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OrbiterConfig {
    pub radius: f32,
    pub angle_step: f32,
}

impl Default for OrbiterConfig {
    fn default() -> Self {
        Self {
            radius: 0.1,
            angle_step: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub title: String,
    pub size: [u32; 2],
    pub surface: SurfaceConfig,
    pub orbiter: OrbiterConfig,
    pub textured: bool,
    pub animate_light: bool,
    pub orbit_step: f32,
    pub light_offset: [f32; 3],
    pub scale: f32,
    pub texture_path: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Kiss Surface".to_string(),
            size: [800, 800],
            surface: SurfaceConfig::default(),
            orbiter: OrbiterConfig::default(),
            textured: true,
            animate_light: true,
            orbit_step: 0.01,
            light_offset: [0.0, 0.0, 0.0],
            scale: 0.0,
            texture_path: None,
        }
    }
}

impl DemoConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Reads the file named by `KISS_SURFACE_CONFIG`, or falls back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("Loading config from {}", path);
                Self::load_from_file(&path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.surface.angle_step_deg > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "surface.angle_step_deg must be positive, got {}",
                self.surface.angle_step_deg
            )));
        }
        if self.surface.depth_steps == 0 {
            return Err(ConfigError::Invalid("surface.depth_steps must be at least 1".to_string()));
        }
        if !(self.orbiter.radius > 0.0) || !(self.orbiter.angle_step > 0.0) {
            return Err(ConfigError::Invalid(
                "orbiter.radius and orbiter.angle_step must be positive".to_string(),
            ));
        }
        if !(self.orbit_step > 0.0 && self.orbit_step <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "orbit_step must be in (0, 1], got {}",
                self.orbit_step
            )));
        }
        if self.size[0] == 0 || self.size[1] == 0 {
            return Err(ConfigError::Invalid("size must be non-zero".to_string()));
        }
        Ok(())
    }
}

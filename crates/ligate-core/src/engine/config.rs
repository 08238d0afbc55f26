use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// How the gap between two fused anchors is derived from the two ports'
/// separation settings.
///
/// The additive convention splits the configured bond gap symmetrically
/// between the two fragments' local conventions and is the default; the
/// alternatives exist for fragment libraries that put the full gap on one
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    #[default]
    Additive,
    TargetOnly,
    Mean,
}

impl GapPolicy {
    pub fn gap(&self, target_separation: f64, moving_separation: f64) -> f64 {
        match self {
            GapPolicy::Additive => target_separation + moving_separation,
            GapPolicy::TargetOnly => target_separation,
            GapPolicy::Mean => (target_separation + moving_separation) / 2.0,
        }
    }
}

fn default_unit_top_port() -> String {
    "up".to_string()
}

fn default_unit_bottom_port() -> String {
    "down".to_string()
}

fn default_cap_port() -> String {
    "cap".to_string()
}

/// Recipe for a capped linear chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Number of repeat units; must be at least 1.
    pub chain_length: usize,
    /// Registered name of the repeat-unit fragment.
    pub unit: String,
    /// Registered name of the capping fragment (used on both ends).
    pub cap: String,
    /// Port on a fresh unit that fuses toward the already-built chain.
    #[serde(default = "default_unit_top_port")]
    pub unit_top_port: String,
    /// Port on a fused unit that the next unit fuses onto.
    #[serde(default = "default_unit_bottom_port")]
    pub unit_bottom_port: String,
    /// The single port on a cap fragment.
    #[serde(default = "default_cap_port")]
    pub cap_port: String,
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

#[derive(Default)]
pub struct ChainConfigBuilder {
    chain_length: Option<usize>,
    unit: Option<String>,
    cap: Option<String>,
    unit_top_port: Option<String>,
    unit_bottom_port: Option<String>,
    cap_port: Option<String>,
    gap_policy: Option<GapPolicy>,
}

impl ChainConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_length(mut self, length: usize) -> Self {
        self.chain_length = Some(length);
        self
    }
    pub fn unit(mut self, name: &str) -> Self {
        self.unit = Some(name.to_string());
        self
    }
    pub fn cap(mut self, name: &str) -> Self {
        self.cap = Some(name.to_string());
        self
    }
    pub fn unit_top_port(mut self, label: &str) -> Self {
        self.unit_top_port = Some(label.to_string());
        self
    }
    pub fn unit_bottom_port(mut self, label: &str) -> Self {
        self.unit_bottom_port = Some(label.to_string());
        self
    }
    pub fn cap_port(mut self, label: &str) -> Self {
        self.cap_port = Some(label.to_string());
        self
    }
    pub fn gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<ChainConfig, ConfigError> {
        Ok(ChainConfig {
            chain_length: self
                .chain_length
                .ok_or(ConfigError::MissingParameter("chain_length"))?,
            unit: self.unit.ok_or(ConfigError::MissingParameter("unit"))?,
            cap: self.cap.ok_or(ConfigError::MissingParameter("cap"))?,
            unit_top_port: self.unit_top_port.unwrap_or_else(default_unit_top_port),
            unit_bottom_port: self
                .unit_bottom_port
                .unwrap_or_else(default_unit_bottom_port),
            cap_port: self.cap_port.unwrap_or_else(default_cap_port),
            gap_policy: self.gap_policy.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_port_defaults() {
        let config = ChainConfigBuilder::new()
            .chain_length(4)
            .unit("methylene")
            .cap("hydrogen")
            .build()
            .unwrap();

        assert_eq!(config.chain_length, 4);
        assert_eq!(config.unit_top_port, "up");
        assert_eq!(config.unit_bottom_port, "down");
        assert_eq!(config.cap_port, "cap");
        assert_eq!(config.gap_policy, GapPolicy::Additive);
    }

    #[test]
    fn builder_reports_first_missing_parameter() {
        let err = ChainConfigBuilder::new().unit("methylene").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("chain_length"));

        let err = ChainConfigBuilder::new().chain_length(2).build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("unit"));
    }

    #[test]
    fn gap_policy_math() {
        assert_eq!(GapPolicy::Additive.gap(0.7, 0.5), 1.2);
        assert_eq!(GapPolicy::TargetOnly.gap(0.7, 0.5), 0.7);
        assert_eq!(GapPolicy::Mean.gap(0.7, 0.5), 0.6);
    }

    #[test]
    fn config_deserializes_from_toml_with_defaults() {
        let config: ChainConfig = toml::from_str(
            r#"
                chain_length = 6
                unit = "methylene"
                cap = "hydrogen"
                gap_policy = "target_only"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_length, 6);
        assert_eq!(config.gap_policy, GapPolicy::TargetOnly);
        assert_eq!(config.unit_top_port, "up");
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let result: Result<ChainConfig, _> = toml::from_str(
            r#"
                chain_length = 6
                unit = "methylene"
                cap = "hydrogen"
                ring_closure = true
            "#,
        );
        assert!(result.is_err());
    }
}

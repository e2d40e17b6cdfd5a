//! The declarative configuration document (`spec.md` §6): `context_cfg`
//! (re-exported from [`crate::net`] as [`ContextConfig`]), `sim_cfg`, and
//! `plot_cfg`.

use std::path::Path;

use crate::fmu::ParamSchedule;
use crate::net::ContextConfig;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ModeConfig {
    pub fmu: std::path::PathBuf,
    pub outputs: Vec<String>,
    #[serde(default)]
    pub parameters: ParamSchedule,
    pub stop_condition: String,
}

/// One entry of `sim_cfg.variable_mapping`: `(src_mode, src_var) →
/// (tgt_mode, tgt_var)`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VariableMappingEntry {
    pub src_mode: String,
    pub src_var: String,
    pub tgt_mode: String,
    pub tgt_var: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SimConfig {
    pub initial_time: f64,
    pub stop_time: f64,
    pub step_size: f64,
    /// Declaration order, preserved as a `Vec` rather than a map — not
    /// load-bearing for determinism the way `context_cfg` is, but kept
    /// consistent with the rest of the schema.
    pub modes: Vec<(String, ModeConfig)>,
    #[serde(default)]
    pub variable_mapping: Vec<VariableMappingEntry>,
}

/// `plot_cfg` (`spec.md` §6): the engine only consumes the set of context
/// names it names, to know which token series to log — chart layout itself
/// is the excluded plotting collaborator's concern.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Aggregated parent name → its child context names, both tracked.
    #[serde(default)]
    pub context_groups: Vec<(String, Vec<String>)>,
}

impl PlotConfig {
    /// Every context name whose token series the engine should record, in
    /// declaration order with duplicates removed.
    pub fn tracked_contexts(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut push_unique = |n: &String, names: &mut Vec<String>| {
            if !names.contains(n) {
                names.push(n.clone());
            }
        };
        for name in &self.contexts {
            push_unique(name, &mut names);
        }
        for (parent, children) in &self.context_groups {
            push_unique(parent, &mut names);
            for child in children {
                push_unique(child, &mut names);
            }
        }
        names
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub context_cfg: ContextConfig,
    pub sim_cfg: SimConfig,
    #[serde(default)]
    pub plot_cfg: PlotConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing guard for context `{0}` (both Activate_{0} and Deactivate_{0} must be declared)")]
    MissingGuard(String),

    #[error("mode `{0}` is not declared as a place in context_cfg.places")]
    ModeNotAPlace(String),

    #[error("variable_mapping references unknown mode `{0}`")]
    UnknownMappingMode(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Config {
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// `ConfigError`'s three declarative checks (`spec.md` §7): every
    /// declared context has both guards, every mode names a declared
    /// place, every `variable_mapping` entry names a declared mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_guard = |transition: &str| {
            self.context_cfg
                .guards
                .iter()
                .any(|g| g.transition == transition)
        };
        for place in &self.context_cfg.places {
            if !has_guard(&format!("Activate_{}", place.name))
                || !has_guard(&format!("Deactivate_{}", place.name))
            {
                return Err(ConfigError::MissingGuard(place.name.clone()));
            }
        }

        let is_place = |name: &str| self.context_cfg.places.iter().any(|p| p.name == name);
        for (mode_name, _) in &self.sim_cfg.modes {
            if !is_place(mode_name) {
                return Err(ConfigError::ModeNotAPlace(mode_name.clone()));
            }
        }

        let is_mode = |name: &str| self.sim_cfg.modes.iter().any(|(n, _)| n == name);
        for mapping in &self.sim_cfg.variable_mapping {
            if !is_mode(&mapping.src_mode) {
                return Err(ConfigError::UnknownMappingMode(mapping.src_mode.clone()));
            }
            if !is_mode(&mapping.tgt_mode) {
                return Err(ConfigError::UnknownMappingMode(mapping.tgt_mode.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> &'static str {
        r#"{
            "context_cfg": {
                "places": [{"name": "Mode1", "initial": 1}],
                "globals": ["x"],
                "guards": [
                    {"transition": "Activate_Mode1", "expr": "x < 0"},
                    {"transition": "Deactivate_Mode1", "expr": "x >= 0"}
                ]
            },
            "sim_cfg": {
                "initial_time": 0.0,
                "stop_time": 1.0,
                "step_size": 0.1,
                "modes": [["Mode1", {"fmu": "a.fmu", "outputs": ["y"], "stop_condition": "x >= 1"}]]
            }
        }"#
    }

    #[test]
    fn parses_minimal_document() {
        let config = Config::from_reader(minimal_json().as_bytes()).unwrap();
        assert_eq!(config.sim_cfg.modes.len(), 1);
        assert_eq!(config.sim_cfg.modes[0].0, "Mode1");
    }

    #[test]
    fn rejects_mode_not_declared_as_place() {
        let mut config = Config::from_reader(minimal_json().as_bytes()).unwrap();
        config.sim_cfg.modes.push((
            "Ghost".into(),
            ModeConfig {
                fmu: "b.fmu".into(),
                outputs: vec![],
                parameters: Default::default(),
                stop_condition: "x >= 1".into(),
            },
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ModeNotAPlace(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn rejects_missing_guard() {
        let mut config = Config::from_reader(minimal_json().as_bytes()).unwrap();
        config.context_cfg.guards.pop();
        assert!(matches!(config.validate(), Err(ConfigError::MissingGuard(_))));
    }

    #[test]
    fn tracked_contexts_dedupes_and_includes_group_children() {
        let plot = PlotConfig {
            contexts: vec!["A".into()],
            context_groups: vec![("Group".into(), vec!["A".into(), "B".into()])],
        };
        assert_eq!(plot.tracked_contexts(), vec!["A", "Group", "B"]);
    }
}

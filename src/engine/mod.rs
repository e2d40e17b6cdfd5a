//! The Simulation Engine: outer mode-switch loop, inner stepping loop,
//! state handover, progress watchdog (`spec.md` §4.4).

mod error;
mod logger;

pub use error::{EngineError, Invariant};
pub use logger::Logger;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::fmu::{CoSimulationBinding, FmuAdapter, ParamSchedule};
use crate::guard::{self, Env, Expr};
use crate::net::{Net, NetBuilder};

/// Bound on the outer mode-switch loop (`spec.md` §4.4).
pub const MAX_OUTER_ITER: u32 = 5_000_000;
/// Consecutive no-progress inner iterations that trigger `StuckSimulation`.
pub const STUCK_LIMIT: u32 = 1;

/// Opens the FMU for one mode, returning its variable table and a live
/// binding. Takes the place of `fmu-schema`/`fmi-abi`-backed extraction in
/// tests (see `fixtures::MockSlave`); `modalsim-cli` supplies one backed by
/// `crate::fmu::DynamicSlave::open`.
pub type FmuOpener = Box<
    dyn FnMut(
        &std::path::Path,
        &str,
    ) -> Result<(fmu_schema::VariableTable, Box<dyn CoSimulationBinding>), crate::fmu::FmuError>,
>;

#[derive(Debug, Clone)]
struct CompiledMode {
    fmu: PathBuf,
    outputs: Vec<String>,
    parameters: ParamSchedule,
    stop_condition: Arc<Expr>,
}

/// Couples the [`Net`] to FMU instances and drives simulated time forward.
pub struct Engine {
    net: Net,
    env: Env,
    modes: Vec<(String, CompiledMode)>,
    variable_mapping: Vec<crate::config::VariableMappingEntry>,
    t: f64,
    stop_time: f64,
    step_size: f64,
    tracked_contexts: Vec<String>,
    prev: HashMap<(String, String), f64>,
    prev_mode: Option<String>,
    last_logged_mode: Option<String>,
    logger: Logger,
    fmu_opener: FmuOpener,
}

impl Engine {
    pub fn new(config: &Config, fmu_opener: FmuOpener) -> Result<Self, EngineError> {
        config.validate()?;
        let net = NetBuilder::build(&config.context_cfg)?;

        let mut env = Env::new();
        for name in net.globals() {
            env.insert(name.clone(), 0.0);
        }

        let mut modes = Vec::with_capacity(config.sim_cfg.modes.len());
        for (name, mode_config) in &config.sim_cfg.modes {
            let stop_condition = Arc::new(guard::parse(&mode_config.stop_condition)?);
            modes.push((
                name.clone(),
                CompiledMode {
                    fmu: mode_config.fmu.clone(),
                    outputs: mode_config.outputs.clone(),
                    parameters: mode_config.parameters.clone(),
                    stop_condition,
                },
            ));
        }

        Ok(Self {
            net,
            env,
            modes,
            variable_mapping: config.sim_cfg.variable_mapping.clone(),
            t: config.sim_cfg.initial_time,
            stop_time: config.sim_cfg.stop_time,
            step_size: config.sim_cfg.step_size,
            tracked_contexts: config.plot_cfg.tracked_contexts(),
            prev: HashMap::new(),
            prev_mode: None,
            last_logged_mode: None,
            logger: Logger::new(),
            fmu_opener,
        })
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Run the outer loop to completion: no active mode, `MAX_OUTER_ITER`
    /// reached (treated as a stuck simulation, since nothing else in the
    /// contract distinguishes the two at this granularity), or a
    /// propagated fatal error.
    pub fn run(&mut self) -> Result<(), EngineError> {
        for _ in 0..MAX_OUTER_ITER {
            let Some(mode_name) = self.pick_mode()? else {
                return Ok(());
            };

            if self.last_logged_mode.as_deref() != Some(mode_name.as_str()) {
                self.logger.log_mode(self.t, &mode_name);
                self.last_logged_mode = Some(mode_name.clone());
            }

            let mode = self
                .modes
                .iter()
                .find(|(name, _)| name == &mode_name)
                .map(|(_, m)| m.clone())
                .expect("pick_mode only returns declared modes");

            if self.eval_stop_condition(&mode.stop_condition) {
                // Early stop (spec.md §4.4 step 3, scenario 6): never
                // instantiate, but still try to move the CPN past this
                // mode using the environment as it already stands.
                let outcome = self.net.fire_to_quiescence(&self.env)?;
                if outcome.oscillation {
                    log::warn!(
                        "oscillation warning while attempting to leave `{mode_name}` at entry-time stop"
                    );
                }
                continue;
            }

            self.run_mode(&mode_name, &mode)?;
        }
        Err(EngineError::StuckSimulation(MAX_OUTER_ITER))
    }

    fn pick_mode(&self) -> Result<Option<String>, EngineError> {
        let mut active = self
            .modes
            .iter()
            .filter(|(name, _)| self.net.token_count(name).unwrap_or(0) >= 1)
            .map(|(name, _)| name.clone());
        let first = active.next();
        if active.next().is_some() {
            return Err(EngineError::InvariantViolation(Invariant::I1));
        }
        Ok(first)
    }

    fn eval_stop_condition(&self, expr: &Expr) -> bool {
        match guard::eval(expr, &self.env) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("stop_condition evaluation failed, treating as false: {err}");
                false
            }
        }
    }

    /// Find the canonical `(mode, var)` key that feeds `local_name` in
    /// `next_mode`, following a matching `variable_mapping` entry if one
    /// exists, else falling back to same-name lookup under `prev_mode`
    /// (`spec.md` §4.4's handover contract, resolved at write-time per the
    /// Open Question in §9 — see `DESIGN.md`).
    fn resolve_handover_key(&self, prev_mode: &str, next_mode: &str, local_name: &str) -> (String, String) {
        for mapping in &self.variable_mapping {
            if mapping.src_mode == prev_mode
                && mapping.tgt_mode == next_mode
                && mapping.tgt_var == local_name
            {
                return (prev_mode.to_string(), mapping.src_var.clone());
            }
        }
        (prev_mode.to_string(), local_name.to_string())
    }

    fn run_mode(&mut self, mode_name: &str, mode: &CompiledMode) -> Result<(), EngineError> {
        let (variables, binding) = (self.fmu_opener)(&mode.fmu, mode_name)?;
        let mut adapter = FmuAdapter::new(mode_name, variables, binding);

        if let Some(prev_mode) = self.prev_mode.clone() {
            for name in &mode.outputs {
                let key = self.resolve_handover_key(&prev_mode, mode_name, name);
                if let Some(&value) = self.prev.get(&key) {
                    adapter.write(name, value)?;
                }
            }
        }

        adapter.initialize(self.t, self.stop_time)?;

        let mut last_outputs: HashMap<String, f64> = HashMap::new();
        let mut stuck_count = 0u32;
        let mut watch_env = self.env.clone();
        let mut watch_tokens = self.net.token_snapshot();
        let mut watch_t = self.t;

        while self.t < self.stop_time && !self.eval_stop_condition(&mode.stop_condition) {
            for (param_name, schedule) in &mode.parameters {
                let net = &self.net;
                let value = schedule.resolve(|ctx| net.token_count(ctx).unwrap_or(0) >= 1);
                adapter.write(param_name, value)?;
            }

            let h = self.step_size.min(self.stop_time - self.t);
            if h <= 0.0 {
                // A non-positive step can never advance `t`, so the
                // watchdog below would never get a chance to run — fail
                // the same way it would on its first comparison.
                adapter.close();
                return Err(EngineError::StuckSimulation(1));
            }
            adapter.step(self.t, h)?;
            let t_new = self.t + h;

            let values = adapter.read(&mode.outputs)?;
            for (name, value) in mode.outputs.iter().zip(values.into_iter()) {
                self.env.insert(name.clone(), value);
                self.logger.log_value(t_new, name, value);
                last_outputs.insert(name.clone(), value);
            }

            for ctx in &self.tracked_contexts {
                let tokens = self.net.token_count(ctx).unwrap_or(0);
                self.logger.log_value(t_new, ctx, tokens as f64);
            }

            let outcome = self.net.fire_to_quiescence(&self.env)?;
            if outcome.oscillation {
                log::warn!("oscillation warning in mode `{mode_name}` at t={t_new}");
            }

            self.t = t_new;

            let tokens_now = self.net.token_snapshot();
            if self.env == watch_env && tokens_now == watch_tokens && self.t == watch_t {
                stuck_count += 1;
                if stuck_count >= STUCK_LIMIT {
                    adapter.close();
                    return Err(EngineError::StuckSimulation(stuck_count));
                }
            } else {
                stuck_count = 0;
            }
            watch_env = self.env.clone();
            watch_tokens = tokens_now;
            watch_t = self.t;
        }

        for (name, value) in &last_outputs {
            self.prev.insert((mode_name.to_string(), name.clone()), *value);
        }
        self.prev_mode = Some(mode_name.to_string());

        adapter.close();
        Ok(())
    }
}

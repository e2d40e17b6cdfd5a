use super::error::FmuError;

/// The minimal contract the core needs over one FMI 2.0/3.0 co-simulation
/// instance, already instantiated (`spec.md` §4.2). Archive extraction,
/// model-description parsing, and slave instantiation all happen before a
/// `CoSimulationBinding` exists — see `fmu::dynamic::DynamicSlave::open`
/// for the real backend and `fixtures::MockSlave` for the test backend.
///
/// `doStep` is treated as an opaque, blocking advancement; the binding
/// does not retain per-step history, matching the adapter's "thin shim"
/// design note.
pub trait CoSimulationBinding {
    /// Enter then exit FMI initialization mode with the given start/stop
    /// times. Must be called exactly once, after any pre-init parameter
    /// writes.
    fn initialize(&mut self, start_time: f64, stop_time: f64) -> Result<(), FmuError>;

    /// Set a scalar real by value reference.
    fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError>;

    /// Get a scalar real by value reference.
    fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError>;

    /// Advance the slave by `step_size` seconds from `current_time`.
    fn do_step(&mut self, current_time: f64, step_size: f64) -> Result<(), FmuError>;

    /// Terminate and free the underlying instance. Idempotent: may be
    /// called more than once (the adapter guarantees it is called on every
    /// exit path, including error paths).
    fn close(&mut self);
}

/// Lets a boxed trait object stand in for `S: CoSimulationBinding` directly,
/// so `FmuOpener` implementations can return `Box<dyn CoSimulationBinding>`
/// and hand it straight to `FmuAdapter::new`.
impl CoSimulationBinding for Box<dyn CoSimulationBinding> {
    fn initialize(&mut self, start_time: f64, stop_time: f64) -> Result<(), FmuError> {
        (**self).initialize(start_time, stop_time)
    }

    fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError> {
        (**self).set_real(value_reference, value)
    }

    fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError> {
        (**self).get_real(value_reference)
    }

    fn do_step(&mut self, current_time: f64, step_size: f64) -> Result<(), FmuError> {
        (**self).do_step(current_time, step_size)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

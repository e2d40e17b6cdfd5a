//! In-process test doubles standing in for a real FMI shared library, plus
//! small configuration-document builders for `modalsim`'s scenario tests.
//!
//! A [`MockSlave`] is a `CoSimulationBinding` whose `doStep` runs a
//! caller-supplied closure over a register bank, instead of calling into a
//! shared library — the role the teacher's reference-FMU downloader played
//! for its own test suite, without the network dependency.

use std::collections::HashMap;

use modalsim::fmu::{CoSimulationBinding, FmuError};

/// An in-process co-simulation slave. `step_fn` receives the current time,
/// the step size, and a mutable view of the value-reference register bank
/// — it plays the role an FMU's internal solver would.
pub struct MockSlave {
    registers: HashMap<u32, f64>,
    step_fn: Box<dyn FnMut(f64, f64, &mut HashMap<u32, f64>)>,
}

impl MockSlave {
    pub fn new(step_fn: impl FnMut(f64, f64, &mut HashMap<u32, f64>) + 'static) -> Self {
        Self {
            registers: HashMap::new(),
            step_fn: Box::new(step_fn),
        }
    }

    /// A slave whose registers never change on their own — useful for
    /// modes whose outputs are driven entirely by parameter writes.
    pub fn idle() -> Self {
        Self::new(|_, _, _| {})
    }

    /// Seed a register before `initialize` — e.g. to hand a mode its
    /// opening state without going through `CoSimulationBinding::set_real`.
    pub fn with_initial(mut self, value_reference: u32, value: f64) -> Self {
        self.registers.insert(value_reference, value);
        self
    }
}

impl CoSimulationBinding for MockSlave {
    fn initialize(&mut self, _start_time: f64, _stop_time: f64) -> Result<(), FmuError> {
        Ok(())
    }

    fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError> {
        self.registers.insert(value_reference, value);
        Ok(())
    }

    fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError> {
        Ok(*self.registers.get(&value_reference).unwrap_or(&0.0))
    }

    fn do_step(&mut self, current_time: f64, step_size: f64) -> Result<(), FmuError> {
        (self.step_fn)(current_time, step_size, &mut self.registers);
        Ok(())
    }

    fn close(&mut self) {}
}

/// Build a [`fmu_schema::VariableTable`] from `(name, value_reference)`
/// pairs, the way a real `modelDescription.xml` parse would, without
/// needing an actual FMU archive on disk.
pub fn variable_table(entries: &[(&str, u32)]) -> fmu_schema::VariableTable {
    let mut table = fmu_schema::VariableTable::default();
    for (name, vr) in entries {
        table.insert(*name, *vr);
    }
    table
}

use fmu_schema::VariableTable;

use super::binding::CoSimulationBinding;
use super::error::FmuError;

/// A scoped handle over one FMU co-simulation instance (`spec.md` §4.2).
///
/// Lives from mode entry to mode exit. `close()` is idempotent and runs on
/// every control-flow exit via `Drop`, including error paths — the
/// "scoped acquisition with guaranteed release" design note.
pub struct FmuAdapter<S: CoSimulationBinding> {
    mode_name: String,
    variables: VariableTable,
    slave: S,
    closed: bool,
}

impl<S: CoSimulationBinding> FmuAdapter<S> {
    pub fn new(mode_name: impl Into<String>, variables: VariableTable, slave: S) -> Self {
        Self {
            mode_name: mode_name.into(),
            variables,
            slave,
            closed: false,
        }
    }

    pub fn mode_name(&self) -> &str {
        &self.mode_name
    }

    /// Enter then exit initialization mode. Must be called exactly once,
    /// after any pre-init parameter writes.
    pub fn initialize(&mut self, start_time: f64, stop_time: f64) -> Result<(), FmuError> {
        log::trace!(
            "{}: initialize(start_time={start_time}, stop_time={stop_time})",
            self.mode_name
        );
        self.slave.initialize(start_time, stop_time)
    }

    /// Set a scalar real by name. Unknown names are silently ignored: the
    /// surrounding mode may declare variables that don't exist in every
    /// FMU variant (`spec.md` §4.2, and the write-time Open Question in
    /// §9: "silent skip for write").
    pub fn write(&mut self, name: &str, value: f64) -> Result<(), FmuError> {
        match self.variables.value_reference(name) {
            Some(vr) => self.slave.set_real(vr, value),
            None => {
                log::trace!("{}: write to unknown variable `{name}` ignored", self.mode_name);
                Ok(())
            }
        }
    }

    /// Batch-read scalar reals in declared order. Fails fast
    /// (`UnknownReference`) if any name is absent from the variable table
    /// (`spec.md` §9: "fail-fast for read").
    pub fn read(&mut self, names: &[String]) -> Result<Vec<f64>, FmuError> {
        names
            .iter()
            .map(|name| {
                let vr = self
                    .variables
                    .value_reference(name)
                    .ok_or_else(|| FmuError::UnknownReference(name.clone()))?;
                self.slave.get_real(vr)
            })
            .collect()
    }

    /// Advance by `h` seconds from `t`. `h` must be strictly positive.
    pub fn step(&mut self, t: f64, h: f64) -> Result<(), FmuError> {
        debug_assert!(h > 0.0, "step size must be positive");
        self.slave.do_step(t, h)
    }

    /// Terminate, free, and delete the working directory. Safe to call
    /// more than once.
    pub fn close(&mut self) {
        if !self.closed {
            log::trace!("{}: closing FMU instance", self.mode_name);
            self.slave.close();
            self.closed = true;
        }
    }
}

impl<S: CoSimulationBinding> Drop for FmuAdapter<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSlave {
        reals: std::collections::HashMap<u32, f64>,
        close_count: Rc<RefCell<u32>>,
    }

    impl CoSimulationBinding for RecordingSlave {
        fn initialize(&mut self, _start_time: f64, _stop_time: f64) -> Result<(), FmuError> {
            Ok(())
        }
        fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError> {
            self.reals.insert(value_reference, value);
            Ok(())
        }
        fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError> {
            Ok(*self.reals.get(&value_reference).unwrap_or(&0.0))
        }
        fn do_step(&mut self, _t: f64, _h: f64) -> Result<(), FmuError> {
            Ok(())
        }
        fn close(&mut self) {
            *self.close_count.borrow_mut() += 1;
        }
    }

    fn adapter_with(vars: &[(&str, u32)]) -> (FmuAdapter<RecordingSlave>, Rc<RefCell<u32>>) {
        let mut table = VariableTable::default();
        for (name, vr) in vars {
            table.insert(*name, *vr);
        }
        let close_count = Rc::new(RefCell::new(0));
        let slave = RecordingSlave {
            reals: Default::default(),
            close_count: close_count.clone(),
        };
        (FmuAdapter::new("TestMode", table, slave), close_count)
    }

    #[test]
    fn write_to_known_variable_round_trips() {
        let (mut adapter, _) = adapter_with(&[("x", 0)]);
        adapter.write("x", 42.0).unwrap();
        assert_eq!(adapter.read(&["x".to_string()]).unwrap(), vec![42.0]);
    }

    #[test]
    fn write_to_unknown_variable_is_silently_ignored() {
        let (mut adapter, _) = adapter_with(&[("x", 0)]);
        assert!(adapter.write("ghost", 1.0).is_ok());
    }

    #[test]
    fn read_of_unknown_variable_fails() {
        let (mut adapter, _) = adapter_with(&[("x", 0)]);
        assert!(matches!(
            adapter.read(&["ghost".to_string()]),
            Err(FmuError::UnknownReference(_))
        ));
    }

    #[test]
    fn close_is_idempotent_and_runs_on_drop() {
        let (mut adapter, close_count) = adapter_with(&[]);
        adapter.close();
        adapter.close();
        assert_eq!(*close_count.borrow(), 1);
        drop(adapter);
        assert_eq!(*close_count.borrow(), 1);
    }

    #[test]
    fn close_runs_on_drop_even_without_explicit_call() {
        let (adapter, close_count) = adapter_with(&[]);
        drop(adapter);
        assert_eq!(*close_count.borrow(), 1);
    }
}

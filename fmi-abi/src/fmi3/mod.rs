//! Raw types for the FMI 3.0 co-simulation interface (subset used by the adapter).
//!
//! FMI 3.0 renames every entry point with an `fmi3` prefix and widens value
//! references to `u32` explicitly, but the co-simulation call sequence the
//! adapter drives is unchanged: instantiate, enter/exit initialization
//! mode, `fmi3DoStep`, `fmi3GetFloat64`/`fmi3SetFloat64`, terminate,
//! free instance.

use std::os::raw::{c_char, c_double, c_int, c_void};

pub type fmi3Instance = *mut c_void;
pub type fmi3ValueReference = u32;
pub type fmi3Float64 = c_double;
pub type fmi3Boolean = c_int;
pub type fmi3String = *const c_char;

pub const fmi3True: fmi3Boolean = 1;
pub const fmi3False: fmi3Boolean = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum fmi3Status {
    OK = 0,
    Warning = 1,
    Discard = 2,
    Error = 3,
    Fatal = 4,
}

pub type fmi3InstantiateCoSimulationFn = unsafe extern "C" fn(
    instance_name: fmi3String,
    instantiation_token: fmi3String,
    resource_path: fmi3String,
    visible: fmi3Boolean,
    logging_on: fmi3Boolean,
    event_mode_used: fmi3Boolean,
    early_return_allowed: fmi3Boolean,
    required_intermediate_variables: *const fmi3ValueReference,
    n_required_intermediate_variables: usize,
) -> fmi3Instance;

pub type fmi3FreeInstanceFn = unsafe extern "C" fn(instance: fmi3Instance);

pub type fmi3EnterInitializationModeFn = unsafe extern "C" fn(
    instance: fmi3Instance,
    tolerance_defined: fmi3Boolean,
    tolerance: fmi3Float64,
    start_time: fmi3Float64,
    stop_time_defined: fmi3Boolean,
    stop_time: fmi3Float64,
) -> fmi3Status;

pub type fmi3ExitInitializationModeFn = unsafe extern "C" fn(instance: fmi3Instance) -> fmi3Status;
pub type fmi3TerminateFn = unsafe extern "C" fn(instance: fmi3Instance) -> fmi3Status;

pub type fmi3SetFloat64Fn = unsafe extern "C" fn(
    instance: fmi3Instance,
    vr: *const fmi3ValueReference,
    n_vr: usize,
    value: *const fmi3Float64,
    n_value: usize,
) -> fmi3Status;

pub type fmi3GetFloat64Fn = unsafe extern "C" fn(
    instance: fmi3Instance,
    vr: *const fmi3ValueReference,
    n_vr: usize,
    value: *mut fmi3Float64,
    n_value: usize,
) -> fmi3Status;

pub type fmi3DoStepFn = unsafe extern "C" fn(
    instance: fmi3Instance,
    current_communication_point: fmi3Float64,
    communication_step_size: fmi3Float64,
    no_set_fmu_state_prior_to_current_point: fmi3Boolean,
    event_handling_needed: *mut fmi3Boolean,
    terminate_requested: *mut fmi3Boolean,
    early_return: *mut fmi3Boolean,
    last_successful_time: *mut fmi3Float64,
) -> fmi3Status;

/// Function-pointer table resolved from a co-simulation FMU's shared library.
pub struct Fmi3CoSimulationApi {
    pub instantiate: fmi3InstantiateCoSimulationFn,
    pub free_instance: fmi3FreeInstanceFn,
    pub enter_initialization_mode: fmi3EnterInitializationModeFn,
    pub exit_initialization_mode: fmi3ExitInitializationModeFn,
    pub terminate: fmi3TerminateFn,
    pub set_float64: fmi3SetFloat64Fn,
    pub get_float64: fmi3GetFloat64Fn,
    pub do_step: fmi3DoStepFn,
}

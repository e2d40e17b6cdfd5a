//! Raw types for the FMI 2.0 co-simulation interface (subset used by the adapter).
//!
//! This mirrors the handful of entry points a co-simulation master actually
//! calls: `fmi2Instantiate`, `fmi2SetupExperiment`,
//! `fmi2EnterInitializationMode`, `fmi2ExitInitializationMode`,
//! `fmi2SetReal`, `fmi2GetReal`, `fmi2DoStep`, `fmi2Terminate`,
//! `fmi2FreeInstance`. Everything else in the standard (ModelExchange,
//! string/integer/boolean variables, FMU state serialization) is outside
//! `modalsim`'s scope.

use std::os::raw::{c_char, c_double, c_int, c_void};

pub type fmi2Component = *mut c_void;
pub type fmi2ComponentEnvironment = *mut c_void;
pub type fmi2ValueReference = u32;
pub type fmi2Real = c_double;
pub type fmi2Boolean = c_int;
pub type fmi2String = *const c_char;

pub const fmi2True: fmi2Boolean = 1;
pub const fmi2False: fmi2Boolean = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum fmi2Status {
    OK = 0,
    Warning = 1,
    Discard = 2,
    Error = 3,
    Fatal = 4,
    Pending = 5,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub enum fmi2Type {
    ModelExchange = 0,
    CoSimulation = 1,
}

// The real `fmi2CallbackLogger` is a variadic, printf-style C function.
// Stable Rust cannot define a variadic `extern "C" fn`, so — as real FMI
// bindings commonly do — we declare the callback's Rust-facing shape as
// already-formatted (a small C shim in the embedding binary is expected to
// do the vsnprintf-and-forward dance before calling into Rust).
pub type fmi2CallbackLogger = unsafe extern "C" fn(
    component_environment: fmi2ComponentEnvironment,
    instance_name: fmi2String,
    status: fmi2Status,
    category: fmi2String,
    message: fmi2String,
);
pub type fmi2CallbackAllocateMemory =
    unsafe extern "C" fn(n_obj: usize, size: usize) -> *mut c_void;
pub type fmi2CallbackFreeMemory = unsafe extern "C" fn(obj: *mut c_void);

#[repr(C)]
pub struct fmi2CallbackFunctions {
    pub logger: Option<fmi2CallbackLogger>,
    pub allocate_memory: Option<fmi2CallbackAllocateMemory>,
    pub free_memory: Option<fmi2CallbackFreeMemory>,
    pub step_finished: Option<unsafe extern "C" fn(fmi2ComponentEnvironment, fmi2Status)>,
    pub component_environment: fmi2ComponentEnvironment,
}

pub type fmi2InstantiateFn = unsafe extern "C" fn(
    instance_name: fmi2String,
    fmu_type: fmi2Type,
    fmu_guid: fmi2String,
    fmu_resource_location: fmi2String,
    functions: *const fmi2CallbackFunctions,
    visible: fmi2Boolean,
    logging_on: fmi2Boolean,
) -> fmi2Component;

pub type fmi2FreeInstanceFn = unsafe extern "C" fn(c: fmi2Component);

pub type fmi2SetupExperimentFn = unsafe extern "C" fn(
    c: fmi2Component,
    tolerance_defined: fmi2Boolean,
    tolerance: fmi2Real,
    start_time: fmi2Real,
    stop_time_defined: fmi2Boolean,
    stop_time: fmi2Real,
) -> fmi2Status;

pub type fmi2EnterInitializationModeFn = unsafe extern "C" fn(c: fmi2Component) -> fmi2Status;
pub type fmi2ExitInitializationModeFn = unsafe extern "C" fn(c: fmi2Component) -> fmi2Status;
pub type fmi2TerminateFn = unsafe extern "C" fn(c: fmi2Component) -> fmi2Status;

pub type fmi2SetRealFn = unsafe extern "C" fn(
    c: fmi2Component,
    vr: *const fmi2ValueReference,
    nvr: usize,
    value: *const fmi2Real,
) -> fmi2Status;

pub type fmi2GetRealFn = unsafe extern "C" fn(
    c: fmi2Component,
    vr: *const fmi2ValueReference,
    nvr: usize,
    value: *mut fmi2Real,
) -> fmi2Status;

pub type fmi2DoStepFn = unsafe extern "C" fn(
    c: fmi2Component,
    current_communication_point: fmi2Real,
    communication_step_size: fmi2Real,
    no_set_fmu_state_prior_to_current_point: fmi2Boolean,
) -> fmi2Status;

/// Function-pointer table resolved from a co-simulation FMU's shared library.
///
/// Grouping every entry point behind one struct (rather than nine separate
/// `libloading::Symbol` lookups scattered through the adapter) keeps
/// `fmu::dynamic::DynamicSlave` a thin, easily-mocked shim.
pub struct Fmi2CoSimulationApi {
    pub instantiate: fmi2InstantiateFn,
    pub free_instance: fmi2FreeInstanceFn,
    pub setup_experiment: fmi2SetupExperimentFn,
    pub enter_initialization_mode: fmi2EnterInitializationModeFn,
    pub exit_initialization_mode: fmi2ExitInitializationModeFn,
    pub terminate: fmi2TerminateFn,
    pub set_real: fmi2SetRealFn,
    pub get_real: fmi2GetRealFn,
    pub do_step: fmi2DoStepFn,
}

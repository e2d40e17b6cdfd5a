//! The real FMU backend: loads a co-simulation FMU's shared library with
//! `libloading` and drives it through the raw function pointers in
//! `fmi_abi`. Archive extraction and `modelDescription.xml` parsing are
//! delegated to `fmu_schema`, per `spec.md` §1's "explicitly out of
//! scope" list — this module only turns that parsed descriptor into a
//! live [`CoSimulationBinding`].

use std::ffi::CString;
use std::path::Path;

use fmu_schema::{ExtractedFmu, FmiMajorVersion, VariableTable};

use super::binding::CoSimulationBinding;
use super::error::FmuError;

fn load_err(context: &str, err: impl std::fmt::Display) -> FmuError {
    FmuError::FmuLoad(format!("{context}: {err}"))
}

#[cfg(feature = "fmi2")]
mod fmi2_backend {
    use super::*;
    use fmi_abi::fmi2::*;

    pub struct Fmi2Dynamic {
        _library: libloading::Library,
        api: Fmi2CoSimulationApi,
        component: fmi2Component,
        _callbacks: Box<fmi2CallbackFunctions>,
    }

    unsafe extern "C" fn default_logger(
        _component_environment: fmi2ComponentEnvironment,
        instance_name: fmi2String,
        status: fmi2Status,
        _category: fmi2String,
        message: fmi2String,
    ) {
        let instance = std::ffi::CStr::from_ptr(instance_name)
            .to_str()
            .unwrap_or("?");
        let message = std::ffi::CStr::from_ptr(message).to_str().unwrap_or("?");
        match status {
            fmi2Status::OK | fmi2Status::Pending => log::info!(target: "fmi2", "{instance}: {message}"),
            fmi2Status::Warning => log::warn!(target: "fmi2", "{instance}: {message}"),
            fmi2Status::Discard => log::trace!(target: "fmi2", "{instance}: {message}"),
            fmi2Status::Error | fmi2Status::Fatal => log::error!(target: "fmi2", "{instance}: {message}"),
        }
    }

    macro_rules! symbol {
        ($lib:expr, $ty:ty, $name:literal) => {
            unsafe {
                *$lib
                    .get::<$ty>(concat!($name, "\0").as_bytes())
                    .map_err(|e| load_err(concat!("resolving ", $name), e))?
            }
        };
    }

    impl Fmi2Dynamic {
        pub fn open(
            extracted: &ExtractedFmu,
            instance_name: &str,
        ) -> Result<(VariableTable, Self), FmuError> {
            let lib_path = extracted.shared_library_path();
            let library = unsafe { libloading::Library::new(&lib_path) }
                .map_err(|e| load_err(&format!("loading {}", lib_path.display()), e))?;

            let api = Fmi2CoSimulationApi {
                instantiate: symbol!(library, fmi2InstantiateFn, "fmi2Instantiate"),
                free_instance: symbol!(library, fmi2FreeInstanceFn, "fmi2FreeInstance"),
                setup_experiment: symbol!(library, fmi2SetupExperimentFn, "fmi2SetupExperiment"),
                enter_initialization_mode: symbol!(
                    library,
                    fmi2EnterInitializationModeFn,
                    "fmi2EnterInitializationMode"
                ),
                exit_initialization_mode: symbol!(
                    library,
                    fmi2ExitInitializationModeFn,
                    "fmi2ExitInitializationMode"
                ),
                terminate: symbol!(library, fmi2TerminateFn, "fmi2Terminate"),
                set_real: symbol!(library, fmi2SetRealFn, "fmi2SetReal"),
                get_real: symbol!(library, fmi2GetRealFn, "fmi2GetReal"),
                do_step: symbol!(library, fmi2DoStepFn, "fmi2DoStep"),
            };

            let callbacks = Box::new(fmi2CallbackFunctions {
                logger: Some(default_logger),
                allocate_memory: None,
                free_memory: None,
                step_finished: None,
                component_environment: std::ptr::null_mut(),
            });

            let name_c = CString::new(instance_name)
                .map_err(|e| load_err("instance name", e))?;
            let guid_c = CString::new(extracted.descriptor().guid.as_str())
                .map_err(|e| load_err("guid", e))?;
            let resource_c = CString::new(extracted.resource_url())
                .map_err(|e| load_err("resource url", e))?;

            let component = unsafe {
                (api.instantiate)(
                    name_c.as_ptr(),
                    fmi2Type::CoSimulation,
                    guid_c.as_ptr(),
                    resource_c.as_ptr(),
                    callbacks.as_ref(),
                    fmi2False,
                    fmi2False,
                )
            };
            if component.is_null() {
                return Err(FmuError::FmuLoad("fmi2Instantiate returned null".into()));
            }

            Ok((
                extracted.descriptor().variables.clone(),
                Self {
                    _library: library,
                    api,
                    component,
                    _callbacks: callbacks,
                },
            ))
        }
    }

    impl CoSimulationBinding for Fmi2Dynamic {
        fn initialize(&mut self, start_time: f64, stop_time: f64) -> Result<(), FmuError> {
            let status = unsafe {
                (self.api.setup_experiment)(
                    self.component,
                    fmi2False,
                    0.0,
                    start_time,
                    fmi2True,
                    stop_time,
                )
            };
            check(status, "fmi2SetupExperiment")?;
            let status = unsafe { (self.api.enter_initialization_mode)(self.component) };
            check(status, "fmi2EnterInitializationMode")?;
            let status = unsafe { (self.api.exit_initialization_mode)(self.component) };
            check(status, "fmi2ExitInitializationMode")
        }

        fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError> {
            let status =
                unsafe { (self.api.set_real)(self.component, &value_reference, 1, &value) };
            check(status, "fmi2SetReal")
        }

        fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError> {
            let mut value = 0.0;
            let status = unsafe {
                (self.api.get_real)(self.component, &value_reference, 1, &mut value)
            };
            check(status, "fmi2GetReal")?;
            Ok(value)
        }

        fn do_step(&mut self, current_time: f64, step_size: f64) -> Result<(), FmuError> {
            let status =
                unsafe { (self.api.do_step)(self.component, current_time, step_size, fmi2False) };
            if status != fmi2Status::OK && status != fmi2Status::Warning {
                return Err(FmuError::StepReject {
                    t: current_time,
                    h: step_size,
                    reason: format!("{status:?}"),
                });
            }
            Ok(())
        }

        fn close(&mut self) {
            unsafe {
                let _ = (self.api.terminate)(self.component);
                (self.api.free_instance)(self.component);
            }
        }
    }

    fn check(status: fmi2Status, call: &str) -> Result<(), FmuError> {
        match status {
            fmi2Status::OK | fmi2Status::Warning | fmi2Status::Pending => Ok(()),
            other => Err(FmuError::FmuInit(format!("{call} returned {other:?}"))),
        }
    }
}

#[cfg(feature = "fmi2")]
pub use fmi2_backend::Fmi2Dynamic;

/// Open an FMU archive and instantiate a live co-simulation slave for it.
///
/// Dispatches on the `fmiVersion` declared by `modelDescription.xml`;
/// callers that only care about the `CoSimulationBinding` contract never
/// need to know which major version they got.
pub enum DynamicSlave {
    #[cfg(feature = "fmi2")]
    Fmi2(Fmi2Dynamic),
}

impl DynamicSlave {
    pub fn open(path: &Path, instance_name: &str) -> Result<(VariableTable, Self), FmuError> {
        let extracted = ExtractedFmu::open(path).map_err(|e| load_err("extracting FMU", e))?;
        match extracted.descriptor().fmi_version {
            #[cfg(feature = "fmi2")]
            FmiMajorVersion::Fmi2 => {
                let (vars, slave) = Fmi2Dynamic::open(&extracted, instance_name)?;
                Ok((vars, DynamicSlave::Fmi2(slave)))
            }
            other => Err(FmuError::FmuLoad(format!(
                "no compiled-in co-simulation backend for {other:?} (enable the matching feature)"
            ))),
        }
    }
}

impl CoSimulationBinding for DynamicSlave {
    fn initialize(&mut self, start_time: f64, stop_time: f64) -> Result<(), FmuError> {
        match self {
            #[cfg(feature = "fmi2")]
            DynamicSlave::Fmi2(s) => s.initialize(start_time, stop_time),
        }
    }

    fn set_real(&mut self, value_reference: u32, value: f64) -> Result<(), FmuError> {
        match self {
            #[cfg(feature = "fmi2")]
            DynamicSlave::Fmi2(s) => s.set_real(value_reference, value),
        }
    }

    fn get_real(&mut self, value_reference: u32) -> Result<f64, FmuError> {
        match self {
            #[cfg(feature = "fmi2")]
            DynamicSlave::Fmi2(s) => s.get_real(value_reference),
        }
    }

    fn do_step(&mut self, current_time: f64, step_size: f64) -> Result<(), FmuError> {
        match self {
            #[cfg(feature = "fmi2")]
            DynamicSlave::Fmi2(s) => s.do_step(current_time, step_size),
        }
    }

    fn close(&mut self) {
        match self {
            #[cfg(feature = "fmi2")]
            DynamicSlave::Fmi2(s) => s.close(),
        }
    }
}

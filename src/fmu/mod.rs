//! The FMU coupling layer: a backend-agnostic [`CoSimulationBinding`]
//! contract, a scoped [`FmuAdapter`] built on top of it, a real
//! `libloading`-based backend in [`dynamic`], and parameter-schedule
//! resolution in [`params`].

mod adapter;
mod binding;
mod dynamic;
mod error;
mod params;

pub use adapter::FmuAdapter;
pub use binding::CoSimulationBinding;
pub use dynamic::DynamicSlave;
pub use error::FmuError;
pub use params::{ParamSchedule, ScheduleEntry};

#[derive(Debug, thiserror::Error)]
pub enum FmuError {
    #[error("failed to load FMU: {0}")]
    FmuLoad(String),

    #[error("FMU initialization failed: {0}")]
    FmuInit(String),

    #[error("do_step rejected at t={t}, h={h}: {reason}")]
    StepReject { t: f64, h: f64, reason: String },

    #[error("unknown variable reference `{0}`")]
    UnknownReference(String),
}

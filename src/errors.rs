use crate::core::equipment::panel::PanelSelectionError;
use crate::core::regional::MissingRadiationError;
use crate::core::tariff::InvalidConsumptionError;
use crate::input::Phase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("No quoter configuration was found for region '{0}'")]
    MissingConfiguration(String),
    #[error("Quoter configuration could not be loaded: {0}")]
    InvalidConfiguration(anyhow::Error),
    #[error("{0}")]
    PanelSelection(#[from] PanelSelectionError),
    #[error("No {0} inverter is available, so the installation needs manual engineering review")]
    NoInverterForPhase(Phase),
    #[error("{0}")]
    InvalidConsumption(#[from] InvalidConsumptionError),
    #[error("{0}")]
    MissingRadiation(#[from] MissingRadiationError),
    #[error("Error while writing quote output: {0}")]
    ErrorInOutput(OutputError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

use crate::core::units::{daily_from_monthly, DAYS_PER_BILLING_MONTH, WATTS_PER_KILOWATT};
use crate::input::{Panel, QuoterConfig};
use ordered_float::OrderedFloat;
use serde::Serialize;
use thiserror::Error;

/// An array of identical panels sized to cover the monthly consumption.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelArray {
    pub panel: Panel,
    pub quantity: u32,
    /// peak power needed to cover consumption (kW)
    pub required_power_kw: f64,
    /// peak power of the panels actually fitted (kW)
    pub installed_power_kw: f64,
    pub total_cost_usd: f64,
    pub total_weight_kg: f64,
    pub estimated_monthly_generation_kwh: f64,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PanelSelectionError {
    #[error("The panel catalog is empty")]
    EmptyCatalog,
    #[error("There is no panel with model '{0}' in the catalog")]
    UnknownModel(String),
}

/// Peak array power (kW) needed for a monthly consumption.
///
/// Radiation in kWh/m2/day equals the daily peak sun hours, so a kW of panels yields
/// `radiation * performance_ratio` kWh each day.
pub fn required_array_power(
    monthly_consumption_kwh: f64,
    radiation: f64,
    performance_ratio: f64,
) -> f64 {
    daily_from_monthly(monthly_consumption_kwh) / (radiation * performance_ratio)
}

pub fn monthly_generation(installed_power_kw: f64, radiation: f64, performance_ratio: f64) -> f64 {
    installed_power_kw * radiation * performance_ratio * DAYS_PER_BILLING_MONTH as f64
}

/// The requested panel model, or otherwise the catalog panel with the lowest price per watt.
pub fn select_panel<'a>(
    config: &'a QuoterConfig,
    model: Option<&str>,
) -> Result<&'a Panel, PanelSelectionError> {
    match model {
        Some(model) => config
            .panel_by_model(model)
            .ok_or_else(|| PanelSelectionError::UnknownModel(model.to_owned())),
        None => config
            .panels
            .iter()
            .min_by_key(|panel| OrderedFloat(panel.price_per_watt()))
            .ok_or(PanelSelectionError::EmptyCatalog),
    }
}

pub fn size_panel_array(
    panel: &Panel,
    required_power_kw: f64,
    radiation: f64,
    performance_ratio: f64,
) -> PanelArray {
    let required_watts = required_power_kw * WATTS_PER_KILOWATT as f64;
    let quantity = ((required_watts / panel.power_watt).ceil() as u32).max(1);
    let units = quantity as f64;
    let installed_power_kw = panel.power_kw * units;

    PanelArray {
        panel: panel.clone(),
        quantity,
        required_power_kw,
        installed_power_kw,
        total_cost_usd: panel.price_usd * units,
        total_weight_kg: panel.weight_kg * units,
        estimated_monthly_generation_kwh: monthly_generation(
            installed_power_kw,
            radiation,
            performance_ratio,
        ),
    }
}

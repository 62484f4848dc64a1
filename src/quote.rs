use crate::core::equipment::elec_battery::{
    calculate_optimal_battery_configuration, BatteryCalculationResult,
};
use crate::core::equipment::inverter::get_inverter_by_power_and_phase;
use crate::core::equipment::panel::{
    required_array_power, select_panel, size_panel_array, PanelArray,
};
use crate::core::pricing::{
    apply_variable_costs, get_sector_multiplier, local_to_usd, usd_to_local, CascadeStep,
    PriceBreakdown,
};
use crate::core::regional::{
    calculate_transport_cost, get_solar_radiation_by_department, has_radiation_for_department,
};
use crate::core::tariff::{calculate_electricity_cost, ElectricityCostResult};
use crate::core::units::MONTHS_PER_YEAR;
use crate::errors::QuoteError;
use crate::input::{Inverter, QuoteRequest, QuoterConfig};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Everything the quote page shows for one request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteResult {
    pub request: QuoteRequest,
    /// average daily solar radiation used for sizing (kWh/m2/day)
    pub radiation: f64,
    /// false when the department was not in the radiation table and the fallback was used
    pub department_listed: bool,
    pub panels: PanelArray,
    pub inverter: Inverter,
    pub battery: Option<BatteryCalculationResult>,
    /// a battery was requested but no catalog battery can sustain the load
    pub battery_unavailable: bool,
    pub hardware_cost_usd: f64,
    pub hardware_cost_local: f64,
    pub installation_cost_local: f64,
    pub total_weight_kg: f64,
    pub transport_cost_local: f64,
    pub price: PriceBreakdown,
    pub price_steps: Vec<CascadeStep>,
    pub final_price_usd: f64,
    /// sector adjustment, reported for reference and not applied to the price
    pub sector_multiplier: f64,
    pub current_bill: ElectricityCostResult,
    pub bill_after_solar: ElectricityCostResult,
    pub monthly_savings_local: f64,
    /// years for the savings to repay the final price, when there are savings
    pub payback_years: Option<f64>,
}

/// Build a complete quote: size the panel array, pick the inverter and optional battery bank,
/// price the installation and compare the customer's bill before and after.
#[instrument(skip(config), fields(department = %request.department))]
pub fn calculate_quote(
    config: &QuoterConfig,
    request: &QuoteRequest,
) -> Result<QuoteResult, QuoteError> {
    let cost_factors = &config.cost_factors;
    let exchange_rate = cost_factors.exchange_rate;
    let performance_ratio = cost_factors.performance_ratio;
    let consumption = request.monthly_consumption_kwh;

    let current_bill = calculate_electricity_cost(config, consumption, request.sector)?;

    let department_listed = has_radiation_for_department(config, &request.department);
    if !department_listed {
        warn!(
            "No radiation data for department '{}', using the generic estimate",
            request.department
        );
    }
    let radiation = get_solar_radiation_by_department(config, &request.department)?;

    let panel = select_panel(config, request.panel_model.as_deref())?;
    let panels = size_panel_array(
        panel,
        required_array_power(consumption, radiation, performance_ratio),
        radiation,
        performance_ratio,
    );
    debug!(
        "{} x {} panels for {:.2} kW required ({:.2} kW installed)",
        panels.quantity, panel.model, panels.required_power_kw, panels.installed_power_kw
    );

    let inverter =
        get_inverter_by_power_and_phase(config, panels.installed_power_kw, request.phase)
            .ok_or(QuoteError::NoInverterForPhase(request.phase))?
            .clone();
    debug!("Selected inverter {} ({} kW)", inverter.model, inverter.power_kw);

    let battery = if request.include_battery {
        calculate_optimal_battery_configuration(config, consumption)
    } else {
        None
    };
    let battery_unavailable = request.include_battery && battery.is_none();
    if battery_unavailable {
        warn!("No battery configuration can sustain {consumption} kWh/month");
    }

    let battery_cost_usd = battery.as_ref().map_or(0., |bank| bank.total_cost_usd);
    let battery_weight_kg = battery.as_ref().map_or(0., |bank| bank.total_weight_kg);

    let hardware_cost_usd = panels.total_cost_usd + inverter.price_usd + battery_cost_usd;
    let hardware_cost_local = usd_to_local(hardware_cost_usd, exchange_rate);
    let installation_cost_local = cost_factors.fixed_costs.total();
    let total_weight_kg = panels.total_weight_kg + battery_weight_kg;
    let transport_cost_local =
        calculate_transport_cost(config, total_weight_kg, &request.department);

    let base_price = hardware_cost_local + installation_cost_local + transport_cost_local;
    let price = apply_variable_costs(base_price, &cost_factors.variable_costs);
    debug!("Base price {base_price:.2}, final price {:.2}", price.final_price);

    let residual_consumption = (consumption - panels.estimated_monthly_generation_kwh).max(0.);
    let bill_after_solar =
        calculate_electricity_cost(config, residual_consumption, request.sector)?;
    let monthly_savings_local = current_bill.cost_local - bill_after_solar.cost_local;
    let payback_years = (monthly_savings_local > 0.)
        .then(|| price.final_price / (monthly_savings_local * MONTHS_PER_YEAR as f64));

    Ok(QuoteResult {
        request: request.clone(),
        radiation,
        department_listed,
        panels,
        inverter,
        battery,
        battery_unavailable,
        hardware_cost_usd,
        hardware_cost_local,
        installation_cost_local,
        total_weight_kg,
        transport_cost_local,
        price,
        price_steps: price.steps(&cost_factors.variable_costs),
        final_price_usd: local_to_usd(price.final_price, exchange_rate),
        sector_multiplier: get_sector_multiplier(request.sector),
        current_bill,
        bill_after_solar,
        monthly_savings_local,
        payback_years,
    })
}

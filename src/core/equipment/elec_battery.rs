use crate::core::units::{hourly_from_monthly, PERCENT};
use crate::input::{Battery, QuoterConfig};
use serde::Serialize;

/// hours the battery bank must sustain the average load without grid or solar input
pub const AUTONOMY_HOURS: f64 = 4.;
/// round trip efficiency of the battery system (between 0 & 1)
pub const SYSTEM_EFFICIENCY: f64 = 0.9;

/// A battery bank sized to cover the autonomy window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatteryCalculationResult {
    pub battery: Battery,
    pub quantity: u32,
    /// energy the load draws over the autonomy window (kWh)
    pub energy_needed_kwh: f64,
    /// usable capacity required once system losses are allowed for (kWh)
    pub required_capacity_kwh: f64,
    pub total_capacity_kwh: f64,
    pub total_usable_kwh: f64,
    pub total_cost_usd: f64,
    pub total_weight_kg: f64,
    pub autonomy_hours: f64,
    pub justification: String,
}

/// Size the cheapest battery bank that covers the load for the autonomy window.
///
/// Each catalog battery is sized to the number of units whose usable capacity covers the
/// requirement. A bank whose combined discharge rate cannot deliver the energy within the window is
/// rejected. The cheapest remaining bank wins, with fewer units breaking ties.
///
/// Returns `None` when the catalog is empty or no battery can sustain the load.
pub fn calculate_optimal_battery_configuration(
    config: &QuoterConfig,
    monthly_consumption_kwh: f64,
) -> Option<BatteryCalculationResult> {
    let energy_needed_kwh = hourly_from_monthly(monthly_consumption_kwh) * AUTONOMY_HOURS;
    let required_capacity_kwh = energy_needed_kwh / SYSTEM_EFFICIENCY;

    config
        .batteries
        .iter()
        .filter_map(|battery| size_battery_bank(battery, energy_needed_kwh, required_capacity_kwh))
        .min_by(|a, b| {
            a.total_cost_usd
                .total_cmp(&b.total_cost_usd)
                .then(a.quantity.cmp(&b.quantity))
        })
}

fn size_battery_bank(
    battery: &Battery,
    energy_needed_kwh: f64,
    required_capacity_kwh: f64,
) -> Option<BatteryCalculationResult> {
    if battery.usable_kwh <= 0. {
        return None;
    }

    // a bank always has at least one unit
    let quantity = ((required_capacity_kwh / battery.usable_kwh).ceil() as u32).max(1);
    let units = quantity as f64;

    let deliverable_kwh = battery.max_discharge_kw * AUTONOMY_HOURS * units;
    if deliverable_kwh < energy_needed_kwh {
        return None;
    }

    let total_usable_kwh = battery.usable_kwh * units;

    Some(BatteryCalculationResult {
        battery: battery.clone(),
        quantity,
        energy_needed_kwh,
        required_capacity_kwh,
        total_capacity_kwh: battery.capacity_kwh * units,
        total_usable_kwh,
        total_cost_usd: battery.price_usd * units,
        total_weight_kg: battery.weight_kg * units,
        autonomy_hours: AUTONOMY_HOURS,
        justification: format!(
            "{quantity} x {} ({} kWh usable each) give {total_usable_kwh:.2} kWh usable against \
             {required_capacity_kwh:.2} kWh required for {AUTONOMY_HOURS} hours of autonomy at \
             {}% system efficiency, discharging up to {:.2} kW",
            battery.model,
            battery.usable_kwh,
            SYSTEM_EFFICIENCY * PERCENT,
            battery.max_discharge_kw * units,
        ),
    })
}

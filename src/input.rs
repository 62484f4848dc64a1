use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt::{Display, Formatter};
use std::io::{BufReader, Read};
use strum::EnumIter;

/// Key of the radiation table entry used for departments the table does not list.
pub const UNKNOWN_DEPARTMENT: &str = "Desconocido";

pub fn ingest_config(json: impl Read) -> anyhow::Result<QuoterConfig> {
    let config: QuoterConfig = serde_json::from_reader(BufReader::new(json))?;
    config.check()?;
    Ok(config)
}

pub fn ingest_request(json: impl Read) -> anyhow::Result<QuoteRequest> {
    let request: QuoteRequest = serde_json::from_reader(BufReader::new(json))?;
    request
        .validate()
        .map_err(|err| anyhow!("Quote request was invalid: {err}"))?;
    Ok(request)
}

/// The full configuration bundle read by every calculation: equipment catalogs, regional tables,
/// tariffs and fee factors.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct QuoterConfig {
    #[validate]
    pub panels: Vec<Panel>,
    #[validate]
    pub batteries: Vec<Battery>,
    #[validate]
    pub inverters: Vec<Inverter>,
    /// average daily solar radiation (kWh/m2/day) by department
    pub solar_radiation: RadiationTable,
    #[validate]
    pub cost_factors: CostFactors,
    #[validate]
    pub electricity_rates: ElectricityRates,
}

pub type RadiationTable = IndexMap<String, f64>;

impl QuoterConfig {
    /// Run the field-level bounds and the checks spanning several fields.
    pub fn check(&self) -> anyhow::Result<()> {
        self.validate()
            .map_err(|err| anyhow!("Quoter configuration was invalid: {err}"))?;

        if let Some(battery) = self
            .batteries
            .iter()
            .find(|battery| battery.usable_kwh > battery.capacity_kwh)
        {
            bail!(
                "Battery '{}' declares more usable capacity ({} kWh) than total capacity ({} kWh)",
                battery.model,
                battery.usable_kwh,
                battery.capacity_kwh
            );
        }

        check_radiation_table(&self.solar_radiation)?;

        if let Some((department, rate)) = self
            .cost_factors
            .transport_cost_per_kg
            .iter()
            .find(|&(_, &rate)| !rate.is_finite() || rate < 0.)
        {
            bail!("Transport cost per kg for '{department}' must not be negative, but was {rate}");
        }

        check_tiers("residential", &self.electricity_rates.residential.tiers)?;
        check_tiers("commercial", &self.electricity_rates.commercial.tiers)?;

        Ok(())
    }

    pub fn panel_by_model(&self, model: &str) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.model == model)
    }
}

/// The table must hold the fallback entry and a positive, finite radiation for every department.
pub fn check_radiation_table(table: &RadiationTable) -> anyhow::Result<()> {
    if !table.contains_key(UNKNOWN_DEPARTMENT) {
        bail!("Solar radiation table has no '{UNKNOWN_DEPARTMENT}' fallback entry");
    }
    if let Some((department, radiation)) = table
        .iter()
        .find(|&(_, &radiation)| !radiation.is_finite() || radiation <= 0.)
    {
        bail!("Solar radiation for '{department}' must be positive, but was {radiation}");
    }
    Ok(())
}

/// Tiers must start from zero or one, run contiguously upwards, and end with an open-ended tier.
fn check_tiers(regime: &str, tiers: &[RateTier]) -> anyhow::Result<()> {
    let Some(first) = tiers.first() else {
        bail!("The {regime} tariff has no consumption tiers");
    };
    if first.from_kwh > 1. {
        bail!(
            "The first {regime} tier starts at {} kWh rather than at the first kWh",
            first.from_kwh
        );
    }
    for (index, tier) in tiers.iter().enumerate() {
        match tier.to_kwh {
            Some(to_kwh) if to_kwh < tier.from_kwh => {
                bail!(
                    "The {regime} tier starting at {} kWh ends before it starts",
                    tier.from_kwh
                )
            }
            None if index != tiers.len() - 1 => {
                bail!("Only the last {regime} tier may be open-ended")
            }
            Some(_) if index == tiers.len() - 1 => {
                bail!("The last {regime} tier must be open-ended")
            }
            _ => {}
        }
    }
    for (lower, upper) in tiers.iter().tuple_windows() {
        if lower.to_kwh.map(|to_kwh| to_kwh + 1.) != Some(upper.from_kwh) {
            bail!(
                "The {regime} tier starting at {} kWh does not follow on from the previous tier",
                upper.from_kwh
            );
        }
    }
    Ok(())
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Panel {
    pub model: String,
    #[validate(exclusive_minimum = 0.)]
    pub power_watt: f64,
    /// rated power in kW, expected to equal power_watt / 1000
    #[validate(exclusive_minimum = 0.)]
    pub power_kw: f64,
    /// module efficiency (between 0 & 1)
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub efficiency: f64,
    pub dimensions: PanelDimensions,
    pub vmp: f64,
    pub imp: f64,
    pub voc: f64,
    pub isc: f64,
    #[validate(minimum = 0.)]
    pub weight_kg: f64,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub warranty: PanelWarranty,
    #[validate(minimum = 0.)]
    pub price_usd: f64,
}

impl Panel {
    pub fn price_per_watt(&self) -> f64 {
        self.price_usd / self.power_watt
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct PanelDimensions {
    pub length_mm: f64,
    pub width_mm: f64,
    pub thickness_mm: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct PanelWarranty {
    pub product_years: u32,
    pub performance_years: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Battery {
    pub model: String,
    pub technology: String,
    pub nominal_voltage: f64,
    #[validate(minimum = 0.)]
    pub capacity_kwh: f64,
    #[validate(minimum = 0.)]
    pub usable_kwh: f64,
    #[validate(minimum = 0.)]
    pub max_discharge_kw: f64,
    #[validate(minimum = 0.)]
    pub peak_discharge_kw: f64,
    #[validate(minimum = 0.)]
    pub weight_kg: f64,
    pub cycle_life: u32,
    /// depth of discharge (between 0 & 1)
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub depth_of_discharge: f64,
    #[serde(default)]
    pub communication: Vec<String>,
    pub ip_rating: String,
    pub warranty_years: u32,
    #[validate(minimum = 0.)]
    pub price_usd: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Inverter {
    pub model: String,
    pub brand: String,
    #[validate(exclusive_minimum = 0.)]
    pub power_kw: f64,
    pub phase: Phase,
    pub version: String,
    #[validate(minimum = 0.)]
    pub price_usd: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum Phase {
    #[serde(rename = "single_phase", alias = "monofasico")]
    SinglePhase,
    #[serde(rename = "three_phase", alias = "trifasico")]
    ThreePhase,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Phase::SinglePhase => "single-phase",
                Phase::ThreePhase => "three-phase",
            }
        )
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct CostFactors {
    #[validate]
    pub fixed_costs: FixedCosts,
    #[validate]
    pub variable_costs: VariableCosts,
    /// transport cost in local currency per kg, by department
    pub transport_cost_per_kg: IndexMap<String, f64>,
    /// local currency per USD
    #[validate(exclusive_minimum = 0.)]
    pub exchange_rate: f64,
    /// fraction of the nominal array output delivered after system losses
    #[serde(default = "default_performance_ratio")]
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub performance_ratio: f64,
}

fn default_performance_ratio() -> f64 {
    0.8
}

/// Flat installation costs, in local currency.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FixedCosts {
    #[validate(minimum = 0.)]
    pub panel_board: f64,
    #[validate(minimum = 0.)]
    pub grounding: f64,
    #[validate(minimum = 0.)]
    pub engineering: f64,
    #[validate(minimum = 0.)]
    pub mounting_post: f64,
    #[validate(minimum = 0.)]
    pub wiring: f64,
    #[validate(minimum = 0.)]
    pub inverter_installation: f64,
}

impl FixedCosts {
    pub fn total(&self) -> f64 {
        let Self {
            panel_board,
            grounding,
            engineering,
            mounting_post,
            wiring,
            inverter_installation,
        } = self;
        panel_board + grounding + engineering + mounting_post + wiring + inverter_installation
    }
}

/// Fee fractions applied in turn on the running price.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct VariableCosts {
    #[validate(minimum = 0.)]
    pub margin: f64,
    #[validate(minimum = 0.)]
    pub commission: f64,
    /// specific transaction tax
    #[serde(alias = "it")]
    #[validate(minimum = 0.)]
    pub specific_tax: f64,
    /// value-added tax
    #[serde(alias = "iva")]
    #[validate(minimum = 0.)]
    pub vat: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ElectricityRates {
    #[validate]
    pub residential: ResidentialRates,
    #[validate]
    pub commercial: TieredRates,
    #[validate]
    pub industrial: FlatRate,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ResidentialRates {
    #[validate]
    pub minimum_charge: MinimumCharge,
    #[validate]
    pub tiers: Vec<RateTier>,
    #[validate]
    pub subsidy: SubsidizedTariff,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct TieredRates {
    #[validate]
    pub minimum_charge: MinimumCharge,
    #[validate]
    pub tiers: Vec<RateTier>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MinimumCharge {
    #[validate(minimum = 0.)]
    pub threshold_kwh: f64,
    #[validate(minimum = 0.)]
    pub amount: f64,
}

/// A consumption band billed at its own rate. `to_kwh` of `None` means the band is open-ended.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RateTier {
    #[validate(minimum = 0.)]
    pub from_kwh: f64,
    pub to_kwh: Option<f64>,
    #[validate(minimum = 0.)]
    pub rate: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SubsidizedTariff {
    #[validate(minimum = 0.)]
    pub max_kwh: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub discount_percent: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FlatRate {
    #[validate(minimum = 0.)]
    pub rate: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    #[serde(alias = "residencial")]
    Residential,
    #[serde(alias = "comercial")]
    Commercial,
    Industrial,
    #[serde(alias = "publico")]
    Public,
    #[serde(alias = "agricola")]
    Agricultural,
}

/// A request for a quote, as submitted from the quote form.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct QuoteRequest {
    #[validate(minimum = 0.)]
    pub monthly_consumption_kwh: f64,
    pub department: String,
    pub sector: Sector,
    pub phase: Phase,
    #[serde(default)]
    pub include_battery: bool,
    pub panel_model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RadiationRow {
    department: String,
    radiation: f64,
}

/// Read a radiation table from CSV with `department` and `radiation` columns.
pub fn radiation_table_from_csv(csv: impl Read) -> anyhow::Result<RadiationTable> {
    let table: RadiationTable = csv::Reader::from_reader(csv)
        .deserialize::<RadiationRow>()
        .map_ok(|row| (row.department, row.radiation))
        .collect::<Result<_, _>>()?;
    check_radiation_table(&table)?;
    Ok(table)
}

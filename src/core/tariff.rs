use crate::core::units::fraction_of_percent;
use crate::input::{MinimumCharge, QuoterConfig, RateTier, Sector};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use strum::EnumIter;
use thiserror::Error;

/// This module calculates monthly electricity bills under the regulated tariff regimes.

/// The three tariff regimes that every customer sector is billed under.
#[derive(Clone, Copy, Debug, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricityRateCategory {
    Residential,
    Commercial,
    Industrial,
}

impl ElectricityRateCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ElectricityRateCategory::Residential => "Residential",
            ElectricityRateCategory::Commercial => "Commercial",
            ElectricityRateCategory::Industrial => "Industrial",
        }
    }
}

impl Display for ElectricityRateCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn map_sector_to_electricity_rate(sector: Sector) -> ElectricityRateCategory {
    match sector {
        Sector::Residential => ElectricityRateCategory::Residential,
        Sector::Commercial | Sector::Public => ElectricityRateCategory::Commercial,
        Sector::Industrial | Sector::Agricultural => ElectricityRateCategory::Industrial,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElectricityCostResult {
    /// monthly bill in local currency
    pub cost_local: f64,
    pub cost_usd: f64,
    /// average price paid per kWh, in local currency
    pub effective_rate_local: f64,
    pub effective_rate_usd: f64,
    /// one line per billing step
    pub breakdown: String,
    pub rate_category: ElectricityRateCategory,
    pub rate_label: &'static str,
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Monthly consumption must be a non-negative number of kWh, but {0} was given")]
pub struct InvalidConsumptionError(pub f64);

/// Calculate the monthly electricity bill for a consumption figure under the tariff regime of
/// the given sector.
///
/// Arguments:
/// * `config` - configuration holding the tariff tables and exchange rate
/// * `monthly_consumption_kwh` - energy consumed over the billing month, in kWh
/// * `sector` - the customer's sector, which determines the tariff regime
pub fn calculate_electricity_cost(
    config: &QuoterConfig,
    monthly_consumption_kwh: f64,
    sector: Sector,
) -> Result<ElectricityCostResult, InvalidConsumptionError> {
    if !monthly_consumption_kwh.is_finite() || monthly_consumption_kwh < 0. {
        return Err(InvalidConsumptionError(monthly_consumption_kwh));
    }

    let rates = &config.electricity_rates;
    let rate_category = map_sector_to_electricity_rate(sector);
    let mut steps = vec![format!(
        "{} tariff for {monthly_consumption_kwh} kWh",
        rate_category.label()
    )];

    let cost_local = match rate_category {
        ElectricityRateCategory::Residential => {
            let residential = &rates.residential;
            let mut total = tiered_cost(
                &residential.minimum_charge,
                &residential.tiers,
                monthly_consumption_kwh,
                &mut steps,
            );
            // the subsidy discounts the tiered bill, never the minimum charge
            if monthly_consumption_kwh > residential.minimum_charge.threshold_kwh
                && monthly_consumption_kwh <= residential.subsidy.max_kwh
            {
                let discount = total * fraction_of_percent(residential.subsidy.discount_percent);
                steps.push(format!(
                    "Subsidised tariff ({}% up to {} kWh): -{discount:.2}",
                    residential.subsidy.discount_percent, residential.subsidy.max_kwh
                ));
                total -= discount;
            }
            total
        }
        ElectricityRateCategory::Commercial => tiered_cost(
            &rates.commercial.minimum_charge,
            &rates.commercial.tiers,
            monthly_consumption_kwh,
            &mut steps,
        ),
        ElectricityRateCategory::Industrial => {
            let total = monthly_consumption_kwh * rates.industrial.rate;
            steps.push(format!(
                "Flat rate: {monthly_consumption_kwh} kWh x {:.4} = {total:.2}",
                rates.industrial.rate
            ));
            total
        }
    };

    let effective_rate_local = if monthly_consumption_kwh == 0. {
        0.
    } else {
        cost_local / monthly_consumption_kwh
    };
    steps.push(format!(
        "Total: {cost_local:.2} (effective rate {effective_rate_local:.4} per kWh)"
    ));

    let exchange_rate = config.cost_factors.exchange_rate;

    Ok(ElectricityCostResult {
        cost_local,
        cost_usd: cost_local / exchange_rate,
        effective_rate_local,
        effective_rate_usd: effective_rate_local / exchange_rate,
        breakdown: steps.join("\n"),
        rate_category,
        rate_label: rate_category.label(),
    })
}

/// Bill consumption through ascending tiers, or charge the flat minimum when consumption does
/// not exceed the minimum charge threshold.
fn tiered_cost(
    minimum_charge: &MinimumCharge,
    tiers: &[RateTier],
    consumption_kwh: f64,
    steps: &mut Vec<String>,
) -> f64 {
    if consumption_kwh <= minimum_charge.threshold_kwh {
        steps.push(format!(
            "Minimum charge (up to {} kWh): {:.2}",
            minimum_charge.threshold_kwh, minimum_charge.amount
        ));
        return minimum_charge.amount;
    }

    let mut remaining_kwh = consumption_kwh;
    let mut total = 0.;
    for (index, tier) in tiers.iter().enumerate() {
        if remaining_kwh <= 0. {
            break;
        }
        let kwh_in_tier = match tier.to_kwh {
            Some(to_kwh) => remaining_kwh.min(tier_width(tier.from_kwh, to_kwh)),
            None => remaining_kwh,
        };
        let tier_cost = kwh_in_tier * tier.rate;
        steps.push(format!(
            "Tier {} ({}-{} kWh): {kwh_in_tier} kWh x {:.4} = {tier_cost:.2}",
            index + 1,
            tier.from_kwh,
            tier.to_kwh
                .map_or_else(|| "...".to_owned(), |to_kwh| to_kwh.to_string()),
            tier.rate
        ));
        total += tier_cost;
        remaining_kwh -= kwh_in_tier;
    }

    total
}

/// Number of kWh a bounded tier covers. Bounds are inclusive and the first billable kWh is
/// number one, so a tier starting at zero covers the same kWh as one starting at one.
fn tier_width(from_kwh: f64, to_kwh: f64) -> f64 {
    to_kwh - from_kwh.max(1.) + 1.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::config;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(Sector::Residential, ElectricityRateCategory::Residential)]
    #[case(Sector::Commercial, ElectricityRateCategory::Commercial)]
    #[case(Sector::Industrial, ElectricityRateCategory::Industrial)]
    #[case(Sector::Public, ElectricityRateCategory::Commercial)]
    #[case(Sector::Agricultural, ElectricityRateCategory::Industrial)]
    fn should_map_sectors_to_rate_categories(
        #[case] sector: Sector,
        #[case] expected: ElectricityRateCategory,
    ) {
        assert_eq!(map_sector_to_electricity_rate(sector), expected);
    }

    #[rstest]
    fn should_bill_residential_consumption_through_tiers(config: QuoterConfig) {
        let result = calculate_electricity_cost(&config, 150., Sector::Residential).unwrap();

        assert_relative_eq!(result.cost_local, 190.);
        assert_relative_eq!(result.effective_rate_local, 190. / 150.);
        assert_relative_eq!(result.effective_rate_local, 1.2667, max_relative = 1e-4);
        assert_relative_eq!(result.cost_usd, 190. / 6.96);
        assert_relative_eq!(result.effective_rate_usd, 190. / 150. / 6.96);
        assert_eq!(result.rate_label, "Residential");
        assert!(result.breakdown.contains("Tier 2"));
        assert!(!result.breakdown.contains("Subsidised"));
    }

    #[rstest]
    fn should_bill_into_open_ended_tier(config: QuoterConfig) {
        let result = calculate_electricity_cost(&config, 200., Sector::Residential).unwrap();
        // 70 @ 1.0 + 80 @ 1.5 + 50 @ 2.0
        assert_relative_eq!(result.cost_local, 290.);
    }

    #[rstest]
    fn should_charge_exact_minimum_up_to_threshold(config: QuoterConfig) {
        for consumption in [0., 0.5, 5., 9.99, 10.] {
            let result =
                calculate_electricity_cost(&config, consumption, Sector::Residential).unwrap();
            assert_eq!(result.cost_local, 10.);
        }
        for consumption in [0., 12., 20.] {
            let result =
                calculate_electricity_cost(&config, consumption, Sector::Commercial).unwrap();
            assert_eq!(result.cost_local, 30.);
        }
    }

    #[rstest]
    fn should_apply_subsidy_at_threshold_but_not_above(config: QuoterConfig) {
        let at_threshold = calculate_electricity_cost(&config, 70., Sector::Residential).unwrap();
        assert_relative_eq!(at_threshold.cost_local, 70. * 0.75);
        assert!(at_threshold.breakdown.contains("Subsidised"));

        let above_threshold =
            calculate_electricity_cost(&config, 71., Sector::Residential).unwrap();
        assert_relative_eq!(above_threshold.cost_local, 71.5);
    }

    #[rstest]
    fn should_not_apply_subsidy_to_other_regimes(config: QuoterConfig) {
        let result = calculate_electricity_cost(&config, 50., Sector::Commercial).unwrap();
        assert_relative_eq!(result.cost_local, 75.);
    }

    #[rstest]
    fn should_bill_industrial_and_agricultural_at_flat_rate(config: QuoterConfig) {
        for sector in [Sector::Industrial, Sector::Agricultural] {
            let result = calculate_electricity_cost(&config, 1000., sector).unwrap();
            assert_relative_eq!(result.cost_local, 1200.);
            assert_relative_eq!(result.effective_rate_local, 1.2);
            assert_eq!(result.rate_label, "Industrial");
        }
    }

    #[rstest]
    fn should_define_zero_effective_rate_for_zero_consumption(config: QuoterConfig) {
        for sector in Sector::iter() {
            let result = calculate_electricity_cost(&config, 0., sector).unwrap();
            assert_eq!(result.effective_rate_local, 0.);
            assert_eq!(result.effective_rate_usd, 0.);
        }
        let industrial = calculate_electricity_cost(&config, 0., Sector::Industrial).unwrap();
        assert_eq!(industrial.cost_local, 0.);
    }

    #[rstest]
    #[case(-1.)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn should_reject_invalid_consumption(config: QuoterConfig, #[case] consumption: f64) {
        assert!(calculate_electricity_cost(&config, consumption, Sector::Residential).is_err());
    }

    #[rstest]
    fn should_not_decrease_cost_as_consumption_rises(mut config: QuoterConfig) {
        // a minimum charge no higher than the subsidised tier cost just above the threshold
        config.electricity_rates.residential.minimum_charge.amount = 7.5;

        for sector in Sector::iter() {
            let mut previous_cost = 0.;
            for step in 0..=1200 {
                let consumption = step as f64 * 0.5;
                let cost = calculate_electricity_cost(&config, consumption, sector)
                    .unwrap()
                    .cost_local;
                assert!(
                    cost >= previous_cost,
                    "cost fell from {previous_cost} to {cost} at {consumption} kWh for {sector:?}"
                );
                previous_cost = cost;
            }
        }
    }

    #[rstest]
    fn should_drop_residential_bill_just_above_minimum_charge_threshold(config: QuoterConfig) {
        // the subsidy applies to the tiered cost once the minimum charge no longer does
        let at_threshold = calculate_electricity_cost(&config, 10., Sector::Residential).unwrap();
        let just_above = calculate_electricity_cost(&config, 10.5, Sector::Residential).unwrap();

        assert_eq!(at_threshold.cost_local, 10.);
        assert_relative_eq!(just_above.cost_local, 10.5 * 0.75, max_relative = 1e-12);
        assert!(just_above.cost_local < at_threshold.cost_local);
    }

    #[rstest]
    fn should_give_identical_results_on_repeated_calls(config: QuoterConfig) {
        let first = calculate_electricity_cost(&config, 333.3, Sector::Public).unwrap();
        let second = calculate_electricity_cost(&config, 333.3, Sector::Public).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(0., 70., 70.)]
    #[case(1., 70., 70.)]
    #[case(71., 150., 80.)]
    fn should_measure_tier_width(#[case] from: f64, #[case] to: f64, #[case] expected: f64) {
        assert_eq!(tier_width(from, to), expected);
    }
}

use crate::input::{QuoterConfig, UNKNOWN_DEPARTMENT};
use thiserror::Error;

/// This module contains the lookups of regional data: solar radiation and transport rates.

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("Solar radiation table has no entry for the department nor a '{UNKNOWN_DEPARTMENT}' fallback")]
pub struct MissingRadiationError;

/// Average daily solar radiation (kWh/m2/day) for a department, falling back to the
/// `Desconocido` entry for departments the table does not list.
pub fn get_solar_radiation_by_department(
    config: &QuoterConfig,
    department: &str,
) -> Result<f64, MissingRadiationError> {
    config
        .solar_radiation
        .get(department)
        .or_else(|| config.solar_radiation.get(UNKNOWN_DEPARTMENT))
        .copied()
        .ok_or(MissingRadiationError)
}

pub fn has_radiation_for_department(config: &QuoterConfig, department: &str) -> bool {
    config.solar_radiation.contains_key(department)
}

/// Transport cost in local currency for a shipment weight. Departments without a rate cost
/// nothing to reach.
pub fn calculate_transport_cost(
    config: &QuoterConfig,
    total_weight_kg: f64,
    department: &str,
) -> f64 {
    let rate_per_kg = config
        .cost_factors
        .transport_cost_per_kg
        .get(department)
        .copied()
        .unwrap_or_default();
    total_weight_kg * rate_per_kg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::config;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("La Paz", 5.4)]
    #[case("Santa Cruz", 4.6)]
    #[case("Atlantis", 5.0)]
    fn should_look_up_radiation_with_fallback(
        config: QuoterConfig,
        #[case] department: &str,
        #[case] expected: f64,
    ) {
        assert_eq!(
            get_solar_radiation_by_department(&config, department),
            Ok(expected)
        );
    }

    #[rstest]
    fn should_error_without_fallback_entry(mut config: QuoterConfig) {
        config.solar_radiation.shift_remove(UNKNOWN_DEPARTMENT);
        assert_eq!(
            get_solar_radiation_by_department(&config, "Atlantis"),
            Err(MissingRadiationError)
        );
        assert_eq!(get_solar_radiation_by_department(&config, "La Paz"), Ok(5.4));
    }

    #[rstest]
    fn should_report_whether_department_is_listed(config: QuoterConfig) {
        assert!(has_radiation_for_department(&config, "La Paz"));
        assert!(!has_radiation_for_department(&config, "Atlantis"));
    }

    #[rstest]
    fn should_charge_transport_by_weight(config: QuoterConfig) {
        assert_eq!(calculate_transport_cost(&config, 100., "Santa Cruz"), 300.);
    }

    #[rstest]
    fn should_charge_nothing_for_department_without_rate(config: QuoterConfig) {
        assert_eq!(calculate_transport_cost(&config, 100., "Atlantis"), 0.);
    }
}

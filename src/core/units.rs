pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const HOURS_PER_DAY: u32 = 24;
/// Billing months are treated as 30 days throughout.
pub const DAYS_PER_BILLING_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;
pub const PERCENT: f64 = 100.;

pub fn daily_from_monthly(monthly_kwh: f64) -> f64 {
    monthly_kwh / DAYS_PER_BILLING_MONTH as f64
}

pub fn hourly_from_monthly(monthly_kwh: f64) -> f64 {
    daily_from_monthly(monthly_kwh) / HOURS_PER_DAY as f64
}

pub fn kilowatts_from_watts(watts: f64) -> f64 {
    watts / WATTS_PER_KILOWATT as f64
}

pub fn fraction_of_percent(percent: f64) -> f64 {
    percent / PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_spread_monthly_consumption_over_billing_days_and_hours() {
        assert_relative_eq!(daily_from_monthly(300.), 10.);
        assert_relative_eq!(hourly_from_monthly(720.), 1.);
    }

    #[rstest]
    #[case(550., 0.55)]
    #[case(0., 0.)]
    #[case(12_000., 12.)]
    fn should_convert_watts_to_kilowatts(#[case] watts: f64, #[case] expected_kw: f64) {
        assert_relative_eq!(kilowatts_from_watts(watts), expected_kw);
    }

    #[rstest]
    fn should_convert_percent_to_fraction() {
        assert_relative_eq!(fraction_of_percent(25.), 0.25);
    }
}

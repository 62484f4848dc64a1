use crate::input::{Sector, VariableCosts};
use serde::Serialize;

/// The sale price of a system built up from its base price, one fee at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub base_price: f64,
    pub margin: f64,
    pub commission: f64,
    pub specific_tax: f64,
    pub vat: f64,
    pub final_price: f64,
}

/// One fee of the cascade with the price reached after it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CascadeStep {
    pub label: &'static str,
    pub rate: f64,
    pub amount: f64,
    pub running_total: f64,
}

impl PriceBreakdown {
    /// The cascade as applied: margin, commission, specific tax then VAT.
    pub fn steps(&self, variable_costs: &VariableCosts) -> Vec<CascadeStep> {
        let fees = [
            ("Margin", variable_costs.margin, self.margin),
            ("Commission", variable_costs.commission, self.commission),
            ("Specific tax", variable_costs.specific_tax, self.specific_tax),
            ("VAT", variable_costs.vat, self.vat),
        ];
        let mut running_total = self.base_price;
        fees.into_iter()
            .map(|(label, rate, amount)| {
                running_total += amount;
                CascadeStep {
                    label,
                    rate,
                    amount,
                    running_total,
                }
            })
            .collect()
    }
}

/// Apply the fees to a base price in turn, each on the price reached after the fees before it.
pub fn apply_variable_costs(base_price: f64, variable_costs: &VariableCosts) -> PriceBreakdown {
    let VariableCosts {
        margin,
        commission,
        specific_tax,
        vat,
    } = *variable_costs;

    let after_margin = base_price * (1. + margin);
    let after_commission = after_margin * (1. + commission);
    let after_specific_tax = after_commission * (1. + specific_tax);
    let final_price = after_specific_tax * (1. + vat);

    PriceBreakdown {
        base_price,
        margin: after_margin - base_price,
        commission: after_commission - after_margin,
        specific_tax: after_specific_tax - after_commission,
        vat: final_price - after_specific_tax,
        final_price,
    }
}

pub fn usd_to_local(amount_usd: f64, exchange_rate: f64) -> f64 {
    amount_usd * exchange_rate
}

pub fn local_to_usd(amount_local: f64, exchange_rate: f64) -> f64 {
    amount_local / exchange_rate
}

/// Price adjustment by customer sector. Quotes report it but do not apply it.
pub fn get_sector_multiplier(sector: Sector) -> f64 {
    match sector {
        Sector::Residential => 1.,
        Sector::Commercial => 1.1,
        Sector::Industrial => 1.15,
        Sector::Public => 1.05,
        Sector::Agricultural => 0.95,
    }
}

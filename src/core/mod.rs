pub mod equipment;
pub mod pricing;
pub mod regional;
pub mod tariff;
pub mod units;

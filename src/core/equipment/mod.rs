pub mod elec_battery;
pub mod inverter;
pub mod panel;

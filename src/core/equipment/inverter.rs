use crate::input::{Inverter, Phase, QuoterConfig};
use ordered_float::OrderedFloat;

/// Select the inverter for a required power on the given phase.
///
/// The smallest inverter rated at or above `required_power_kw` is preferred. When none is large
/// enough, the inverter whose rating is closest to the requirement is used instead. Returns `None`
/// only when the catalog has no inverter for the phase.
///
/// Arguments:
/// * `config` - configuration holding the inverter catalog
/// * `required_power_kw` - power the inverter should handle, in kW
/// * `phase` - electrical phase of the installation
pub fn get_inverter_by_power_and_phase(
    config: &QuoterConfig,
    required_power_kw: f64,
    phase: Phase,
) -> Option<&Inverter> {
    let in_phase = move || {
        config
            .inverters
            .iter()
            .filter(move |inverter| inverter.phase == phase)
    };

    in_phase()
        .filter(|inverter| inverter.power_kw >= required_power_kw)
        .min_by_key(|inverter| OrderedFloat(inverter.power_kw))
        .or_else(|| {
            in_phase()
                .min_by_key(|inverter| OrderedFloat((inverter.power_kw - required_power_kw).abs()))
        })
}

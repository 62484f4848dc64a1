pub mod config_store;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod quote;

pub use crate::quote::QuoteResult;
use crate::config_store::ConfigStore;
use crate::errors::{OutputError, QuoteError};
use crate::input::{check_radiation_table, ingest_request, RadiationTable};
use crate::output::{write_quote_output, Output};
use crate::quote::calculate_quote;
use std::io::Read;
use tracing::{info, instrument};

/// Quote a request against the configuration the store holds for a region, and write the quote
/// to the output.
///
/// Arguments:
/// * `store` - where the region's configuration is read from
/// * `region_id` - the region whose configuration applies
/// * `request` - the quote request as JSON
/// * `radiation_table` - replaces the configuration's radiation table when provided
/// * `output` - where the quote files are written
#[instrument(skip_all, fields(region_id = %region_id))]
pub fn run_quote(
    store: impl ConfigStore,
    region_id: &str,
    request: impl Read,
    radiation_table: Option<RadiationTable>,
    output: impl Output,
) -> Result<QuoteResult, QuoteError> {
    let request = ingest_request(request)?;

    let mut config = store
        .fetch_quoter_config(region_id)
        .map_err(QuoteError::InvalidConfiguration)?
        .ok_or_else(|| QuoteError::MissingConfiguration(region_id.to_owned()))?;
    if let Some(radiation_table) = radiation_table {
        check_radiation_table(&radiation_table).map_err(QuoteError::InvalidConfiguration)?;
        config.solar_radiation = radiation_table;
    }

    let quote = calculate_quote(&config, &request)?;
    info!(
        "Quoted {} panels and a {} inverter at {:.2}",
        quote.panels.quantity, quote.inverter.model, quote.price.final_price
    );

    write_quote_output(output, &quote)
        .map_err(|err| QuoteError::ErrorInOutput(OutputError::new(err)))?;

    Ok(quote)
}

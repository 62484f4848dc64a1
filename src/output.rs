use crate::quote::QuoteResult;
use anyhow::anyhow;
use formatx::formatx;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file, named by filling `{}` placeholders in the template
/// with the location key and file extension.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_name(&self, location_key: &str, file_extension: &str) -> anyhow::Result<String> {
        formatx!(&self.file_template, location_key, file_extension).map_err(|err| {
            anyhow!(
                "Could not render output file template '{}': {err:?}",
                self.file_template
            )
        })
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.directory_path
                .join(self.file_name(location_key, file_extension)?),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct PriceBreakdownRow<'a> {
    step: &'a str,
    rate: Option<f64>,
    amount: f64,
    running_total: f64,
}

/// Write the quote as JSON and its price cascade as CSV.
pub fn write_quote_output(output: impl Output, quote: &QuoteResult) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    let mut json_writer = output.writer_for_location_key("quote", "json")?;
    serde_json::to_writer_pretty(&mut json_writer, quote)?;
    json_writer.flush()?;

    let mut csv_writer =
        csv::Writer::from_writer(output.writer_for_location_key("price_breakdown", "csv")?);
    csv_writer.serialize(PriceBreakdownRow {
        step: "Base price",
        rate: None,
        amount: quote.price.base_price,
        running_total: quote.price.base_price,
    })?;
    for step in &quote.price_steps {
        csv_writer.serialize(PriceBreakdownRow {
            step: step.label,
            rate: Some(step.rate),
            amount: step.amount,
            running_total: step.running_total,
        })?;
    }
    csv_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::config;
    use crate::input::{Phase, QuoteRequest, QuoterConfig, Sector};
    use crate::quote::calculate_quote;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Files = Rc<RefCell<IndexMap<String, Vec<u8>>>>;

    #[derive(Debug, Default)]
    struct MemoryOutput(Files);

    struct MemoryWriter {
        files: Files,
        name: String,
    }

    impl Write for MemoryWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.files
                .borrow_mut()
                .entry(self.name.clone())
                .or_default()
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Output for &MemoryOutput {
        fn writer_for_location_key(
            &self,
            location_key: &str,
            file_extension: &str,
        ) -> anyhow::Result<impl Write> {
            Ok(MemoryWriter {
                files: self.0.clone(),
                name: format!("{location_key}.{file_extension}"),
            })
        }
    }

    #[fixture]
    fn quote(config: QuoterConfig) -> QuoteResult {
        calculate_quote(
            &config,
            &QuoteRequest {
                monthly_consumption_kwh: 300.,
                department: "Santa Cruz".to_owned(),
                sector: Sector::Commercial,
                phase: Phase::SinglePhase,
                include_battery: true,
                panel_model: None,
            },
        )
        .unwrap()
    }

    #[rstest]
    fn should_write_quote_json_and_price_breakdown_csv(quote: QuoteResult) {
        let output = MemoryOutput::default();

        write_quote_output(&output, &quote).unwrap();

        let files = output.0.borrow();
        assert_eq!(
            files.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["quote.json", "price_breakdown.csv"]
        );

        let json: serde_json::Value = serde_json::from_slice(&files["quote.json"]).unwrap();
        assert_eq!(json["inverter"]["model"], "SUN-3K");
        assert_eq!(json["current_bill"]["rate_label"], "Commercial");

        let csv = String::from_utf8(files["price_breakdown.csv"].clone()).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "step,rate,amount,running_total");
        assert!(lines[1].starts_with("Base price,,"));
        assert!(lines[2].starts_with("Margin,0.4,"));
        assert!(lines[5].starts_with("VAT,0.13,"));
        assert_eq!(lines.len(), 6);
    }

    #[rstest]
    fn should_skip_writing_to_sink(quote: QuoteResult) {
        assert!(write_quote_output(SinkOutput, &quote).is_ok());
    }

    #[rstest]
    fn should_render_file_names_from_template() {
        let output = FileOutput::new(PathBuf::from("out"), "demo__{}.{}".to_owned());
        assert_eq!(
            output.file_name("quote", "json").unwrap(),
            "demo__quote.json"
        );
    }
}

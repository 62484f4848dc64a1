extern crate energy_quote;

use clap::Parser;
use energy_quote::config_store::{JsonDirectoryStore, DEFAULT_REGION_ID};
use energy_quote::input::radiation_table_from_csv;
use energy_quote::output::FileOutput;
use energy_quote::run_quote;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct QuoteArgs {
    #[arg(help = "Path to quote request in .json format")]
    request_file: String,
    #[arg(
        long,
        default_value = ".",
        help = "Directory holding one configuration document per region"
    )]
    config_dir: String,
    #[arg(long, default_value = DEFAULT_REGION_ID, help = "Region whose configuration applies")]
    region: String,
    #[arg(
        long,
        short,
        help = "Path to solar radiation table in .csv format, replacing the configured one"
    )]
    radiation_file: Option<String>,
    #[arg(
        long,
        short,
        help = "Directory for quote output files (defaults to <request>__quote)"
    )]
    output_dir: Option<String>,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = QuoteArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::TRACE);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let request_file = args.request_file.as_str();
    let request_file_ext = Path::new(request_file)
        .extension()
        .and_then(OsStr::to_str);
    let request_file_stem = match request_file_ext {
        Some(ext) => &request_file[..(request_file.len() - ext.len() - 1)],
        None => request_file,
    };

    let output_path = match args.output_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => PathBuf::from(format!("{request_file_stem}__quote")),
    };
    fs::create_dir_all(&output_path)?;
    let request_file_name = Path::new(request_file_stem)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("request");
    let file_output = FileOutput::new(
        output_path.clone(),
        format!("{request_file_name}__{{}}.{{}}"),
    );

    let radiation_table = args
        .radiation_file
        .as_ref()
        .map(|file| radiation_table_from_csv(File::open(file)?))
        .transpose()?;

    let quote = run_quote(
        JsonDirectoryStore::new(&args.config_dir),
        &args.region,
        BufReader::new(File::open(Path::new(request_file))?),
        radiation_table,
        &file_output,
    )?;

    debug!("Wrote quote files to {}", output_path.display());
    println!(
        "Final price: {:.2} ({:.2} USD)",
        quote.price.final_price, quote.final_price_usd
    );
    if quote.battery_unavailable {
        println!("No battery configuration can sustain this load; manual review is needed.");
    }

    Ok(())
}

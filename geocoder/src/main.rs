use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geocoder::domain::MAX_BATCH_SIZE;
use geocoder::esri::{EsriClient, EsriConfig};
use geocoder::geocode::CascadeCoordinator;
use geocoder::nominatim::{NominatimClient, NominatimConfig};
use geocoder::pipeline::{RecordPipeline, write_records};

/// Geocode the "location" field of JSONL records.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSONL file to geocode. Each record needs a "location" field; other
    /// fields are passed through. Records must not already contain lat, lon,
    /// result_name, geocode_score or geocoder.
    input: PathBuf,

    /// Output JSONL file to write geocoded records to
    #[arg(short, long)]
    output: PathBuf,

    /// Contact email sent with every Nominatim request
    #[arg(long, env = "GEOCODER_CONTACT_EMAIL")]
    contact_email: String,

    /// Base URL of the ESRI GeocodeServer
    #[arg(long, env = "GEOCODER_REGIONAL_URL")]
    regional_url: Option<String>,

    /// Base URL of the Nominatim instance
    #[arg(long, env = "GEOCODER_GLOBAL_URL")]
    global_url: Option<String>,

    /// Addresses per ESRI request
    #[arg(
        long,
        default_value_t = MAX_BATCH_SIZE as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_BATCH_SIZE as u64)
    )]
    batch_size: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut esri_config = EsriConfig::new()
        .with_batch_size(cli.batch_size as usize)
        .with_timeout(cli.timeout_secs);
    if let Some(url) = cli.regional_url {
        esri_config = esri_config.with_base_url(url);
    }

    let mut nominatim_config =
        NominatimConfig::new(cli.contact_email).with_timeout(cli.timeout_secs);
    if let Some(url) = cli.global_url {
        nominatim_config = nominatim_config.with_base_url(url);
    }

    let cascade = CascadeCoordinator::new(
        EsriClient::new(esri_config)?,
        NominatimClient::new(nominatim_config)?,
    );
    let pipeline = RecordPipeline::new(cascade);

    let input = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let collected = pipeline.collect(BufReader::new(input))?;
    let (records, summary) = pipeline.enrich(collected).await?;

    // Only create the output once every lookup has succeeded.
    let output = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    write_records(&records, BufWriter::new(output))?;

    info!(output = %cli.output.display(), %summary, "wrote geocoded records");
    Ok(())
}

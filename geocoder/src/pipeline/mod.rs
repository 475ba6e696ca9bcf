//! JSONL record enrichment.
//!
//! Two passes: first every input record is parsed and validated (reserved
//! fields, `location`, address shape) without touching the network; then
//! the collected addresses are geocoded in one cascade run and the results
//! are folded back into the records by position.

mod error;
mod record;

use std::fmt;
use std::io::{BufRead, Write};
use std::pin::pin;

use futures::TryStreamExt;
use tracing::info;

use crate::domain::Provider;
use crate::geocode::{BatchGeocoder, CascadeCoordinator, GeocodeError, SingleGeocoder};

pub use error::PipelineError;
pub use record::{LOCATION_FIELD, RESERVED_FIELDS, Record, apply_result, parse_record};

/// Validated input: the records and their addresses, in input order.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    records: Vec<Record>,
    addresses: Vec<String>,
}

impl Collected {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Counts from one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub total: usize,
    pub regional: usize,
    pub global: usize,
    pub unmatched: usize,
}

impl EnrichSummary {
    fn record_match(&mut self, provider: Provider) {
        match provider {
            Provider::Regional => self.regional += 1,
            Provider::Global => self.global += 1,
        }
    }
}

impl fmt::Display for EnrichSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records: {} regional, {} global, {} unmatched",
            self.total, self.regional, self.global, self.unmatched
        )
    }
}

/// Reads records, geocodes their `location`, and writes them back out.
#[derive(Debug, Clone)]
pub struct RecordPipeline<R, G> {
    cascade: CascadeCoordinator<R, G>,
}

impl<R: BatchGeocoder, G: SingleGeocoder> RecordPipeline<R, G> {
    pub fn new(cascade: CascadeCoordinator<R, G>) -> Self {
        Self { cascade }
    }

    pub fn cascade(&self) -> &CascadeCoordinator<R, G> {
        &self.cascade
    }

    /// Validation pass. Reads every line; nothing is geocoded.
    ///
    /// Blank lines are skipped. The first invalid record aborts the run.
    pub fn collect<I: BufRead>(&self, input: I) -> Result<Collected, PipelineError> {
        let mut collected = Collected::default();

        for (idx, text) in input.lines().enumerate() {
            let line = idx + 1;
            let text = text?;
            if text.trim().is_empty() {
                continue;
            }

            let (record, address) = parse_record(line, &text)?;
            self.cascade
                .validate_address(&address)
                .map_err(|e| match e {
                    GeocodeError::MalformedAddress(source) => {
                        PipelineError::MalformedAddress { line, source }
                    }
                    other => PipelineError::Geocode(other),
                })?;

            collected.records.push(record);
            collected.addresses.push(address);
        }

        info!(records = collected.len(), "collected input records");
        Ok(collected)
    }

    /// Enrichment pass. Geocodes every address and writes the reserved
    /// fields onto records that got a result. Records nobody matched are
    /// returned untouched.
    pub async fn enrich(
        &self,
        collected: Collected,
    ) -> Result<(Vec<Record>, EnrichSummary), PipelineError> {
        let Collected {
            mut records,
            addresses,
        } = collected;
        let mut summary = EnrichSummary {
            total: records.len(),
            ..EnrichSummary::default()
        };

        let mut results = pin!(self.cascade.geocode(&addresses));
        let mut position = 0;
        while let Some(result) = results.try_next().await? {
            match result {
                Some(result) => {
                    summary.record_match(result.provider);
                    apply_result(&mut records[position], &result);
                }
                None => summary.unmatched += 1,
            }
            position += 1;
        }
        debug_assert_eq!(position, records.len());

        info!(%summary, "geocoding finished");
        Ok((records, summary))
    }

    /// Run both passes and write the enriched records as JSONL.
    ///
    /// Nothing is written unless every lookup succeeded.
    pub async fn run<I: BufRead, W: Write>(
        &self,
        input: I,
        output: W,
    ) -> Result<EnrichSummary, PipelineError> {
        let collected = self.collect(input)?;
        let (records, summary) = self.enrich(collected).await?;
        write_records(&records, output)?;
        Ok(summary)
    }
}

/// Write records as JSONL, one object per line.
pub fn write_records<W: Write>(records: &[Record], mut output: W) -> Result<(), PipelineError> {
    for record in records {
        serde_json::to_writer(&mut output, record)?;
        output.write_all(b"\n")?;
    }
    output.flush()?;
    Ok(())
}

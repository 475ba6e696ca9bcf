//! Address geocoding pipeline.
//!
//! Enriches JSONL records that carry a free-form `location` with
//! coordinates. Addresses go to the St. Louis City ESRI locator in batches
//! first; anything it cannot match falls back to Nominatim, one paced
//! request at a time.

pub mod domain;
pub mod esri;
pub mod geocode;
pub mod nominatim;
pub mod pipeline;

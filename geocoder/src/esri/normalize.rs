//! Address normalization for the regional locator.
//!
//! The St. Louis City locator assumes every input is inside the city, and
//! matches worse when the city is spelled out. Strip it when present.

/// Spellings of the locator's home city, compared case-insensitively.
const HOME_CITY_SPELLINGS: [&str; 3] = ["st. louis", "st louis", "saint louis"];

/// The address has no comma separating street from locality.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed address {0:?}: expected \"street, locality\"")]
pub struct MissingLocality(pub String);

/// Split `address` on its first comma and drop the locality if it names the
/// home city.
///
/// Any other locality leaves the address unchanged. An address without a
/// comma is rejected.
pub fn strip_home_city(address: &str) -> Result<&str, MissingLocality> {
    let (street, locality) = address
        .split_once(',')
        .ok_or_else(|| MissingLocality(address.to_string()))?;

    let locality = locality.trim();
    if HOME_CITY_SPELLINGS
        .iter()
        .any(|city| locality.eq_ignore_ascii_case(city))
    {
        Ok(street)
    } else {
        Ok(address)
    }
}

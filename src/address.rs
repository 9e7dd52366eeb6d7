use crate::geocode::model::{AddressComponent, GeocodeResult};

const CITY_TYPE: &str = "administrative_area_level_2";
const STATE_TYPE: &str = "administrative_area_level_1";
const AREA_TYPES: [&str; 2] = ["sublocality_level_1", "locality"];

/// Address labels picked out of a geocoding result.
///
/// Every field is either empty or the `long_name` of exactly one component.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub formatted_address: String,
    pub city: String,
    pub area: String,
    pub state: String,
}

impl NormalizedAddress {
    pub fn is_empty(&self) -> bool {
        self.formatted_address.is_empty()
            && self.city.is_empty()
            && self.area.is_empty()
            && self.state.is_empty()
    }
}

/// Resolve a geocoding result into city, area and state.
///
/// Never fails: a label without a qualifying component stays empty.
pub fn resolve(result: &GeocodeResult) -> NormalizedAddress {
    let components = &result.components;
    NormalizedAddress {
        formatted_address: result.formatted_address.clone(),
        city: extract_city(components),
        area: extract_area(components),
        state: extract_state(components),
    }
}

/// The first component whose primary type is `administrative_area_level_2`.
///
/// Only the first tag is looked at, unlike [`extract_area`].
pub fn extract_city(components: &[AddressComponent]) -> String {
    first_with_primary_type(components, CITY_TYPE)
}

/// The first component tagged `sublocality_level_1` or `locality` in any position.
pub fn extract_area(components: &[AddressComponent]) -> String {
    components.iter()
        .filter(|component| !component.types.is_empty())
        .find(|component| {
            component.types.iter().any(|t| AREA_TYPES.contains(&t.as_str()))
        })
        .map(|component| component.long_name.clone())
        .unwrap_or_default()
}

/// The first component whose primary type is `administrative_area_level_1`.
pub fn extract_state(components: &[AddressComponent]) -> String {
    first_with_primary_type(components, STATE_TYPE)
}

fn first_with_primary_type(components: &[AddressComponent], wanted: &str) -> String {
    components.iter()
        .find(|component| component.primary_type() == Some(wanted))
        .map(|component| component.long_name.clone())
        .unwrap_or_default()
}

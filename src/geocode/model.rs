use serde::Deserialize;

/// a geographic point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// the `latlng` query value expected by the provider
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// One typed piece of a geocoded address, as the provider sends it.
///
/// `types` is ordered, the first tag is the most specific one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(rename = "address_components", default)]
    pub components: Vec<AddressComponent>,
}

/// Response envelope of the reverse geocoding endpoint
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

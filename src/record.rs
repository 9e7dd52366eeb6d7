use std::path::Path;
use serde::Serialize;
use crate::food::FoodRequest;

/// One exported row of the food-request list
#[derive(Debug, Serialize)]
pub struct Record {
    key: String,
    #[serde(rename = "foodName")]
    food_name: String,
    raw: String,
}

impl Record {
    pub fn from_food_request(request: &FoodRequest) -> Self {
        Self {
            key: request.key().unwrap_or_default(),
            food_name: request.display_name(),
            raw: request.raw().to_string(),
        }
    }
}

/// write the list to a CSV file, keeping the service's order
pub fn save_records(requests: &[FoodRequest], save_path: impl AsRef<Path>) -> color_eyre::Result<()> {
    if let Some(parent) = save_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::Writer::from_path(save_path)?;
    for request in requests {
        wtr.serialize(Record::from_food_request(request))?;
    }
    wtr.flush()?;
    Ok(())
}

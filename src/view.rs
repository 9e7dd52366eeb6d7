use std::io::Write;
use crate::address::NormalizedAddress;
use crate::food::FoodRequestList;
use crate::geocode::model::LatLng;

/// The info window floats this far north of the marker.
pub const INFO_WINDOW_LAT_OFFSET: f64 = 0.0018;

/// Inputs handed to the map view by its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct MapProps {
    /// `None` until the position is known; nothing but a placeholder is drawn meanwhile.
    pub center: Option<LatLng>,
    pub zoom: u8,
    pub height: String,
}

/// State the view draws from. Each field is replaced as a whole.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub address: NormalizedAddress,
    /// Where the map opened. Later center changes do not move it.
    pub map_position: Option<LatLng>,
    pub marker: Option<LatLng>,
    pub food_requests: FoodRequestList,
}

impl ViewState {
    pub fn new(props: &MapProps) -> Self {
        Self {
            address: NormalizedAddress::default(),
            map_position: props.center,
            marker: props.center,
            food_requests: FoodRequestList::default(),
        }
    }
}

/// User-facing events raised by the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    InfoWindowClosed,
}

/// Everything the re-render decision looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub marker_lat: Option<f64>,
    pub center_lat: Option<f64>,
    pub address: NormalizedAddress,
    pub food_requests_generation: u64,
}

impl ViewSnapshot {
    pub fn capture(props: &MapProps, state: &ViewState) -> Self {
        Self {
            marker_lat: state.marker.map(|m| m.lat),
            center_lat: props.center.map(|c| c.lat),
            address: state.address.clone(),
            food_requests_generation: state.food_requests.generation(),
        }
    }
}

/// Decide whether going from `prev` to `next` needs a redraw.
///
/// A redraw happens when the marker has drifted from the current center, when
/// any address field changed, or when the food-request list was replaced.
/// A change of the center latitude alone does not redraw: the marker is pinned
/// at the initial center and the map widget keeps its own viewport.
pub fn should_render(prev: &ViewSnapshot, next: &ViewSnapshot) -> bool {
    prev.marker_lat != prev.center_lat
        || prev.address != next.address
        || prev.food_requests_generation != next.food_requests_generation
}

/// Draw the view as text.
pub fn render(props: &MapProps, state: &ViewState, out: &mut impl Write) -> std::io::Result<()> {
    let Some(center) = props.center else {
        return writeln!(out, "[ map not ready, height {} ]", props.height);
    };

    // a map that was not ready when the view opened starts at the first known center
    let position = state.map_position.unwrap_or(center);

    let requests = &state.food_requests;
    writeln!(out, "Available Food Requests: {}", requests.len())?;
    for request in requests.items() {
        writeln!(out, "  - {}", request.display_name())?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Map [zoom {}, height {}] centered at {:.6}, {:.6}",
        props.zoom, props.height, position.lat, position.lng
    )?;
    if let Some(marker) = state.marker {
        writeln!(out, "  Marker at {:.6}, {:.6}", marker.lat, marker.lng)?;
        writeln!(
            out,
            "  Info window at {:.6}, {:.6}: {}",
            marker.lat + INFO_WINDOW_LAT_OFFSET,
            marker.lng,
            state.address.formatted_address
        )?;
    }
    let address = &state.address;
    writeln!(out, "  City: {}", address.city)?;
    writeln!(out, "  Area: {}", address.area)?;
    writeln!(out, "  State: {}", address.state)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;
    use crate::food::FoodRequest;

    fn props(center: Option<LatLng>) -> MapProps {
        MapProps {
            center,
            zoom: 15,
            height: "400px".to_string(),
        }
    }

    fn rendered(props: &MapProps, state: &ViewState) -> String {
        let mut out = Vec::new();
        render(props, state, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn snapshot(marker_lat: Option<f64>, center_lat: Option<f64>, city: &str, generation: u64) -> ViewSnapshot {
        ViewSnapshot {
            marker_lat,
            center_lat,
            address: NormalizedAddress {
                city: city.to_string(),
                ..Default::default()
            },
            food_requests_generation: generation,
        }
    }

    #[test]
    fn placeholder_without_center() {
        let props = props(None);
        let state = ViewState::new(&props);
        assert_eq!(rendered(&props, &state), "[ map not ready, height 400px ]\n");
    }

    #[test]
    fn full_view() {
        let props = props(Some(LatLng::new(37.7596, -122.4269)));
        let mut state = ViewState::new(&props);
        state.address = NormalizedAddress {
            formatted_address: "Dolores Park, San Francisco, CA, USA".to_string(),
            city: "San Francisco County".to_string(),
            area: "San Francisco".to_string(),
            state: "California".to_string(),
        };
        state.food_requests.replace(vec![
            FoodRequest::new(json!({ "id": 1, "foodName": "Rice" })),
            FoodRequest::new(json!({ "id": 2 })),
        ]);

        let text = rendered(&props, &state);
        assert!(text.starts_with("Available Food Requests: 2\n  - Rice\n  - {\"id\":2}\n"), "{}", text);
        assert!(text.contains("Map [zoom 15, height 400px] centered at 37.759600, -122.426900"));
        assert!(text.contains("Marker at 37.759600, -122.426900"));
        assert!(text.contains("Info window at 37.761400, -122.426900: Dolores Park, San Francisco, CA, USA"));
        assert!(text.contains("City: San Francisco County\n  Area: San Francisco\n  State: California\n"));
    }

    #[test]
    fn unchanged_inputs_skip_render() {
        let prev = snapshot(Some(1.0), Some(1.0), "Kings County", 1);
        assert!(!should_render(&prev, &prev.clone()));
    }

    #[test]
    fn address_or_list_change_renders() {
        let prev = snapshot(Some(1.0), Some(1.0), "", 0);
        assert!(should_render(&prev, &snapshot(Some(1.0), Some(1.0), "Kings County", 0)));
        assert!(should_render(&prev, &snapshot(Some(1.0), Some(1.0), "", 1)));
    }

    #[test]
    fn drifted_marker_renders() {
        let prev = snapshot(Some(1.0), Some(2.0), "", 0);
        assert!(should_render(&prev, &prev.clone()));
    }

    #[test]
    fn center_change_alone_does_not_render() {
        let prev = snapshot(Some(1.0), Some(1.0), "", 0);
        assert!(!should_render(&prev, &snapshot(Some(1.0), Some(5.0), "", 0)));
    }

    #[test]
    fn not_ready_center_matches_missing_marker() {
        let prev = snapshot(None, None, "", 0);
        assert!(!should_render(&prev, &prev.clone()));
        assert!(should_render(&prev, &snapshot(None, None, "", 1)));
    }
}

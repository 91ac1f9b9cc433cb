//! OSM ingestion from Overpass API JSON exports
//!
//! Expects the output of a `way["highway"](bbox); (._;>;); out body;` query:
//! node elements carry coordinates, way elements carry node lists and tags.

use hashbrown::HashMap;

use geo::Point;
use log::{debug, info};
use serde::Deserialize;

use super::builder::{Flow, RoadNetworkBuilder, WayAccess};
use crate::{Error, model::RoadNetwork};

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Builds a road network from an Overpass JSON document.
///
/// # Errors
///
/// Returns an error for malformed JSON or ways referencing nodes absent
/// from the document.
pub fn network_from_overpass_json(json: &str) -> Result<RoadNetwork, Error> {
    let response: OverpassResponse = serde_json::from_str(json)?;

    let mut builder = RoadNetworkBuilder::new();
    let mut ways = Vec::new();
    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                builder.add_node(id, Point::new(lon, lat));
            }
            Element::Way { id, nodes, tags } => ways.push((id, nodes, tags)),
            Element::Other => {}
        }
    }

    let mut skipped = 0usize;
    for (id, nodes, tags) in &ways {
        if nodes.len() < 2 {
            skipped += 1;
            continue;
        }
        let Some(access) = classify_way(tags) else {
            debug!("Way {id} is neither walkable nor driveable");
            skipped += 1;
            continue;
        };
        builder.add_way(nodes, access)?;
    }

    let network = builder.build();
    info!(
        "Loaded road network: {} nodes, {} edges ({} of {} ways skipped)",
        network.node_count(),
        network.edge_count(),
        skipped,
        ways.len()
    );
    Ok(network)
}

/// Walk/drive permissions of a way from its OSM tags, `None` if the way is
/// unusable by either mode.
pub fn classify_way(tags: &HashMap<String, String>) -> Option<WayAccess> {
    let walk = if is_walkable(tags) {
        walk_flow(tags)
    } else {
        Flow::Closed
    };
    let drive = if is_driveable(tags) {
        drive_flow(tags)
    } else {
        Flow::Closed
    };
    if walk == Flow::Closed && drive == Flow::Closed {
        return None;
    }
    Some(WayAccess {
        walk,
        drive,
        speed_limit: tag(tags, "maxspeed").and_then(parse_speed),
    })
}

fn tag<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

fn usable_highway(tags: &HashMap<String, String>) -> Option<&str> {
    tag(tags, "highway").filter(|hw| !hw.is_empty() && *hw != "construction" && *hw != "proposed")
}

fn is_driveable(tags: &HashMap<String, String>) -> bool {
    let Some(highway) = usable_highway(tags) else {
        return false;
    };
    let motor = ["motor_vehicle", "motorcar", "vehicle"].map(|key| tag(tags, key));

    if matches!(
        highway,
        "footway" | "path" | "pedestrian" | "steps" | "bridleway" | "cycleway" | "corridor"
    ) {
        return motor.contains(&Some("yes"));
    }
    !motor.contains(&Some("no"))
}

fn is_walkable(tags: &HashMap<String, String>) -> bool {
    usable_highway(tags).is_some() && tag(tags, "foot") != Some("no")
}

fn explicit_flow(value: Option<&str>) -> Option<Flow> {
    match value? {
        "yes" | "true" | "1" => Some(Flow::Forward),
        "-1" => Some(Flow::Backward),
        "no" | "false" | "0" => Some(Flow::Both),
        _ => None,
    }
}

fn drive_flow(tags: &HashMap<String, String>) -> Flow {
    if let Some(flow) = explicit_flow(tag(tags, "oneway")) {
        return flow;
    }
    if matches!(tag(tags, "junction"), Some("roundabout" | "circular")) {
        return Flow::Forward;
    }
    match tag(tags, "highway") {
        Some("motorway") => Flow::Forward,
        Some(hw) if hw.len() > 5 && hw.ends_with("_link") => Flow::Forward,
        _ => Flow::Both,
    }
}

fn walk_flow(tags: &HashMap<String, String>) -> Flow {
    if let Some(flow) = explicit_flow(tag(tags, "oneway:foot")) {
        return flow;
    }
    match tag(tags, "conveying") {
        Some("forward") => Flow::Forward,
        Some("backward") => Flow::Backward,
        _ => Flow::Both,
    }
}

/// Parses `maxspeed` values like `"50"` or `"30 mph"` into km/h
fn parse_speed(raw: &str) -> Option<f64> {
    let mut parts = raw.split_whitespace();
    let value: f64 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some("mph") => Some(value * 1.609_344),
        None => Some(value),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TravelMode;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn footway_is_walk_only() {
        let access = classify_way(&tags(&[("highway", "footway")])).unwrap();
        assert_eq!(access.walk, Flow::Both);
        assert_eq!(access.drive, Flow::Closed);
    }

    #[test]
    fn oneway_and_roundabout_rules() {
        let oneway = classify_way(&tags(&[("highway", "residential"), ("oneway", "-1")])).unwrap();
        assert_eq!(oneway.drive, Flow::Backward);
        assert_eq!(oneway.walk, Flow::Both);

        let roundabout =
            classify_way(&tags(&[("highway", "primary"), ("junction", "roundabout")])).unwrap();
        assert_eq!(roundabout.drive, Flow::Forward);

        let link = classify_way(&tags(&[("highway", "motorway_link")])).unwrap();
        assert_eq!(link.drive, Flow::Forward);
    }

    #[test]
    fn closed_ways_are_dropped() {
        assert!(classify_way(&tags(&[("highway", "construction")])).is_none());
        assert!(classify_way(&tags(&[("building", "yes")])).is_none());
        assert!(classify_way(&tags(&[("highway", "footway"), ("foot", "no")])).is_none());
    }

    #[test]
    fn speed_parsing() {
        assert_eq!(parse_speed("50"), Some(50.0));
        assert!((parse_speed("30 mph").unwrap() - 48.280_32).abs() < 1e-6);
        assert_eq!(parse_speed("signals"), None);
    }

    #[test]
    fn parses_overpass_document() {
        let doc = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
                {"type": "node", "id": 2, "lat": 0.0, "lon": 0.001},
                {"type": "node", "id": 3, "lat": 0.001, "lon": 0.001},
                {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "residential"}},
                {"type": "way", "id": 11, "nodes": [2, 3], "tags": {"highway": "footway"}},
                {"type": "relation", "id": 99}
            ]
        }"#;
        let network = network_from_overpass_json(doc).unwrap();
        assert_eq!(network.node_count(), 3);
        assert_eq!(network.edge_count(), 4);

        let a = network.nearest_node(&Point::new(0.0, 0.0), TravelMode::Drive).unwrap();
        let walk = network.shortest_paths(a, TravelMode::Walk, None);
        let drive = network.shortest_paths(a, TravelMode::Drive, None);
        assert_eq!(walk.len(), 3);
        assert_eq!(drive.len(), 2);
    }

    #[test]
    fn dangling_way_reference_is_an_error() {
        let doc = r#"{"elements": [
            {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
            {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "residential"}}
        ]}"#;
        assert!(matches!(
            network_from_overpass_json(doc),
            Err(Error::InvalidData(_))
        ));
    }
}

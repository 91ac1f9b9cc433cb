use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::{BusStop, Error};

/// Converts placed stops to a `GeoJSON` `FeatureCollection` of points.
pub fn stops_to_geojson(stops: &[BusStop]) -> Result<FeatureCollection, Error> {
    let features = stops
        .iter()
        .map(stop_feature)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn stops_to_geojson_string(stops: &[BusStop]) -> Result<String, Error> {
    serde_json::to_string(&stops_to_geojson(stops)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn stop_feature(stop: &BusStop) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&stop.site));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "stop_id": stop.id,
            "student_count": stop.students.len(),
            "students": stop.students,
            "access": stop.access,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

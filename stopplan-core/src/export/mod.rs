pub mod geojson;

pub use self::geojson::{stops_to_geojson, stops_to_geojson_string};

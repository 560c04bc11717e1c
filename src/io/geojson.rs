// src/io/geojson.rs
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};
use std::path::Path;

use crate::error::{Result, ZoningError};
use crate::types::{Polygon, ZonationResult};

fn number(value: f64) -> JsonValue {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn polygon_feature(
    id: usize,
    polygon: &Polygon,
    mut properties: Map<String, JsonValue>,
) -> Feature {
    properties.insert("area".to_string(), number(polygon.area()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![polygon.closed_ring()]))),
        id: Some(geojson::feature::Id::Number(Number::from(id))),
        properties: Some(properties),
        foreign_members: None,
    }
}

impl ZonationResult {
    /// One feature for the boundary (if any) followed by one per zone.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features = Vec::with_capacity(self.zones.len() + 1);

        if let Some(boundary) = &self.boundary {
            let mut properties = Map::new();
            properties.insert("kind".to_string(), JsonValue::from("boundary"));
            features.push(polygon_feature(features.len(), boundary, properties));
        }

        for zone in &self.zones {
            let mut properties = Map::new();
            properties.insert("kind".to_string(), JsonValue::from("zone"));
            properties.insert("level".to_string(), JsonValue::from(zone.level));
            properties.insert("min".to_string(), number(zone.range.0));
            properties.insert("max".to_string(), number(zone.range.1));
            features.push(polygon_feature(features.len(), &zone.polygon, properties));
        }

        let mut foreign_members = Map::new();
        foreign_members.insert(
            "has_boundary".to_string(),
            JsonValue::Bool(self.boundary.is_some()),
        );
        foreign_members.insert("zone_count".to_string(), JsonValue::from(self.zones.len()));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the result as GeoJSON or plain JSON depending on `format`.
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let contents = match format {
            OutputFormat::Json => self.to_json_string()?,
            OutputFormat::GeoJson => self.to_geojson_string()?,
        };
        std::fs::write(path, contents).map_err(|source| ZoningError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Serialization for zonation results
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(name = "geojson")]
    GeoJson,
}

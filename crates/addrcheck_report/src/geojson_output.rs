use std::fs;
use std::path::Path;

use anyhow::Context;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::{json, Map};

use addrcheck_model::Dataset;

/// Serializes the annotated dataset as a GeoJSON FeatureCollection. Every
/// original attribute round-trips unchanged alongside the added `Remark`
/// column; a CRS label is emitted as the OGC named-CRS foreign member.
pub fn write_annotated_geojson<P: AsRef<Path>>(path: P, dataset: &Dataset) -> anyhow::Result<()> {
    let collection = to_feature_collection(dataset);
    let serialized = GeoJson::FeatureCollection(collection).to_string();
    fs::write(&path, serialized)
        .with_context(|| format!("write annotated geojson to {}", path.as_ref().display()))?;
    Ok(())
}

fn to_feature_collection(dataset: &Dataset) -> FeatureCollection {
    let features = dataset
        .rows
        .iter()
        .map(|row| Feature {
            bbox: None,
            geometry: row
                .geometry
                .as_ref()
                .map(|geometry| geojson::Geometry::new(geojson::Value::from(geometry))),
            id: None,
            properties: Some(row.properties.clone()),
            foreign_members: None,
        })
        .collect();

    let foreign_members = dataset.crs.as_deref().map(|crs| {
        let mut members = Map::new();
        members.insert(
            "crs".to_string(),
            json!({"type": "name", "properties": {"name": crs}}),
        );
        members
    });

    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

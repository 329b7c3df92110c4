use std::fs::File;
use std::io::Read;
use std::path::Path;

use addrcheck_model::{AddressRow, Dataset};
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("input path does not exist: {0}")]
    MissingPath(String),
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open archive {path}: {source}")]
    ZipArchive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive contains no GeoJSON member; members found: {}", members.join(", "))]
    NoDatasetMember { members: Vec<String> },
    #[error("malformed GeoJSON: {0}")]
    Json(#[from] geojson::Error),
    #[error("input is not a GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("feature {index} carries an unconvertible geometry: {message}")]
    Geometry { index: usize, message: String },
}

/// Loads an address-point dataset from a single GeoJSON file or a zip archive
/// containing one. Legacy container formats must be converted to GeoJSON
/// upstream; they are reported as unsupported, never guessed at.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetLoadError> {
    if !path.exists() {
        return Err(DatasetLoadError::MissingPath(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "geojson" | "json" => read_file(path)?,
        "zip" => read_zip_member(path)?,
        other => return Err(DatasetLoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = parse_feature_collection(&text)?;
    info!(
        rows = dataset.rows.len(),
        columns = dataset.columns.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn read_file(path: &Path) -> Result<String, DatasetLoadError> {
    std::fs::read_to_string(path).map_err(|source| DatasetLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Extracts the first `.geojson`/`.json` member of the archive.
fn read_zip_member(path: &Path) -> Result<String, DatasetLoadError> {
    let file = File::open(path).map_err(|source| DatasetLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|source| DatasetLoadError::ZipArchive {
            path: path.display().to_string(),
            source,
        })?;

    let member_names: Vec<String> = archive.file_names().map(String::from).collect();
    let target = member_names
        .iter()
        .find(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".geojson") || lower.ends_with(".json")
        })
        .cloned()
        .ok_or(DatasetLoadError::NoDatasetMember {
            members: member_names.clone(),
        })?;

    let mut member = archive
        .by_name(&target)
        .map_err(|source| DatasetLoadError::ZipArchive {
            path: path.display().to_string(),
            source,
        })?;
    let mut text = String::new();
    member
        .read_to_string(&mut text)
        .map_err(|source| DatasetLoadError::Io {
            path: format!("{}!{}", path.display(), target),
            source,
        })?;
    Ok(text)
}

pub fn parse_feature_collection(text: &str) -> Result<Dataset, DatasetLoadError> {
    let geojson: GeoJson = text.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DatasetLoadError::NotAFeatureCollection);
    };

    let crs = extract_crs(&collection);

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        for key in properties.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }

        let geometry = match feature.geometry {
            Some(geometry) => Some(geo::Geometry::<f64>::try_from(geometry).map_err(
                |err| DatasetLoadError::Geometry {
                    index,
                    message: err.to_string(),
                },
            )?),
            None => None,
        };

        rows.push(AddressRow {
            properties,
            geometry,
        });
    }

    Ok(Dataset { columns, rows, crs })
}

/// GeoJSON deprecated the `crs` member but real exports still carry it as a
/// foreign member in the OGC named-CRS shape.
fn extract_crs(collection: &FeatureCollection) -> Option<String> {
    let crs = collection.foreign_members.as_ref()?.get("crs")?;
    match crs.pointer("/properties/name") {
        Some(Value::String(name)) => Some(name.clone()),
        _ => None,
    }
}

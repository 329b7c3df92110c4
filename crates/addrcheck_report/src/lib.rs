mod geojson_output;
mod html;
mod json;

pub use geojson_output::write_annotated_geojson;
pub use html::write_html_report;
pub use json::{write_json_report, ValidationReport};

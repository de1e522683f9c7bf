pub mod exporter;
pub mod serializer;

pub use exporter::{DirectoryExporter, FileExporter};
pub use serializer::{serialize, to_wkt, ExportArtifact, CSV_MIME};

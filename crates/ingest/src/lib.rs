pub mod csv_import;
pub mod error;
pub mod normalize;
pub mod parquet_import;
pub mod parse;
pub mod pipeline;
pub mod upload;
pub mod xlsx_import;

pub use csv_import::CsvImporter;
pub use error::IngestError;
pub use normalize::{NormalizedBatch, Normalizer, REQUIRED_COLUMNS};
pub use parquet_import::ParquetImporter;
pub use parse::{clean_time_string, parse_date, parse_hours, parse_month};
pub use pipeline::{IngestPipeline, IngestReport};
pub use upload::UploadFormat;
pub use xlsx_import::XlsxImporter;

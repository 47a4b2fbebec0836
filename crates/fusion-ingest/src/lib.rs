pub mod codec;
pub mod discovery;
pub mod error;
pub mod pairing;
pub mod source_table;

pub use codec::{
    DecodedFileName, ExportKind, LIS_MARKER, PCR_MARKER, PairKey, decode_file_name, export_kind,
};
pub use discovery::{collect_inputs, list_export_files};
pub use error::{IngestError, Result};
pub use pairing::{FilePair, PairingResult, pair_files};
pub use source_table::{SourceTable, parse_source_table, read_export, read_source_table};

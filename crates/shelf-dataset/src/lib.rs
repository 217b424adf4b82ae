mod clean;
mod codec;
mod error;
mod record;
mod store;
mod table;

pub use clean::{
    clean, clean_stored, coerce_price, format_price, Cleaned, CleaningReport, PREVIEW_ROWS,
};
pub use codec::{encode_records, CsvConfig, CsvTerminator};
pub use error::DatasetError;
pub use record::{Record, StarRating, UnknownRating, HEADERS, PRICE, TITLE};
pub use store::{Buckets, DirBuckets, GcsBuckets, GcsStore, LocalStore, Store, StoreError};
pub use table::Table;

pub use csv::StringRecord;

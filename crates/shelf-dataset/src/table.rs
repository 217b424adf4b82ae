use csv::StringRecord;

use crate::codec::CsvConfig;

/// Header plus ordered rows of a delimited-text dataset.
///
/// Rows are kept as raw text so that a dataset can be read back even when
/// some of its fields don't fit the [`Record`](crate::Record) types.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv(data: &[u8], config: &CsvConfig) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::from(config).from_reader(data);
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn to_csv(&self, config: &CsvConfig) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::WriterBuilder::from(config).from_writer(vec![]);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner().map_err(|e| e.into_error().into())
    }

    /// Index of the column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

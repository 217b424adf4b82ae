use serde::{Deserialize, Serialize};

use crate::record::{Record, HEADERS};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvConfig {
    #[serde(default = "default_csv_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub escape: Option<char>,
    #[serde(default = "default_csv_terminator")]
    pub terminator: CsvTerminator,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            escape: None,
            terminator: CsvTerminator::Any('\n'),
        }
    }
}

fn default_csv_delimiter() -> char {
    CsvConfig::default().delimiter
}

fn default_csv_terminator() -> CsvTerminator {
    CsvConfig::default().terminator
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvTerminator {
    CRLF,
    Any(char),
}

impl From<CsvTerminator> for csv::Terminator {
    fn from(source: CsvTerminator) -> Self {
        match source {
            CsvTerminator::CRLF => Self::CRLF,
            CsvTerminator::Any(c) => Self::Any(c as u8),
        }
    }
}

impl From<&CsvConfig> for csv::WriterBuilder {
    fn from(c: &CsvConfig) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(c.delimiter as u8);
        builder.terminator(c.terminator.into());
        if let Some(escape) = c.escape {
            builder.double_quote(false);
            builder.escape(escape as u8);
        } else {
            builder.double_quote(true);
        }
        builder
    }
}

impl From<&CsvConfig> for csv::ReaderBuilder {
    fn from(c: &CsvConfig) -> Self {
        let mut builder = csv::ReaderBuilder::new();
        builder.delimiter(c.delimiter as u8);
        // CRLF also accepts bare `\n` line endings when reading
        match c.terminator {
            CsvTerminator::Any(t) if t != '\n' => builder.terminator(csv::Terminator::Any(t as u8)),
            _ => builder.terminator(csv::Terminator::CRLF),
        };
        if let Some(escape) = c.escape {
            builder.double_quote(false);
            builder.escape(Some(escape as u8));
        }
        builder
    }
}

/// Encodes records as delimited text with a header row, also when there are
/// no records at all.
pub fn encode_records(records: &[Record], config: &CsvConfig) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::from(config).from_writer(vec![]);
    if records.is_empty() {
        wtr.write_record(HEADERS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StarRating;

    #[test]
    fn records_are_written_with_dataset_header() {
        let records = vec![Record {
            category: "Travel".into(),
            title: "It's Only the Himalayas".into(),
            price: 45.17,
            availability: "In stock".into(),
            star_rating: StarRating::Two,
        }];
        let out = encode_records(&records, &CsvConfig::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Category,Title,Price,Availability,Star Rating\n\
             Travel,It's Only the Himalayas,45.17,In stock,2 Stars\n"
        );
    }

    #[test]
    fn empty_output_still_has_header() {
        let out = encode_records(&[], &CsvConfig::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Category,Title,Price,Availability,Star Rating\n"
        );
    }

    #[test]
    fn custom_delimiter_is_applied() {
        let config = CsvConfig {
            delimiter: '\t',
            ..Default::default()
        };
        let out = encode_records(&[], &config).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Category\tTitle\t"));
    }
}

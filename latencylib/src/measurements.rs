use std::io::Read;
use std::path::Path;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::Serialize;
use crate::error::DataFormatError;
use crate::io::get_reader;

const COLUMNS: usize = 3;

/// One row of the benchmark output
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    pub array_size_bytes: f64,
    pub random_latency_ns: f64,
    pub sequential_latency_ns: f64,
}

/// The measurements in file order. Sizes are expected to grow from row to row but this isn't
/// checked, and the rows are never re-ordered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    rows: Vec<Measurement>,
}

/// Counts of negative latencies per access pattern
///
/// The benchmark reports latency as the access time minus a baseline, so timer noise on small
/// arrays can push it below zero
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Anomalies {
    pub negative_random: usize,
    pub negative_sequential: usize,
}

impl Anomalies {
    pub fn is_empty(&self) -> bool {
        self.negative_random == 0 && self.negative_sequential == 0
    }
}

impl From<Anomalies> for (usize, usize) {
    fn from(a: Anomalies) -> Self {
        (a.negative_random, a.negative_sequential)
    }
}

impl MeasurementTable {
    pub fn new(rows: Vec<Measurement>) -> Self {
        Self { rows }
    }

    /// Loads a table from a comma separated file with three numeric columns and no header
    ///
    /// # Arguments
    ///
    /// * `path`: The measurement file
    ///
    /// returns: Result<MeasurementTable, DataFormatError>
    pub fn load(path: &Path) -> Result<Self, DataFormatError> {
        let table = Self::load_from_reader(get_reader(path)?)?;
        debug!("Loaded {} measurements from {}", table.len(), path.display());
        Ok(table)
    }

    /// Loads a table from any reader, see [`MeasurementTable::load`]
    ///
    /// The first malformed row stops the load, no partial table is returned
    pub fn load_from_reader<R: Read>(reader: R) -> Result<Self, DataFormatError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            // Column counts are checked per row so the error can name the row
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let row_number = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => rows.push(parse_row(&record)?),
                Ok(false) => break,
                Err(source) => return Err(DataFormatError::Read { row: row_number, source }),
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Counts the rows with a negative random or sequential latency
    ///
    /// This is informational only, the rows are still plotted
    pub fn count_anomalies(&self) -> Anomalies {
        let anomalies = self.rows.iter().fold(Anomalies::default(), |mut acc, row| {
            if row.random_latency_ns < 0.0 {
                acc.negative_random += 1;
            }
            if row.sequential_latency_ns < 0.0 {
                acc.negative_sequential += 1;
            }
            acc
        });
        if !anomalies.is_empty() {
            warn!(
                "Found negative latencies, random: {}, sequential: {}",
                anomalies.negative_random, anomalies.negative_sequential
            );
        }
        anomalies
    }
}

/// Counts negative latencies in a table, see [`MeasurementTable::count_anomalies`]
pub fn count_anomalies(table: &MeasurementTable) -> Anomalies {
    table.count_anomalies()
}

fn parse_row(record: &StringRecord) -> Result<Measurement, DataFormatError> {
    let row = record.position().map(|p| p.line()).unwrap_or_default();
    if record.len() != COLUMNS {
        return Err(DataFormatError::ColumnCount { row, found: record.len() });
    }
    let field = |column: usize| -> Result<f64, DataFormatError> {
        let text = &record[column];
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| DataFormatError::NotNumeric { row, column: column + 1, value: text.to_string() })
    };
    Ok(Measurement {
        array_size_bytes: field(0)?,
        random_latency_ns: field(1)?,
        sequential_latency_ns: field(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(f64, f64, f64)]) -> MeasurementTable {
        MeasurementTable::new(rows.iter().map(|&(size, random, sequential)| Measurement {
            array_size_bytes: size,
            random_latency_ns: random,
            sequential_latency_ns: sequential,
        }).collect())
    }

    #[test]
    fn loads_every_line() {
        let input = "100,1.5,0.75\n125,1.6,0.7\n157,2,0.8\n";
        let table = MeasurementTable::load_from_reader(input.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], Measurement { array_size_bytes: 125.0, random_latency_ns: 1.6, sequential_latency_ns: 0.7 });
    }

    #[test]
    fn keeps_file_order() {
        let input = "400,1,1\n100,2,2\n200,3,3";
        let table = MeasurementTable::load_from_reader(input.as_bytes()).unwrap();
        let sizes: Vec<f64> = table.iter().map(|m| m.array_size_bytes).collect();
        assert_eq!(sizes, vec![400.0, 100.0, 200.0]);
    }

    #[test]
    fn tolerates_whitespace_and_exponents() {
        let input = " 1e3 , -0.25 ,3\r\n";
        let table = MeasurementTable::load_from_reader(input.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].array_size_bytes, 1000.0);
        assert_eq!(table.rows()[0].random_latency_ns, -0.25);
    }

    #[test]
    fn rejects_non_numeric_field() {
        let input = "100,1,1\n125,fast,1\n";
        match MeasurementTable::load_from_reader(input.as_bytes()) {
            Err(DataFormatError::NotNumeric { row, column, value }) => {
                assert_eq!((row, column, value.as_str()), (2, 2, "fast"));
            }
            other => panic!("Unexpected result {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_column_count() {
        let input = "100,1,1\n125,1\n";
        assert!(matches!(
            MeasurementTable::load_from_reader(input.as_bytes()),
            Err(DataFormatError::ColumnCount { row: 2, found: 2 })
        ));
        assert!(matches!(
            MeasurementTable::load_from_reader("1,2,3,4".as_bytes()),
            Err(DataFormatError::ColumnCount { row: 1, found: 4 })
        ));
    }

    #[test]
    fn rejects_header_row() {
        let input = "size,random,sequential\n100,1,1\n";
        assert!(matches!(MeasurementTable::load_from_reader(input.as_bytes()), Err(DataFormatError::NotNumeric { row: 1, column: 1, .. })));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(MeasurementTable::load_from_reader("100,inf,1".as_bytes()).is_err());
        assert!(MeasurementTable::load_from_reader("100,1,NaN".as_bytes()).is_err());
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let table = MeasurementTable::load_from_reader("".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.count_anomalies(), Anomalies::default());
    }

    #[test]
    fn counts_negative_random() {
        let t = table(&[(1.0, 2.0, 3.0), (2.0, -1.0, 4.0)]);
        assert_eq!(<(usize, usize)>::from(count_anomalies(&t)), (1, 0));
    }

    #[test]
    fn counts_both_columns() {
        let t = table(&[(1.0, -2.0, -3.0), (2.0, -1.0, 4.0), (3.0, 0.0, -0.1)]);
        assert_eq!(t.count_anomalies(), Anomalies { negative_random: 2, negative_sequential: 2 });
    }
}

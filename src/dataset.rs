//! Loading of delimited text datasets
//!
//! Every source has one header line followed by one record per line. Fields are trimmed and
//! may be quoted; the delimiter is configurable.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::error::{Error, Result};

fn reader_builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All);
    builder
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|inner| Error::AccessError {
        inner,
        path: path.to_owned(),
    })
}

fn parse_field(column: &str, record: &StringRecord, index: usize) -> Result<f64> {
    let line = record.position().map_or(0, |p| p.line());
    let field = record.get(index).ok_or_else(|| Error::Parse {
        column: column.to_owned(),
        line,
        value: String::new(),
    })?;

    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::Parse {
            column: column.to_owned(),
            line,
            value: field.to_owned(),
        }),
    }
}

/// A fully loaded dataset: header names plus the raw records
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table {
    /// Loads the whole file at `path`
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table> {
        let path = path.as_ref();
        let table = Table::from_reader(open(path)?, delimiter)?;

        info!(
            "Loaded {} records with {} columns from {:?}",
            table.len(),
            table.headers.len(),
            path
        );

        Ok(table)
    }

    /// Loads every record of `reader`
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
        let mut reader = reader_builder(delimiter).from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_owned).collect();
        let records = reader.records().collect::<::std::result::Result<Vec<_>, _>>()?;

        Ok(Table { headers, records })
    }

    /// Column names, in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of records, the header excluded
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_owned()))
    }

    /// Parses the column `name` as numbers
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.index_of(name)?;

        self.records
            .iter()
            .map(|record| parse_field(name, record, index))
            .collect()
    }

    /// Every column parsed as numbers, paired with its name
    pub fn numeric_columns(&self) -> Result<Vec<(String, Vec<f64>)>> {
        self.headers
            .iter()
            .map(|name| Ok((name.clone(), self.column(name)?)))
            .collect()
    }

    /// The column `name` as raw labels, used for factors
    pub fn labels(&self, name: &str) -> Result<Vec<String>> {
        let index = self.index_of(name)?;

        Ok(self
            .records
            .iter()
            .map(|record| record.get(index).unwrap_or("").to_owned())
            .collect())
    }

    /// The `(x, y)` observations of two numeric columns
    pub fn pairs(&self, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
        let xs = self.column(x)?;
        let ys = self.column(y)?;

        Ok(xs.into_iter().zip(ys).collect())
    }
}

/// Lazy reader of `(x, y)` observations from the first two columns of a source
///
/// The records are parsed one at a time as the iterator advances; once consumed the source
/// cannot be rewound.
pub struct PairRecords<R> {
    columns: (String, String),
    records: StringRecordsIntoIter<R>,
}

impl PairRecords<File> {
    /// Opens the file at `path`
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<PairRecords<File>> {
        PairRecords::new(open(path.as_ref())?, delimiter)
    }
}

impl<R: Read> PairRecords<R> {
    /// Reads the header of `reader`, which must name at least two columns
    pub fn new(reader: R, delimiter: u8) -> Result<PairRecords<R>> {
        let mut reader = reader_builder(delimiter).from_reader(reader);
        let headers = reader.headers()?.clone();

        let columns = match (headers.get(0), headers.get(1)) {
            (Some(x), Some(y)) => (x.to_owned(), y.to_owned()),
            _ => return Err(Error::MissingColumn("second column".to_owned())),
        };

        Ok(PairRecords {
            columns,
            records: reader.into_records(),
        })
    }

    /// Names of the `x` and `y` columns
    pub fn columns(&self) -> (&str, &str) {
        (&self.columns.0, &self.columns.1)
    }
}

impl<R: Read> Iterator for PairRecords<R> {
    type Item = Result<(f64, f64)>;

    fn next(&mut self) -> Option<Result<(f64, f64)>> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let pair = parse_field(&self.columns.0, &record, 0)
            .and_then(|x| Ok((x, parse_field(&self.columns.1, &record, 1)?)));

        Some(pair)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::{PairRecords, Table};
    use crate::error::Error;

    const WINE: &str = "\"fixed acidity\";\"pH\";\"quality\"\n\
                        7.4;3.51;5\n\
                        7.8;3.20;5\n\
                        \n\
                        11.2;3.16;6\n";

    #[test]
    fn strips_quotes_and_skips_blank_lines() {
        let table = Table::from_reader(WINE.as_bytes(), b';').unwrap();

        assert_eq!(table.headers(), &["fixed acidity", "pH", "quality"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("pH").unwrap(), vec![3.51, 3.20, 3.16]);
    }

    #[test]
    fn custom_delimiter() {
        let table = Table::from_reader("a\tb\n1\t2\n3\t4\n".as_bytes(), b'\t').unwrap();

        assert_eq!(table.pairs("a", "b").unwrap(), vec![(1., 2.), (3., 4.)]);
    }

    #[test]
    fn labels_are_kept_verbatim() {
        let table = Table::from_reader("g;y\n1;2.5\n2;3.5\n1; 4\n".as_bytes(), b';').unwrap();

        assert_eq!(table.labels("g").unwrap(), vec!["1", "2", "1"]);
        assert_eq!(table.column("y").unwrap(), vec![2.5, 3.5, 4.]);
    }

    #[test]
    fn parse_error_reports_line() {
        let table = Table::from_reader("x;y\n1;2\n3;abc\n".as_bytes(), b';').unwrap();

        match table.column("y") {
            Err(Error::Parse {
                column,
                line,
                value,
            }) => {
                assert_eq!(column, "y");
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let table = Table::from_reader("x\nNaN\n".as_bytes(), b';').unwrap();

        assert!(matches!(table.column("x"), Err(Error::Parse { .. })));
    }

    #[test]
    fn missing_column() {
        let table = Table::from_reader(WINE.as_bytes(), b';').unwrap();

        assert!(matches!(table.column("density"), Err(Error::MissingColumn(_))));
    }

    #[test]
    fn pair_records_are_lazy() {
        let mut pairs = PairRecords::new("x;y\n1;2\nbad;3\n5;6\n".as_bytes(), b';').unwrap();

        assert_eq!(pairs.columns(), ("x", "y"));
        assert_eq!(pairs.next().unwrap().unwrap(), (1., 2.));
        assert!(pairs.next().unwrap().is_err());
        assert_eq!(pairs.next().unwrap().unwrap(), (5., 6.));
        assert!(pairs.next().is_none());
    }

    #[test]
    fn pair_records_need_two_columns() {
        assert!(matches!(
            PairRecords::new("x\n1\n".as_bytes(), b';'),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "x;y\n1;3\n2;5\n").unwrap();

        let table = Table::from_path(file.path(), b';').unwrap();
        assert_eq!(table.len(), 2);

        let pairs = PairRecords::from_path(file.path(), b';')
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(pairs, vec![(1., 3.), (2., 5.)]);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Table::from_path("/nonexistent/data.csv", b';'),
            Err(Error::AccessError { .. })
        ));
    }
}

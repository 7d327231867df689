use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use super::catalog;
use super::domain::GoodRecord;

/// Validated, immutable collection of reference goods for a quiz run.
#[derive(Debug, Clone)]
pub struct Dataset {
    goods: Vec<GoodRecord>,
}

impl Dataset {
    /// Validate a raw list of records: non-empty, finite elasticities, and
    /// unique names (the name is the identity a session tracks goods by).
    pub fn new(goods: Vec<GoodRecord>) -> Result<Self, DatasetError> {
        if goods.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut seen = HashSet::new();
        for good in &goods {
            if good.name.trim().is_empty() {
                return Err(DatasetError::BlankName);
            }
            if !good.demand_elasticity.is_finite() || !good.supply_elasticity.is_finite() {
                return Err(DatasetError::NonFiniteElasticity(good.name.clone()));
            }
            if !seen.insert(good.name.trim().to_ascii_lowercase()) {
                return Err(DatasetError::DuplicateName(good.name.clone()));
            }
        }

        Ok(Self { goods })
    }

    /// The built-in reference catalog, available without any external file.
    pub fn standard() -> Self {
        Self {
            goods: catalog::standard_goods(),
        }
    }

    /// Load a dataset from disk, dispatching on the file extension
    /// (`.csv` is CSV, anything else is treated as JSON).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    /// Parse the JSON array form published as `dataset.json`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let goods: Vec<GoodRecord> = serde_json::from_reader(reader)?;
        Self::new(goods)
    }

    /// Parse a CSV export with `name,demand_elasticity,supply_elasticity`
    /// headers.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut goods = Vec::new();
        for record in csv_reader.deserialize::<CsvRow>() {
            let row = record?;
            goods.push(GoodRecord {
                name: row.name,
                demand_elasticity: row.demand_elasticity,
                supply_elasticity: row.supply_elasticity.unwrap_or(0.0),
            });
        }

        Self::new(goods)
    }

    pub fn goods(&self) -> &[GoodRecord] {
        &self.goods
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }

    /// Case-insensitive lookup by good name.
    pub fn find(&self, name: &str) -> Option<&GoodRecord> {
        let wanted = name.trim();
        self.goods
            .iter()
            .find(|good| good.name.eq_ignore_ascii_case(wanted))
    }

    /// Lookup that reports the miss as an error, for callers that cannot
    /// proceed without the record.
    pub fn find_required(&self, name: &str) -> Result<&GoodRecord, DatasetError> {
        self.find(name)
            .ok_or_else(|| DatasetError::UnknownGood(name.trim().to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(alias = "elasticity")]
    demand_elasticity: f64,
    #[serde(default)]
    supply_elasticity: Option<f64>,
}

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Empty,
    BlankName,
    DuplicateName(String),
    NonFiniteElasticity(String),
    UnknownGood(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "failed to read dataset: {}", err),
            DatasetError::Json(err) => write!(f, "invalid JSON dataset: {}", err),
            DatasetError::Csv(err) => write!(f, "invalid CSV dataset: {}", err),
            DatasetError::Empty => write!(f, "dataset contains no goods"),
            DatasetError::BlankName => write!(f, "dataset contains a good with a blank name"),
            DatasetError::DuplicateName(name) => {
                write!(f, "dataset lists good '{}' more than once", name)
            }
            DatasetError::NonFiniteElasticity(name) => {
                write!(f, "good '{}' has a non-finite elasticity", name)
            }
            DatasetError::UnknownGood(name) => {
                write!(f, "good '{}' is not in the dataset", name)
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(err) => Some(err),
            DatasetError::Json(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::binning::BinType;
use crate::diagnostics::DiagnosticsSink;
use crate::matrix::Count;

use super::{IngestError, IngestOptions};

/// Header of the x coordinate column
pub const COL_X: &str = "x";
/// Header of the y coordinate column
pub const COL_Y: &str = "y";
/// Header of the gene identifier column
pub const COL_GENE: &str = "geneID";
/// Header of the UMI count column
pub const COL_COUNT: &str = "UMICount";
/// Header of the cell label column (cell-boundary input)
pub const COL_LABEL: &str = "label";
/// Accepted alias of [`COL_LABEL`]
pub const COL_CELL_ID: &str = "cell_id";

/// Field values treated as missing
const MISSING: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Cleaned spot rows with genes interned in first-occurrence order.
#[derive(Debug, Default)]
pub(super) struct SpotRecords {
    pub xs: Vec<i64>,
    pub ys: Vec<i64>,
    pub gene_index: Vec<usize>,
    pub gene_names: Vec<String>,
    pub counts: Vec<Count>,
    pub labels: Option<Vec<String>>,
    pub dropped: usize,
}

impl SpotRecords {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

struct Columns {
    x: usize,
    y: usize,
    gene: usize,
    count: usize,
    label: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, bin_type: BinType) -> Result<Self, IngestError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| find(name).ok_or_else(|| IngestError::MissingColumn(name.to_string()));

        let label = match bin_type {
            BinType::CellBins => Some(
                find(COL_LABEL)
                    .or_else(|| find(COL_CELL_ID))
                    .ok_or_else(|| IngestError::MissingColumn(COL_LABEL.to_string()))?,
            ),
            BinType::Bins => None,
        };

        Ok(Self {
            x: require(COL_X)?,
            y: require(COL_Y)?,
            gene: require(COL_GENE)?,
            count: require(COL_COUNT)?,
            label,
        })
    }

    fn required(&self) -> impl Iterator<Item = usize> + '_ {
        [self.x, self.y, self.gene, self.count]
            .into_iter()
            .chain(self.label)
    }
}

/// Read and clean the raw spot table.
///
/// Rows with a missing value in a required column are dropped; a field
/// that is present but not numeric is an error.
pub(super) fn read_spots<R: Read>(
    reader: R,
    options: &IngestOptions,
    sink: &dyn DiagnosticsSink,
) -> Result<SpotRecords, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.separator)
        .comment(options.comment)
        .flexible(true)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::Empty);
    }
    let bin_type = options.effective_bin_type();
    let columns = Columns::locate(&headers, bin_type)?;

    let mut spots = SpotRecords {
        labels: columns.label.map(|_| Vec::new()),
        ..SpotRecords::default()
    };
    let mut genes: HashMap<String, usize> = HashMap::new();
    let mut record = StringRecord::new();

    while csv_reader.read_record(&mut record)? {
        let incomplete = columns
            .required()
            .any(|i| record.get(i).map_or(true, |field| MISSING.contains(&field)));
        if incomplete {
            spots.dropped += 1;
            continue;
        }

        let line = record.position().map_or(0, |p| p.line());
        let field = |i: usize| record.get(i).unwrap_or_default();

        let x = parse_integral(field(columns.x), line, COL_X)?;
        let y = parse_integral(field(columns.y), line, COL_Y)?;
        let count = parse_integral(field(columns.count), line, COL_COUNT)?;
        let count = Count::try_from(count).map_err(|_| IngestError::Parse {
            line,
            column: COL_COUNT.to_string(),
            value: field(columns.count).to_string(),
        })?;

        let gene = field(columns.gene);
        let gene_row = match genes.get(gene) {
            Some(&row) => row,
            None => {
                let row = spots.gene_names.len();
                genes.insert(gene.to_string(), row);
                spots.gene_names.push(gene.to_string());
                row
            }
        };

        spots.xs.push(x);
        spots.ys.push(y);
        spots.gene_index.push(gene_row);
        spots.counts.push(count);
        if let (Some(labels), Some(i)) = (spots.labels.as_mut(), columns.label) {
            labels.push(field(i).to_string());
        }
    }

    if spots.dropped > 0 {
        sink.debug(&format!(
            "dropped {} rows with missing values",
            spots.dropped
        ));
    }
    Ok(spots)
}

/// Parse an integer field, also accepting floats with no fractional part.
fn parse_integral(value: &str, line: u64, column: &str) -> Result<i64, IngestError> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        // 2^63 itself is not representable as i64
        Ok(v) if v.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&v) => {
            Ok(v as i64)
        }
        _ => Err(IngestError::Parse {
            line,
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

//! Single-column Parquet encoding of n-dimensional arrays.
//!
//! Each dataset is one Parquet file with a non-nullable column named
//! `values` holding the flattened array in row-major order. The logical
//! shape is stored as a JSON list under the footer key `stereo:shape`;
//! a scalar has shape `[]`.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use super::{ContainerConfig, ContainerError, KEY_SHAPE, VALUES_COLUMN};

/// Typed, flattened array contents
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// 64-bit floats
    Float64(Vec<f64>),
    /// Unsigned counts and offsets
    UInt64(Vec<u64>),
    /// Signed integers
    Int64(Vec<i64>),
    /// Strings
    Utf8(Vec<String>),
}

impl ArrayData {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float64(v) => v.len(),
            ArrayData::UInt64(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::Utf8(v) => v.len(),
        }
    }

    /// True when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayData::Float64(_) => "float64",
            ArrayData::UInt64(_) => "uint64",
            ArrayData::Int64(_) => "int64",
            ArrayData::Utf8(_) => "utf8",
        }
    }

    /// Index array from stored offsets.
    pub fn from_indices(values: &[usize]) -> Self {
        ArrayData::UInt64(values.iter().map(|&v| v as u64).collect())
    }

    fn empty_of(data_type: &DataType) -> Result<Self, ContainerError> {
        match data_type {
            DataType::Float64 => Ok(ArrayData::Float64(Vec::new())),
            DataType::UInt64 => Ok(ArrayData::UInt64(Vec::new())),
            DataType::Int64 => Ok(ArrayData::Int64(Vec::new())),
            DataType::Utf8 => Ok(ArrayData::Utf8(Vec::new())),
            other => Err(ContainerError::InvalidFormat(format!(
                "unsupported dataset type {other}"
            ))),
        }
    }

    fn to_arrow(&self) -> (DataType, ArrayRef) {
        match self {
            ArrayData::Float64(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
            ArrayData::UInt64(v) => (DataType::UInt64, Arc::new(UInt64Array::from(v.clone()))),
            ArrayData::Int64(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
            ArrayData::Utf8(v) => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter_values(v.iter())),
            ),
        }
    }

    fn extend_from_arrow(&mut self, column: &dyn Array) -> Result<(), ContainerError> {
        if column.null_count() > 0 {
            return Err(ContainerError::InvalidFormat(
                "dataset contains null values".to_string(),
            ));
        }
        let expected = self.type_name();
        let mismatch = || {
            ContainerError::InvalidFormat(format!(
                "dataset column has type {}, expected {expected}",
                column.data_type()
            ))
        };
        match self {
            ArrayData::Float64(out) => {
                let array = column.as_any().downcast_ref::<Float64Array>().ok_or_else(mismatch)?;
                out.extend_from_slice(array.values());
            }
            ArrayData::UInt64(out) => {
                let array = column.as_any().downcast_ref::<UInt64Array>().ok_or_else(mismatch)?;
                out.extend_from_slice(array.values());
            }
            ArrayData::Int64(out) => {
                let array = column.as_any().downcast_ref::<Int64Array>().ok_or_else(mismatch)?;
                out.extend_from_slice(array.values());
            }
            ArrayData::Utf8(out) => {
                let array = column.as_any().downcast_ref::<StringArray>().ok_or_else(mismatch)?;
                out.extend(array.iter().map(|v| v.unwrap_or_default().to_string()));
            }
        }
        Ok(())
    }
}

/// An array together with its logical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Flattened contents
    pub data: ArrayData,
    /// Logical shape; the product equals `data.len()`
    pub shape: Vec<usize>,
}

impl Dataset {
    /// One-dimensional dataset.
    pub fn vector(data: ArrayData) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// Dataset with an explicit shape.
    pub fn with_shape(data: ArrayData, shape: Vec<usize>) -> Result<Self, ContainerError> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                ContainerError::InvalidFormat(format!("shape {shape:?} is too large"))
            })?;
        if expected != data.len() {
            return Err(ContainerError::InvalidFormat(format!(
                "shape {shape:?} holds {expected} values, found {}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    /// Scalar dataset (shape `[]`).
    pub fn scalar(data: ArrayData) -> Result<Self, ContainerError> {
        Self::with_shape(data, Vec::new())
    }

    /// Serialize to an in-memory Parquet file.
    pub fn encode(&self, config: &ContainerConfig) -> Result<Vec<u8>, ContainerError> {
        let (data_type, column) = self.data.to_arrow();
        let float = data_type == DataType::Float64;
        let schema = Arc::new(Schema::new(vec![Field::new(
            VALUES_COLUMN,
            data_type,
            false,
        )]));
        let batch = RecordBatch::try_new(Arc::clone(&schema), vec![column])?;

        let metadata = vec![(KEY_SHAPE.to_string(), serde_json::to_string(&self.shape)?)];
        let props = config.to_writer_properties(float, metadata);
        let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(props))?;
        writer.write(&batch)?;
        Ok(writer.into_inner()?)
    }

    /// Deserialize an in-memory Parquet file.
    pub fn decode(bytes: Bytes) -> Result<Self, ContainerError> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;

        let shape: Option<Vec<usize>> = builder
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .and_then(|kv| kv.iter().find(|entry| entry.key == KEY_SHAPE))
            .and_then(|entry| entry.value.as_deref())
            .map(serde_json::from_str)
            .transpose()?;

        let schema = Arc::clone(builder.schema());
        if schema.fields().len() != 1 || schema.field(0).name() != VALUES_COLUMN {
            return Err(ContainerError::InvalidFormat(format!(
                "dataset must have a single `{VALUES_COLUMN}` column"
            )));
        }
        let mut data = ArrayData::empty_of(schema.field(0).data_type())?;

        for batch in builder.build()? {
            let batch = batch?;
            data.extend_from_arrow(batch.column(0).as_ref())?;
        }

        match shape {
            Some(shape) => Self::with_shape(data, shape),
            None => Ok(Self::vector(data)),
        }
    }

    /// Float contents, or an error naming `what`.
    pub fn into_f64(self, what: &str) -> Result<Vec<f64>, ContainerError> {
        match self.data {
            ArrayData::Float64(v) => Ok(v),
            other => Err(wrong_type(what, "float64", &other)),
        }
    }

    /// Unsigned contents, or an error naming `what`.
    pub fn into_u64(self, what: &str) -> Result<Vec<u64>, ContainerError> {
        match self.data {
            ArrayData::UInt64(v) => Ok(v),
            other => Err(wrong_type(what, "uint64", &other)),
        }
    }

    /// Unsigned contents as indices, or an error naming `what`.
    pub fn into_indices(self, what: &str) -> Result<Vec<usize>, ContainerError> {
        self.into_u64(what)?
            .into_iter()
            .map(|v| {
                usize::try_from(v).map_err(|_| {
                    ContainerError::InvalidFormat(format!("{what}: index {v} does not fit in memory"))
                })
            })
            .collect()
    }

    /// Signed contents, or an error naming `what`.
    pub fn into_i64(self, what: &str) -> Result<Vec<i64>, ContainerError> {
        match self.data {
            ArrayData::Int64(v) => Ok(v),
            other => Err(wrong_type(what, "int64", &other)),
        }
    }

    /// String contents, or an error naming `what`.
    pub fn into_strings(self, what: &str) -> Result<Vec<String>, ContainerError> {
        match self.data {
            ArrayData::Utf8(v) => Ok(v),
            other => Err(wrong_type(what, "utf8", &other)),
        }
    }
}

fn wrong_type(what: &str, expected: &str, found: &ArrayData) -> ContainerError {
    ContainerError::InvalidFormat(format!(
        "{what}: expected {expected} values, found {}",
        found.type_name()
    ))
}

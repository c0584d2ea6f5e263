//! Turns one CSV table into typed records.
//!
//! Every data row is zipped with the header into a column name → value mapping, and empty cells
//! are normalized to "no value" right here, once, before any record type sees them. Record types
//! are plain `serde` structs: unknown columns are ignored and missing optional columns are `None`.
use crate::error::LineError;
use crate::index::FxIndexMap;
use crate::Error;
use csv::StringRecord;
use serde::de::value::{Error as DeError, MapDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// One data row of a table, seen through its header
#[derive(Clone, Copy)]
pub struct Row<'r> {
    headers: &'r StringRecord,
    record: &'r StringRecord,
}

impl<'r> Row<'r> {
    pub(crate) fn new(headers: &'r StringRecord, record: &'r StringRecord) -> Self {
        Row { headers, record }
    }

    /// Value of a column, `None` if the column is absent or the cell is empty
    pub fn get(&self, column: &str) -> Option<&'r str> {
        self.fields()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| value)
    }

    /// Column name → normalized value pairs, in header order.
    ///
    /// A row shorter than the header simply lacks the trailing columns; extra values without a
    /// header are dropped.
    pub fn fields(&self) -> impl Iterator<Item = (&'r str, Option<&'r str>)> + 'r {
        self.headers
            .iter()
            .zip(self.record.iter())
            .map(|(name, value)| (name, if value.is_empty() { None } else { Some(value) }))
    }

    /// Builds a record from the row
    pub fn deserialize<O: DeserializeOwned>(&self) -> Result<O, DeError> {
        let map = MapDeserializer::new(self.fields().map(|(name, value)| (name, Field(value))));
        O::deserialize(map)
    }

    fn key(&self, column: &str, file_name: &str) -> Result<&'r str, Error> {
        self.get(column).ok_or_else(|| Error::MissingColumn {
            file_name: file_name.to_owned(),
            column: column.to_owned(),
        })
    }

    fn line_error(&self) -> LineError {
        LineError {
            headers: self.headers.iter().map(String::from).collect(),
            values: self.record.iter().map(String::from).collect(),
        }
    }
}

/// A single normalized cell handed to `serde`.
///
/// `None` means the cell was empty or the column was missing from the row.
struct Field<'de>(Option<&'de str>);

impl<'de> Field<'de> {
    fn present(&self) -> Result<&'de str, DeError> {
        self.0
            .ok_or_else(|| de::Error::custom("a value is required but the field is empty"))
    }
}

impl<'de> IntoDeserializer<'de, DeError> for Field<'de> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty),)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
                let s = self.present()?;
                let value: $ty = s.parse().map_err(|e| {
                    <DeError as de::Error>::custom(format!("invalid number '{}': {}", s, e))
                })?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for Field<'de> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0 {
            None => visitor.visit_none(),
            Some(s) => visitor.visit_borrowed_str(s),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0 {
            None => visitor.visit_none(),
            Some(_) => visitor.visit_some(self),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        visitor.visit_borrowed_str(self.present()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.present()? {
            "0" | "false" => visitor.visit_bool(false),
            "1" | "true" => visitor.visit_bool(true),
            s => Err(de::Error::custom(format!(
                "invalid value `{}`, expected 0 or 1",
                s
            ))),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        let variant: &'de str = self.present()?;
        visitor.visit_enum(IntoDeserializer::<'de, DeError>::into_deserializer(variant))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
    }

    serde::forward_to_deserialize_any! {
        char bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier
        ignored_any
    }
}

/// Reads CSV tables into records
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableReader {
    pub trim_fields: bool,
}

impl TableReader {
    /// Calls `on_row` for every data row, in file order.
    ///
    /// The whole stream must be consumed: a read error before the end of the stream aborts the
    /// table, no partial result is kept.
    pub fn for_each_row<T, F>(&self, reader: T, file_name: &str, mut on_row: F) -> Result<(), Error>
    where
        T: Read,
        F: FnMut(Row<'_>) -> Result<(), Error>,
    {
        let mut reader = BufReader::new(reader);
        let has_bom = reader
            .fill_buf()
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?
            .starts_with(&UTF8_BOM);
        if has_bom {
            reader.consume(UTF8_BOM.len());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(if self.trim_fields {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: None,
            })?
            .clone();

        // Pre-allocate a StringRecord for performance reasons
        let mut rec = StringRecord::new();
        while reader.read_record(&mut rec).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })? {
            on_row(Row::new(&headers, &rec))?;
        }
        Ok(())
    }

    /// Reads the table as a plain sequence of records
    pub fn read_objs<T, O>(&self, reader: T, file_name: &str) -> Result<Vec<Arc<O>>, Error>
    where
        T: Read,
        O: DeserializeOwned,
    {
        let mut objs = Vec::new();
        self.for_each_row(reader, file_name, |row| {
            objs.push(Arc::new(build(&row, file_name)?));
            Ok(())
        })?;
        Ok(objs)
    }

    /// Reads the table as a map keyed by one column.
    ///
    /// A later row with an already seen key replaces the earlier record, keeping its position.
    pub fn read_objs_by_key<T, O>(
        &self,
        reader: T,
        file_name: &str,
        key_column: &str,
    ) -> Result<FxIndexMap<String, Arc<O>>, Error>
    where
        T: Read,
        O: DeserializeOwned,
    {
        let mut objs = FxIndexMap::default();
        self.for_each_row(reader, file_name, |row| {
            let key = row.key(key_column, file_name)?.to_owned();
            objs.insert(key, Arc::new(build(&row, file_name)?));
            Ok(())
        })?;
        Ok(objs)
    }

    /// Reads the table as a map keyed by `"<first>-<second>"`, unique per pair of values
    pub fn read_objs_by_composite_key<T, O>(
        &self,
        reader: T,
        file_name: &str,
        first_column: &str,
        second_column: &str,
    ) -> Result<FxIndexMap<String, Arc<O>>, Error>
    where
        T: Read,
        O: DeserializeOwned,
    {
        let mut objs = FxIndexMap::default();
        self.for_each_row(reader, file_name, |row| {
            let key = format!(
                "{}-{}",
                row.key(first_column, file_name)?,
                row.key(second_column, file_name)?
            );
            objs.insert(key, Arc::new(build(&row, file_name)?));
            Ok(())
        })?;
        Ok(objs)
    }
}

fn build<O: DeserializeOwned>(row: &Row<'_>, file_name: &str) -> Result<O, Error> {
    row.deserialize().map_err(|e| Error::InvalidRecord {
        file_name: file_name.to_owned(),
        source: e,
        line_in_error: row.line_error(),
    })
}

//! Column serializer
//!
//! Holds the ordered, normalized columns of a CSV export and drives the
//! encoder over a record collection.
//!
//! # Lifecycle
//!
//! A serializer is configured once: every spec is resolved (through an
//! [`AccessorCache`]) and every header label is derived when it is built.
//! Anything wrong with the columns fails construction with a configuration
//! error, before a single row is written. After that the serializer is
//! read-only; each `serialize*` call is an independent pass over its input.
//!
//! # Output modes
//!
//! - [`ColumnSerializer::serialize`] buffers the document and returns it as text
//! - [`ColumnSerializer::serialize_into`] streams rows into any `io::Write` sink
//! - [`ColumnSerializer::serialize_async`] streams rows into a tokio `AsyncWrite`
//!
//! All three produce the same bytes: comma-delimited, CRLF-terminated, UTF-8.

use super::accessor::{Accessor, ColumnSpec, Normalizer};
use super::cache::AccessorCache;
use crate::io::async_writer::AsyncRowWriter;
use crate::io::csv_format::csv_writer;
use crate::types::{ExportError, Record, Value};
use futures::stream::{Stream, StreamExt};
use log::debug;
use std::borrow::Borrow;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncWrite;

/// Options for building a [`ColumnSerializer`]
#[derive(Clone)]
pub struct SerializerConfig {
    /// Emit a header row before the records
    pub output_headers: bool,
    /// Transform applied to every cell value before text coercion
    pub normalizer: Option<Normalizer>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            output_headers: true,
            normalizer: None,
        }
    }
}

impl SerializerConfig {
    /// Configuration that skips the header row
    ///
    /// Columns then need no label, so bare callables are accepted.
    pub fn without_headers() -> Self {
        Self {
            output_headers: false,
            ..Self::default()
        }
    }

    /// Apply `normalizer` to every cell value, after any column normalizer
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }
}

impl fmt::Debug for SerializerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerConfig")
            .field("output_headers", &self.output_headers)
            .field("normalized", &self.normalizer.is_some())
            .finish()
    }
}

struct NormalizedColumn<R: ?Sized> {
    accessor: Arc<Accessor<R>>,
    label: Option<String>,
}

/// Renders records as CSV rows through a fixed list of columns
pub struct ColumnSerializer<R: ?Sized> {
    columns: Vec<NormalizedColumn<R>>,
    output_headers: bool,
    normalizer: Option<Normalizer>,
}

impl<R: Record + ?Sized + 'static> ColumnSerializer<R> {
    /// Build a serializer with headers enabled and no normalizer
    pub fn new(specs: &[ColumnSpec<R>]) -> Result<Self, ExportError> {
        Self::with_config(specs, SerializerConfig::default())
    }

    /// Build a serializer with its own accessor cache
    pub fn with_config(
        specs: &[ColumnSpec<R>],
        config: SerializerConfig,
    ) -> Result<Self, ExportError> {
        let cache = AccessorCache::new();
        Self::with_cache(specs, config, &cache)
    }

    /// Build a serializer resolving its columns through a shared cache
    ///
    /// # Arguments
    ///
    /// * `specs` - Column specifications, in output order
    /// * `config` - Header flag and serializer-wide normalizer
    /// * `cache` - Accessor cache shared with other serializers
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - `specs` is empty while headers are requested
    /// - a path column has an empty path or an empty segment
    /// - headers are requested and a column has no explicit, attached or
    ///   derivable label (typically a bare callable)
    pub fn with_cache(
        specs: &[ColumnSpec<R>],
        config: SerializerConfig,
        cache: &AccessorCache<R>,
    ) -> Result<Self, ExportError> {
        if specs.is_empty() && config.output_headers {
            return Err(ExportError::no_columns());
        }

        let mut columns = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if let Some(path) = spec.attribute_path() {
                if path.split('.').any(str::is_empty) {
                    return Err(ExportError::invalid_path(index, path));
                }
            }

            let accessor = cache.resolve(spec);
            let label = spec
                .explicit_label()
                .or_else(|| accessor.label())
                .filter(|label| !label.is_empty())
                .map(str::to_string);

            if config.output_headers && label.is_none() {
                return Err(ExportError::missing_label(index));
            }

            columns.push(NormalizedColumn { accessor, label });
        }

        debug!(
            "Configured column serializer: {} columns, headers {}",
            columns.len(),
            if config.output_headers { "on" } else { "off" }
        );

        Ok(Self {
            columns,
            output_headers: config.output_headers,
            normalizer: config.normalizer,
        })
    }

    /// Header labels in column order, or `None` when headers are disabled
    pub fn header_row(&self) -> Option<Vec<String>> {
        if !self.output_headers {
            return None;
        }

        Some(
            self.columns
                .iter()
                .map(|column| column.label.clone().unwrap_or_default())
                .collect(),
        )
    }

    /// Text cells for one record, in column order
    ///
    /// # Errors
    ///
    /// Propagates the first attribute resolution error; no cell is substituted.
    pub fn row_for(&self, record: &R) -> Result<Vec<String>, ExportError> {
        self.columns
            .iter()
            .map(|column| {
                let value = column.accessor.get(record)?;
                Ok(self.normalize(value).to_field())
            })
            .collect()
    }

    /// Serialize records into an in-memory buffer and return the CSV text
    ///
    /// # Arguments
    ///
    /// * `records` - Records to export, iterated once in order
    ///
    /// # Returns
    ///
    /// The whole document, header row first when headers are enabled
    pub fn serialize<I, T>(&self, records: I) -> Result<String, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<R>,
    {
        let mut buffer = Vec::new();
        self.serialize_into(records, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serialize records incrementally into a caller-owned sink
    ///
    /// The sink is flushed but never closed. On error, rows written before
    /// the failure remain in the sink.
    pub fn serialize_into<I, T, W>(&self, records: I, sink: W) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<R>,
        W: Write,
    {
        let mut writer = csv_writer(sink);

        if let Some(header) = self.header_row() {
            writer.write_record(&header)?;
        }

        let mut rows = 0usize;
        for record in records {
            writer.write_record(&self.row_for(record.borrow())?)?;
            rows += 1;
        }

        writer.flush()?;
        debug!("Serialized {} rows", rows);

        Ok(())
    }

    /// Serialize a stream of records into an async sink
    ///
    /// Produces exactly the bytes [`serialize_into`](Self::serialize_into)
    /// would for the same records.
    ///
    /// # Arguments
    ///
    /// * `records` - Stream of records, consumed in order
    /// * `sink` - Caller-owned tokio writer; flushed but never shut down
    ///
    /// # Errors
    ///
    /// Returns the first resolution or write error. Rows buffered before the
    /// failure are flushed to the sink before the error is returned.
    pub async fn serialize_async<S, T, W>(&self, records: S, sink: W) -> Result<(), ExportError>
    where
        S: Stream<Item = T>,
        T: Borrow<R>,
        W: AsyncWrite + Unpin + Send,
    {
        let mut writer = AsyncRowWriter::new(sink);

        match self.write_rows_async(records, &mut writer).await {
            Ok(rows) => {
                writer.finish().await?;
                debug!("Serialized {} rows to async sink", rows);
                Ok(())
            }
            Err(error) => {
                writer.abort().await;
                Err(error)
            }
        }
    }

    async fn write_rows_async<S, T, W>(
        &self,
        records: S,
        writer: &mut AsyncRowWriter<W>,
    ) -> Result<usize, ExportError>
    where
        S: Stream<Item = T>,
        T: Borrow<R>,
        W: AsyncWrite + Unpin + Send,
    {
        if let Some(header) = self.header_row() {
            writer.write_row(&header).await?;
        }

        futures::pin_mut!(records);
        let mut rows = 0usize;
        while let Some(record) = records.next().await {
            let row = self.row_for(record.borrow())?;
            writer.write_row(&row).await?;
            rows += 1;
        }

        Ok(rows)
    }

    /// Whether a header row is written before the records
    pub fn output_headers(&self) -> bool {
        self.output_headers
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the serializer has no columns (only possible without headers)
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn normalize(&self, value: Value) -> Value {
        match &self.normalizer {
            Some(normalize) => normalize(value),
            None => value,
        }
    }
}

impl<R: ?Sized> fmt::Debug for ColumnSerializer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<_> = self.columns.iter().map(|c| &c.label).collect();
        f.debug_struct("ColumnSerializer")
            .field("labels", &labels)
            .field("output_headers", &self.output_headers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{Car, Manufacturer};
    use rstest::rstest;
    use std::io::{Read, Seek, SeekFrom};
    use tempfile::NamedTempFile;
    use tokio::io::AsyncReadExt;

    fn manufacturer_columns() -> Vec<ColumnSpec<Manufacturer>> {
        vec![
            ("name", "Name").into(),
            ("car_set.count", "Number of models").into(),
        ]
    }

    #[test]
    fn test_end_to_end_manufacturer_list() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();
        let records = vec![Manufacturer::new("My Manufacturer", 0)];

        let output = serializer.serialize(&records).unwrap();
        assert_eq!(output, "Name,Number of models\r\nMy Manufacturer,0\r\n");
    }

    #[test]
    fn test_unicode_preserved() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();
        let records = vec![Manufacturer::new("你好凯兰", 0)];

        let output = serializer.serialize(&records).unwrap();
        assert_eq!(output, "Name,Number of models\r\n你好凯兰,0\r\n");
        assert_eq!(
            output.as_bytes(),
            "Name,Number of models\r\n你好凯兰,0\r\n".as_bytes()
        );
    }

    #[test]
    fn test_generated_headers() {
        let columns: Vec<ColumnSpec<Car>> = vec![
            "name".into(),
            "manufacturer.name".into(),
            "display_name".into(),
            ColumnSpec::func_with_label(|car: &Car| Value::from(car.name.clone()), "A Getter"),
        ];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        assert_eq!(
            serializer.header_row().unwrap(),
            vec!["Name", "Manufacturer name", "Display name", "A Getter"]
        );
    }

    #[test]
    fn test_supplied_headers() {
        let columns: Vec<ColumnSpec<Car>> = vec![
            "name".into(),
            ("manufacturer.name", "Thing").into(),
            "display_name".into(),
            ("get_display_name", "Description").into(),
        ];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        assert_eq!(
            serializer.header_row().unwrap(),
            vec!["Name", "Thing", "Display name", "Description"]
        );
    }

    #[test]
    fn test_unlabeled_callable_fails_with_headers() {
        let columns = vec![ColumnSpec::<Car>::func(|car| Value::from(car.name.clone()))];

        let error = ColumnSerializer::new(&columns).unwrap_err();
        assert!(error.is_configuration());
        assert_eq!(error, ExportError::missing_label(0));
    }

    #[test]
    fn test_unlabeled_callable_allowed_without_headers() {
        let columns = vec![ColumnSpec::<Car>::func(|car| Value::from(car.name.clone()))];

        let serializer =
            ColumnSerializer::with_config(&columns, SerializerConfig::without_headers()).unwrap();
        assert_eq!(serializer.header_row(), None);
        assert_eq!(
            serializer.row_for(&Car::grand_cherokee()).unwrap(),
            vec!["Grand Cherokee"]
        );
    }

    #[rstest]
    #[case::empty_explicit_label(vec![ColumnSpec::<Car>::path("name").labeled("")], ExportError::missing_label(0))]
    #[case::empty_path(vec![ColumnSpec::<Car>::path("")], ExportError::invalid_path(0, ""))]
    #[case::empty_segment(
        vec!["name".into(), ColumnSpec::<Car>::path("manufacturer..name")],
        ExportError::invalid_path(1, "manufacturer..name")
    )]
    #[case::no_columns(Vec::<ColumnSpec<Car>>::new(), ExportError::no_columns())]
    fn test_configuration_errors(
        #[case] columns: Vec<ColumnSpec<Car>>,
        #[case] expected: ExportError,
    ) {
        assert_eq!(ColumnSerializer::new(&columns).unwrap_err(), expected);
    }

    #[rstest]
    #[case::plain_attribute("display_name")]
    #[case::method("get_display_name")]
    fn test_attribute_or_method_same_value(#[case] path: &str) {
        let columns = vec![ColumnSpec::<Car>::path(path)];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        assert_eq!(
            serializer.row_for(&Car::grand_cherokee()).unwrap(),
            vec!["GRAND CHEROKEE"]
        );
    }

    #[test]
    fn test_repeated_column_gives_identical_values() {
        let columns: Vec<ColumnSpec<Car>> = vec!["name".into(), "name".into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        assert_eq!(serializer.header_row().unwrap(), vec!["Name", "Name"]);
        assert_eq!(
            serializer.row_for(&Car::grand_cherokee()).unwrap(),
            vec!["Grand Cherokee", "Grand Cherokee"]
        );
        assert!(Arc::ptr_eq(
            &serializer.columns[0].accessor,
            &serializer.columns[1].accessor
        ));
    }

    #[rstest]
    #[case::with_headers(SerializerConfig::default(), 4)]
    #[case::without_headers(SerializerConfig::without_headers(), 3)]
    fn test_line_count(#[case] config: SerializerConfig, #[case] expected_lines: usize) {
        let columns: Vec<ColumnSpec<Manufacturer>> = vec!["name".into()];
        let serializer = ColumnSerializer::with_config(&columns, config).unwrap();
        let records = vec![
            Manufacturer::new("Jeep", 1),
            Manufacturer::new("Ford", 2),
            Manufacturer::new("Fiat", 3),
        ];

        let output = serializer.serialize(&records).unwrap();
        let lines: Vec<_> = output.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), expected_lines);
    }

    #[test]
    fn test_none_is_empty_cell() {
        let columns = vec![
            ColumnSpec::<Car>::path("name"),
            ColumnSpec::func_with_label(|_: &Car| Value::None, "Nothing"),
        ];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        let cars = vec![Car::grand_cherokee()];
        assert_eq!(
            serializer.serialize(&cars).unwrap(),
            "Name,Nothing\r\nGrand Cherokee,\r\n"
        );
    }

    #[test]
    fn test_quoting() {
        let columns: Vec<ColumnSpec<Manufacturer>> = vec!["name".into(), "car_set.count".into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();
        let records = vec![
            Manufacturer::new("Rolls, Royce", 2),
            Manufacturer::new("The \"Best\" Cars", 0),
            Manufacturer::new("Line\nBreak", 1),
        ];

        let output = serializer.serialize(&records).unwrap();
        assert_eq!(
            output,
            "Name,Car set count\r\n\
             \"Rolls, Royce\",2\r\n\
             \"The \"\"Best\"\" Cars\",0\r\n\
             \"Line\nBreak\",1\r\n"
        );
    }

    #[test]
    fn test_serializer_normalizer() {
        let columns: Vec<ColumnSpec<Car>> = vec!["name".into(), "is_electric".into()];
        let config = SerializerConfig::default()
            .with_normalizer(Arc::new(|value: Value| match value {
                Value::Bool(b) => Value::from(if b { "Y" } else { "N" }),
                other => other,
            }));
        let serializer = ColumnSerializer::with_config(&columns, config).unwrap();

        assert_eq!(
            serializer.row_for(&Car::grand_cherokee()).unwrap(),
            vec!["Grand Cherokee", "N"]
        );
    }

    #[test]
    fn test_missing_attribute_aborts_export() {
        let columns: Vec<ColumnSpec<Car>> = vec!["name".into(), "horsepower".into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        let cars = vec![Car::grand_cherokee()];
        let error = serializer.serialize(&cars).unwrap_err();
        assert_eq!(error, ExportError::attribute_resolution("horsepower", "horsepower"));
    }

    #[test]
    fn test_sink_matches_buffered_output() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();
        let records = vec![
            Manufacturer::new("你好凯兰", 0),
            Manufacturer::new("Jeep", 3),
        ];

        let buffered = serializer.serialize(&records).unwrap();

        let mut sink = Vec::new();
        serializer.serialize_into(&records, &mut sink).unwrap();
        assert_eq!(sink, buffered.as_bytes());
    }

    #[test]
    fn test_file_sink() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();
        let records = vec![Manufacturer::new("My Manufacturer", 0)];

        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        serializer
            .serialize_into(&records, file.as_file_mut())
            .unwrap();

        let mut written = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut written).unwrap();
        assert_eq!(written, "Name,Number of models\r\nMy Manufacturer,0\r\n");
    }

    #[test]
    fn test_serialize_calls_are_independent() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();

        let first = serializer
            .serialize(vec![Manufacturer::new("Jeep", 1)])
            .unwrap();
        let second = serializer
            .serialize(vec![Manufacturer::new("Ford", 2)])
            .unwrap();

        assert_eq!(first, "Name,Number of models\r\nJeep,1\r\n");
        assert_eq!(second, "Name,Number of models\r\nFord,2\r\n");
    }

    #[test]
    fn test_dyn_records() {
        let columns: Vec<ColumnSpec<dyn Record>> = vec![("name", "Name").into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();
        let records: Vec<Box<dyn Record>> = vec![
            Box::new(Manufacturer::new("Jeep", 1)),
            Box::new(Car::grand_cherokee()),
        ];

        let output = serializer
            .serialize(records.iter().map(|record| record.as_ref()))
            .unwrap();
        assert_eq!(output, "Name\r\nJeep\r\nGrand Cherokee\r\n");
    }

    #[tokio::test]
    async fn test_async_sink_matches_buffered_output() {
        let serializer = ColumnSerializer::new(&manufacturer_columns()).unwrap();
        let records = vec![
            Manufacturer::new("你好凯兰", 0),
            Manufacturer::new("Rolls, Royce", 2),
        ];
        let buffered = serializer.serialize(&records).unwrap();

        let mut sink = Vec::new();
        serializer
            .serialize_async(futures::stream::iter(&records), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink, buffered.as_bytes());
    }

    #[tokio::test]
    async fn test_async_missing_attribute() {
        let columns: Vec<ColumnSpec<Car>> = vec!["horsepower".into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        let mut sink = Vec::new();
        let result = serializer
            .serialize_async(futures::stream::iter(vec![Car::grand_cherokee()]), &mut sink)
            .await;

        assert!(matches!(
            result,
            Err(ExportError::AttributeResolution { .. })
        ));
    }

    #[test]
    fn test_async_failure_on_slow_sink_returns_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let columns: Vec<ColumnSpec<Car>> = vec!["name".into(), "horsepower".into()];
        let serializer = ColumnSerializer::new(&columns).unwrap();
        let cars = vec![Car::grand_cherokee()];

        let (result, received) = runtime.block_on(async {
            // Smaller than the header row, so the writer must wait on the reader
            let (sink, mut reader) = tokio::io::duplex(8);
            let drain = tokio::spawn(async move {
                let mut received = Vec::new();
                reader.read_to_end(&mut received).await.map(|_| received)
            });

            let result = serializer
                .serialize_async(futures::stream::iter(&cars), sink)
                .await;
            (result, drain.await.unwrap().unwrap())
        });

        assert_eq!(
            result.unwrap_err(),
            ExportError::attribute_resolution("horsepower", "horsepower")
        );
        assert_eq!(received, b"Name,Horsepower\r\n");
    }

    #[test]
    fn test_scalar_cell_text() {
        let columns: Vec<ColumnSpec<Car>> = vec![
            ColumnSpec::func_with_label(|_: &Car| Value::Float(1.0), "f"),
            ColumnSpec::func_with_label(|car: &Car| Value::from(!car.electric), "b"),
            ColumnSpec::boolean("is_electric"),
            "is_electric".into(),
            ("manufacturer", "Manufacturer").into(),
        ];
        let serializer = ColumnSerializer::new(&columns).unwrap();

        assert_eq!(
            serializer.serialize(&[Car::grand_cherokee()]).unwrap(),
            "f,b,Is electric,Is electric,Manufacturer\r\n1.0,True,No,False,Jeep\r\n"
        );
    }

    #[test]
    fn test_no_columns_without_headers_writes_empty_records() {
        let serializer =
            ColumnSerializer::<Manufacturer>::with_config(&[], SerializerConfig::without_headers())
                .unwrap();
        let records = vec![Manufacturer::new("Jeep", 1), Manufacturer::new("Ford", 2)];

        assert!(serializer.is_empty());
        assert_eq!(serializer.serialize(&records).unwrap(), "\"\"\r\n\"\"\r\n");
    }
}

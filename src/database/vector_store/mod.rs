
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
    table::Table,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{StoredChunk, VectorRecord};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::ingest::Chunk;
use crate::{RagError, Result};

const TABLE_NAME: &str = "chunks";

/// Persistent vector index over LanceDB. Owns the embedding client so every
/// store operation that needs a vector can produce one itself.
///
/// A constructed store is always "active": opening against an absent
/// directory creates an empty index rather than failing. Writes signal
/// failure through `RagError`, never through a silent return value.
pub struct VectorStore {
    connection: Connection,
    dimension: usize,
    embedder: OllamaClient,
}

impl VectorStore {
    /// Open the index at the configured location, creating an empty one if
    /// nothing is persisted there yet.
    #[inline]
    pub async fn open(config: &Config, embedder: OllamaClient) -> Result<Self> {
        let connection = connect(&config.storage.index_dir).await?;
        let store = Self {
            connection,
            dimension: config.ollama.embedding_dimension as usize,
            embedder,
        };

        store.ensure_table().await?;
        info!(
            "Vector store opened at {} ({} records)",
            config.storage.index_dir.display(),
            store.document_count().await?
        );
        Ok(store)
    }

    /// Build a fresh index from the given chunks, replacing whatever was
    /// persisted at the configured location. The old table is dropped before
    /// the new one is written, so the result holds exactly the supplied
    /// chunks.
    #[inline]
    pub async fn build(config: &Config, embedder: OllamaClient, chunks: &[Chunk]) -> Result<Self> {
        let connection = connect(&config.storage.index_dir).await?;
        let mut store = Self {
            connection,
            dimension: config.ollama.embedding_dimension as usize,
            embedder,
        };

        store.drop_table_if_exists().await?;
        store.ensure_table().await?;

        if !chunks.is_empty() {
            let added = store.add_documents(chunks).await?;
            info!("Built vector store with {} records", added);
        }

        Ok(store)
    }

    /// Embed the given chunks and append them to the index. Returns the
    /// number of records written.
    #[inline]
    pub async fn add_documents(&mut self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            debug!("No chunks to add");
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch_async(texts).await?;

        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "Embedded {} of {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let created_at = Utc::now().to_rfc3339();
        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                content: chunk.content.clone(),
                source: chunk.metadata.source.display().to_string(),
                page: chunk.metadata.page,
                chunk_index: chunk.metadata.chunk_index,
                created_at: created_at.clone(),
            })
            .collect();

        let count = records.len();
        self.insert_records(records).await?;
        Ok(count)
    }

    /// Insert precomputed records into the index.
    #[inline]
    pub async fn insert_records(&mut self, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(record) = records.iter().find(|r| r.vector.len() != self.dimension) {
            return Err(RagError::Store(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dimension,
                record.vector.len()
            )));
        }

        let record_batch = self.create_record_batch(&records)?;
        let table = self.open_table().await?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to insert records: {e}")))?;

        debug!("Inserted {} records", records.len());
        Ok(())
    }

    /// Retrieve the `k` stored chunks most similar to the query text.
    ///
    /// An empty index yields an empty result without calling the embedding
    /// provider. `k` must be positive.
    #[inline]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<StoredChunk>> {
        if k == 0 {
            return Err(RagError::InvalidArgument(
                "k must be a positive integer".to_string(),
            ));
        }

        if self.document_count().await? == 0 {
            debug!("Search against empty store, returning no results");
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_async(query.to_string()).await?;
        let table = self.open_table().await?;

        let results = table
            .vector_search(query_vector.as_slice())
            .map_err(|e| RagError::Store(format!("Failed to create vector search: {e}")))?
            .column("vector")
            .limit(k)
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to execute search: {e}")))?;

        self.collect_chunks(results).await
    }

    /// Total number of records in the index.
    #[inline]
    pub async fn document_count(&self) -> Result<u64> {
        let table = self.open_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| RagError::Store(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }

    /// Return up to `limit` stored chunks for inspection. This is a plain
    /// scan, not a similarity query; the selection is arbitrary but stable
    /// within one process lifetime. `limit` must be positive.
    #[inline]
    pub async fn documents_with_metadata(&self, limit: usize) -> Result<Vec<StoredChunk>> {
        if limit == 0 {
            return Err(RagError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        let table = self.open_table().await?;
        let results = table
            .query()
            .limit(limit)
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to list records: {e}")))?;

        self.collect_chunks(results).await
    }

    async fn open_table(&self) -> Result<Table> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to open table: {e}")))
    }

    /// Create the chunks table if it does not exist yet.
    async fn ensure_table(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to list tables: {e}")))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            return Ok(());
        }

        self.connection
            .create_empty_table(TABLE_NAME, self.schema())
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to create table: {e}")))?;

        debug!("Created empty chunks table ({} dimensions)", self.dimension);
        Ok(())
    }

    async fn drop_table_if_exists(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to list tables: {e}")))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            info!("Dropping existing chunks table");
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| RagError::Store(format!("Failed to drop table: {e}")))?;
        }

        Ok(())
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.dimension as i32,
                ),
                false,
            ),
            Field::new("content", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("page", DataType::UInt32, true),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    fn create_record_batch(&self, records: &[VectorRecord]) -> Result<RecordBatch> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut pages = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        let mut flat_values = Vec::with_capacity(len * self.dimension);
        for record in records {
            ids.push(record.id.as_str());
            flat_values.extend_from_slice(&record.vector);
            contents.push(record.content.as_str());
            sources.push(record.source.as_str());
            pages.push(record.page);
            chunk_indices.push(record.chunk_index);
            created_ats.push(record.created_at.as_str());
        }

        let values_array = Float32Array::from(flat_values);
        let item_field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            item_field,
            self.dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| RagError::Store(format!("Failed to create vector array: {e}")))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(self.schema(), arrays)
            .map_err(|e| RagError::Store(format!("Failed to create record batch: {e}")))
    }

    async fn collect_chunks(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<StoredChunk>> {
        let mut chunks = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| RagError::Store(format!("Failed to read result stream: {e}")))?
        {
            chunks.extend(parse_batch(&batch)?);
        }

        debug!("Collected {} stored chunks", chunks.len());
        Ok(chunks)
    }
}

/// Connect to the LanceDB directory, creating it if necessary.
async fn connect(index_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(index_dir)
        .map_err(|e| RagError::Store(format!("Failed to create index directory: {e}")))?;

    let absolute = index_dir
        .canonicalize()
        .map_err(|e| RagError::Store(format!("Failed to resolve index directory: {e}")))?;
    let uri = format!("file://{}", absolute.display());

    debug!("Connecting to LanceDB at {}", uri);
    lancedb::connect(&uri)
        .execute()
        .await
        .map_err(|e| RagError::Store(format!("Failed to connect to LanceDB: {e}")))
}

fn parse_batch(batch: &RecordBatch) -> Result<Vec<StoredChunk>> {
    let contents = string_column(batch, "content")?;
    let sources = string_column(batch, "source")?;

    let pages = batch
        .column_by_name("page")
        .ok_or_else(|| RagError::Store("Missing page column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| RagError::Store("Invalid page column type".to_string()))?;

    let chunk_indices = batch
        .column_by_name("chunk_index")
        .ok_or_else(|| RagError::Store("Missing chunk_index column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| RagError::Store("Invalid chunk_index column type".to_string()))?;

    let mut chunks = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        chunks.push(StoredChunk {
            content: contents.value(row).to_string(),
            source: sources.value(row).to_string(),
            page: (!pages.is_null(row)).then(|| pages.value(row)),
            chunk_index: chunk_indices.value(row),
        });
    }

    Ok(chunks)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RagError::Store(format!("Missing {name} column")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RagError::Store(format!("Invalid {name} column type")))
}

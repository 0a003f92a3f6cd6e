//! SQLite-backed retrieval store: hybrid lexical + vector search over
//! indexed document chunks, strictly scoped to one tenant per call
//! (SPEC §4.2).

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{DocumentChunk, ScoredChunk, TenantId};
use crate::error::{Error, Result};

use super::schema::{initialize_schema, is_initialized};

/// Retrieval over indexed document chunks, always scoped to a tenant
/// (SPEC §4.2). No method here may be called without a [`TenantId`].
#[async_trait]
pub trait RetrievalStore: Send + Sync {
    async fn upsert_chunk(&self, chunk: &DocumentChunk) -> Result<()>;
    async fn delete_source(&self, tenant_id: &TenantId, source_ref: &str) -> Result<u64>;
    async fn search(
        &self,
        tenant_id: &TenantId,
        query_text: &str,
        query_embedding: &[f32],
        candidate_size: usize,
        top_k: usize,
        lexical_weight: f64,
        vector_weight: f64,
    ) -> Result<Vec<ScoredChunk>>;
}

/// [`RetrievalStore`] backed by SQLite + FTS5 for lexical search, with
/// application-side cosine scoring of stored embedding blobs (SPEC §4.2).
pub struct SqliteRetrievalStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRetrievalStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::storage(e.to_string()))?;
        if !is_initialized(&conn) {
            initialize_schema(&conn).map_err(|e| Error::storage(e.to_string()))?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::storage(e.to_string()))?;
        initialize_schema(&conn).map_err(|e| Error::storage(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| Error::internal(format!("failed to lock connection: {e}")))?;
        f(&conn).map_err(|e| Error::storage(e.to_string()))
    }

    fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn encode_tags(tags: &[String]) -> String {
        tags.join(",")
    }

    fn decode_tags(s: &str) -> Vec<String> {
        if s.is_empty() {
            Vec::new()
        } else {
            s.split(',').map(|t| t.to_string()).collect()
        }
    }

    fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<DocumentChunk> {
        let embedding_blob: Option<Vec<u8>> = row.get(5)?;
        let tags_str: String = row.get(6)?;
        Ok(DocumentChunk {
            id: row.get(0)?,
            tenant_id: TenantId(row.get(1)?),
            source_ref: row.get(2)?,
            ordinal: row.get::<_, i64>(3)? as u32,
            text: row.get(4)?,
            embedding: embedding_blob
                .map(|b| Self::decode_embedding(&b))
                .unwrap_or_default(),
            tags: Self::decode_tags(&tags_str),
        })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

#[async_trait]
impl RetrievalStore for SqliteRetrievalStore {
    async fn upsert_chunk(&self, chunk: &DocumentChunk) -> Result<()> {
        let embedding_blob = Self::encode_embedding(&chunk.embedding);
        let tags = Self::encode_tags(&chunk.tags);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chunks (id, tenant_id, source_ref, ordinal, text, embedding, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     tenant_id = excluded.tenant_id,
                     source_ref = excluded.source_ref,
                     ordinal = excluded.ordinal,
                     text = excluded.text,
                     embedding = excluded.embedding,
                     tags = excluded.tags",
                params![
                    chunk.id,
                    chunk.tenant_id.0,
                    chunk.source_ref,
                    chunk.ordinal as i64,
                    chunk.text,
                    embedding_blob,
                    tags,
                ],
            )?;
            Ok(())
        })
    }

    async fn delete_source(&self, tenant_id: &TenantId, source_ref: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM chunks WHERE tenant_id = ?1 AND source_ref = ?2",
                params![tenant_id.0, source_ref],
            )?;
            Ok(affected as u64)
        })
    }

    async fn search(
        &self,
        tenant_id: &TenantId,
        query_text: &str,
        query_embedding: &[f32],
        candidate_size: usize,
        top_k: usize,
        lexical_weight: f64,
        vector_weight: f64,
    ) -> Result<Vec<ScoredChunk>> {
        let sanitized_query = sanitize_fts_query(query_text);

        let candidates = self.with_conn(|conn| {
            let mut results = Vec::new();

            if !sanitized_query.is_empty() {
                let mut stmt = conn.prepare(
                    "SELECT c.id, c.tenant_id, c.source_ref, c.ordinal, c.text, c.embedding, c.tags, bm25(chunks_fts) AS rank
                     FROM chunks c JOIN chunks_fts ON c.rowid = chunks_fts.rowid
                     WHERE c.tenant_id = ?1 AND chunks_fts MATCH ?2
                     ORDER BY rank LIMIT ?3",
                )?;
                let rows = stmt.query_map(
                    params![tenant_id.0, sanitized_query, candidate_size as i64],
                    |row| {
                        let chunk = Self::row_to_chunk(row)?;
                        let bm25_rank: f64 = row.get(7)?;
                        Ok((chunk, bm25_rank))
                    },
                )?;
                for row in rows {
                    results.push(row?);
                }
            }

            if results.is_empty() {
                let mut stmt = conn.prepare(
                    "SELECT id, tenant_id, source_ref, ordinal, text, embedding, tags
                     FROM chunks WHERE tenant_id = ?1 LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![tenant_id.0, candidate_size as i64], |row| {
                    Ok((Self::row_to_chunk(row)?, 0.0))
                })?;
                for row in rows {
                    results.push(row?);
                }
            }

            Ok::<_, rusqlite::Error>(results)
        })?;

        // bm25() returns lower-is-better; normalize to 0..1 higher-is-better.
        let max_rank = candidates
            .iter()
            .map(|(_, r)| r.abs())
            .fold(0.0_f64, f64::max)
            .max(1.0);

        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .map(|(chunk, bm25_rank)| {
                let lexical_score = 1.0 - (bm25_rank.abs() / max_rank);
                let vector_score = cosine_similarity(&chunk.embedding, query_embedding);
                let score = lexical_weight * lexical_score + vector_weight * vector_score;
                ScoredChunk { chunk, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Strip FTS5 special characters so untrusted query text can't break the
/// MATCH syntax or be interpreted as a query operator.
fn sanitize_fts_query(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(|w| format!("{w}*"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk(tenant: &str, id: &str, text: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            tenant_id: TenantId::from(tenant),
            source_ref: "runbook-1".to_string(),
            ordinal: 0,
            text: text.to_string(),
            embedding: vec![1.0, 0.0, 0.0],
            tags: vec!["runbook".to_string()],
        }
    }

    #[tokio::test]
    async fn search_is_scoped_to_tenant() {
        let store = SqliteRetrievalStore::in_memory().unwrap();
        store
            .upsert_chunk(&sample_chunk("acme", "c1", "changeover procedure for line 2"))
            .await
            .unwrap();
        store
            .upsert_chunk(&sample_chunk("other", "c2", "changeover procedure for line 2"))
            .await
            .unwrap();

        let results = store
            .search(&TenantId::from("acme"), "changeover", &[1.0, 0.0, 0.0], 10, 5, 0.4, 0.6)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "c1");
    }

    #[tokio::test]
    async fn delete_source_removes_only_matching_rows() {
        let store = SqliteRetrievalStore::in_memory().unwrap();
        store
            .upsert_chunk(&sample_chunk("acme", "c1", "one"))
            .await
            .unwrap();
        store
            .upsert_chunk(&sample_chunk("acme", "c2", "two"))
            .await
            .unwrap();

        let deleted = store
            .delete_source(&TenantId::from("acme"), "runbook-1")
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }

    #[test]
    fn sanitize_strips_fts_operators() {
        let sanitized = sanitize_fts_query("OEE OR \"drop table\" -- ");
        assert!(!sanitized.contains('"'));
        assert!(!sanitized.contains("--"));
    }

    #[test]
    fn embedding_round_trips_through_blob_encoding() {
        let original = vec![0.5_f32, -1.25, 3.0];
        let bytes = SqliteRetrievalStore::encode_embedding(&original);
        let decoded = SqliteRetrievalStore::decode_embedding(&bytes);
        assert_eq!(original, decoded);
    }
}

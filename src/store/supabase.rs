//! Supabase (PostgREST) backend.
//!
//! Expects two tables:
//! - `assignments(id, created_at, user_id, title, prompt, word_limit)`
//! - `responses(id, assignment_id -> assignments.id, response_text, embedding vector(D))`
//!
//! pgvector columns come back from PostgREST as text (`"[0.1,0.2,...]"`), so
//! embeddings are accepted either as a JSON array or as that text form.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SampleStore;
use super::error::{StoreError, StoreResult};
use super::model::{Assignment, AssignmentId, SampleId, SampleResponse, validate_word_limit};

const ASSIGNMENTS_TABLE: &str = "assignments";
const RESPONSES_TABLE: &str = "responses";

/// Postgres SQLSTATE for a foreign-key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }
}

#[derive(Debug, Serialize)]
struct NewAssignmentRow<'a> {
    user_id: &'a str,
    title: &'a str,
    prompt: &'a str,
    word_limit: u32,
}

#[derive(Debug, Serialize)]
struct NewResponseRow<'a> {
    assignment_id: AssignmentId,
    response_text: &'a str,
    embedding: &'a [f32],
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    id: SampleId,
    assignment_id: AssignmentId,
    response_text: String,
    embedding: EmbeddingColumn,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingColumn {
    Array(Vec<f32>),
    Text(String),
}

impl EmbeddingColumn {
    fn into_vector(self) -> StoreResult<Vec<f32>> {
        match self {
            EmbeddingColumn::Array(v) => Ok(v),
            EmbeddingColumn::Text(s) => {
                serde_json::from_str(&s).map_err(|e| StoreError::InvalidResponse {
                    reason: format!("malformed embedding column: {e}"),
                })
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SupabaseSampleStore {
    http: Client,
    config: SupabaseConfig,
}

impl SupabaseSampleStore {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        if config.url.trim().is_empty() || config.key.trim().is_empty() {
            return Err(StoreError::Validation {
                reason: "Supabase credentials not found".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Backend {
                code: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        self.authorized(builder)
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                code: None,
                message: e.to_string(),
            })
    }

    async fn insert<B, R>(&self, table: &str, row: &B) -> StoreResult<Vec<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.config.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.send(request).await?;
        decode(response).await
    }

    async fn select<R>(&self, table: &str, query: &[(&str, String)]) -> StoreResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let request = self.http.get(self.config.table_url(table)).query(query);
        let response = self.send(request).await?;
        decode(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> StoreResult<Vec<R>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_failure(status, &body));
    }

    response
        .json::<Vec<R>>()
        .await
        .map_err(|e| StoreError::InvalidResponse {
            reason: e.to_string(),
        })
}

fn classify_failure(status: StatusCode, body: &str) -> StoreError {
    let detail: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = detail.message.unwrap_or_else(|| body.to_string());

    let message = match &detail.code {
        Some(code) => format!("{status} [{code}]: {message}"),
        None => format!("{status}: {message}"),
    };

    StoreError::Backend {
        code: detail.code,
        message,
    }
}

fn is_foreign_key_violation(err: &StoreError) -> bool {
    matches!(
        err,
        StoreError::Backend { code: Some(code), .. } if code == FOREIGN_KEY_VIOLATION
    )
}

fn first_id(rows: Vec<IdRow>, what: &str) -> StoreResult<i64> {
    rows.into_iter()
        .next()
        .map(|row| row.id)
        .ok_or_else(|| StoreError::InvalidResponse {
            reason: format!("insert into {what} returned no rows"),
        })
}

#[async_trait]
impl SampleStore for SupabaseSampleStore {
    async fn create_assignment(
        &self,
        user_id: &str,
        title: &str,
        prompt: &str,
        word_limit: i64,
    ) -> StoreResult<AssignmentId> {
        let word_limit = validate_word_limit(word_limit)?;

        let rows: Vec<IdRow> = self
            .insert(
                ASSIGNMENTS_TABLE,
                &NewAssignmentRow {
                    user_id,
                    title,
                    prompt,
                    word_limit,
                },
            )
            .await?;

        let id = first_id(rows, ASSIGNMENTS_TABLE)?;
        debug!(assignment_id = id, user_id, "Assignment stored in Supabase");
        Ok(id)
    }

    async fn get_assignment(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
    ) -> StoreResult<Assignment> {
        let rows: Vec<Assignment> = self
            .select(
                ASSIGNMENTS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{assignment_id}")),
                    ("user_id", format!("eq.{user_id}")),
                ],
            )
            .await?;

        rows.into_iter().next().ok_or(StoreError::NotFound {
            entity: "assignment",
            id: assignment_id,
        })
    }

    async fn save_sample(
        &self,
        user_id: &str,
        assignment_id: AssignmentId,
        text: &str,
        embedding: &[f32],
    ) -> StoreResult<SampleId> {
        let result: StoreResult<Vec<IdRow>> = self
            .insert(
                RESPONSES_TABLE,
                &NewResponseRow {
                    assignment_id,
                    response_text: text,
                    embedding,
                },
            )
            .await;

        let rows = match result {
            Ok(rows) => rows,
            Err(err) if is_foreign_key_violation(&err) => {
                warn!(assignment_id, user_id, "Sample references unknown assignment");
                return Err(StoreError::NotFound {
                    entity: "assignment",
                    id: assignment_id,
                });
            }
            Err(err) => return Err(err),
        };

        let id = first_id(rows, RESPONSES_TABLE)?;
        debug!(sample_id = id, assignment_id, "Sample stored in Supabase");
        Ok(id)
    }

    async fn list_samples(&self, assignment_id: AssignmentId) -> StoreResult<Vec<SampleResponse>> {
        let rows: Vec<ResponseRow> = self
            .select(
                RESPONSES_TABLE,
                &[
                    (
                        "select",
                        "id,assignment_id,response_text,embedding".to_string(),
                    ),
                    ("assignment_id", format!("eq.{assignment_id}")),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SampleResponse {
                    id: row.id,
                    assignment_id: row.assignment_id,
                    response_text: row.response_text,
                    embedding: row.embedding.into_vector()?,
                })
            })
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_column_accepts_array_and_text() {
        let rows: Vec<ResponseRow> = serde_json::from_str(
            r#"[
                {"id": 1, "assignment_id": 5, "response_text": "a", "embedding": [0.5, -0.25]},
                {"id": 2, "assignment_id": 5, "response_text": "b", "embedding": "[0.5,-0.25]"}
            ]"#,
        )
        .unwrap();

        let vectors: Vec<Vec<f32>> = rows
            .into_iter()
            .map(|r| r.embedding.into_vector().unwrap())
            .collect();
        assert_eq!(vectors[0], vec![0.5, -0.25]);
        assert_eq!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_malformed_embedding_text_is_invalid_response() {
        let column = EmbeddingColumn::Text("not a vector".to_string());
        assert!(matches!(
            column.into_vector(),
            Err(StoreError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_foreign_key_violation_detected() {
        let err = classify_failure(
            StatusCode::CONFLICT,
            r#"{"code":"23503","message":"insert or update on table \"responses\" violates foreign key constraint"}"#,
        );
        assert!(is_foreign_key_violation(&err));

        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(!is_foreign_key_violation(&err));
        assert_eq!(
            err,
            StoreError::Backend {
                code: None,
                message: "500 Internal Server Error: boom".to_string()
            }
        );
    }

    #[test]
    fn test_sqlstate_in_message_text_is_not_a_foreign_key_violation() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "row 23503 timed out");
        assert!(!is_foreign_key_violation(&err));

        let err = classify_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":"57014","message":"statement 23503 canceled"}"#,
        );
        assert!(!is_foreign_key_violation(&err));
        assert!(matches!(
            err,
            StoreError::Backend { code: Some(ref code), .. } if code == "57014"
        ));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = SupabaseSampleStore::new(SupabaseConfig::new("", "key"));
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[test]
    fn test_table_url() {
        let config = SupabaseConfig::new("https://db.example.co/", "k");
        assert_eq!(
            config.table_url("responses"),
            "https://db.example.co/rest/v1/responses"
        );
    }

    #[test]
    fn test_first_id_requires_a_row() {
        assert_eq!(first_id(vec![IdRow { id: 9 }], "x"), Ok(9));
        assert!(matches!(
            first_id(vec![], "x"),
            Err(StoreError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_word_limit_validated_before_network() {
        let store =
            SupabaseSampleStore::new(SupabaseConfig::new("http://127.0.0.1:1", "key")).unwrap();
        let result = store.create_assignment("u", "t", "p", 1001).await;
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }
}

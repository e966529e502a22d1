//! Firebase REST backends
//!
//! Three thin reqwest clients: Cloud Storage for drawing artifacts, Firestore
//! for the `student_emotions` collection, and Identity Toolkit for teacher
//! sign-in. Storage calls authenticate with an OAuth token minted from the
//! service-account credentials. No retries anywhere; a single failed attempt
//! surfaces to the caller, who must resubmit (the UI reports one generic
//! message).

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use moodcheck_common::config::FirebaseConfig;
use moodcheck_common::{EmotionRecord, Error, NewEmotionRecord, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{ArtifactStore, AuthProvider, RecordStore};

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";
const STORAGE_API_URL: &str = "https://storage.googleapis.com/storage/v1";
const STORAGE_UPLOAD_URL: &str = "https://storage.googleapis.com/upload/storage/v1";
const IDENTITY_API_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// OAuth scope requested for storage calls; full control is needed to set the
/// public-read ACL after each upload
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.full_control";

/// Lifetime requested for minted access tokens
const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Tokens are re-minted this long before they actually expire
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Firestore collection holding all check-ins
const COLLECTION: &str = "student_emotions";

/// Request timeout for all backend calls (no per-call override)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn build_http_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// JWT bearer-grant claims sent to the token endpoint
#[derive(Debug, Serialize)]
struct TokenClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

fn token_claims(client_email: &str, token_uri: &str, issued_at: i64) -> TokenClaims {
    TokenClaims {
        iss: client_email.to_string(),
        scope: STORAGE_SCOPE.to_string(),
        aud: token_uri.to_string(),
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME.as_secs() as i64,
    }
}

/// Mints OAuth access tokens from the service-account key and caches the
/// current one until shortly before expiry
struct ServiceAccountTokenSource {
    http: Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<(String, Instant)>>,
}

impl ServiceAccountTokenSource {
    fn new(config: &FirebaseConfig) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid service account private key: {}", e)))?;

        Ok(Self {
            http: build_http_client(),
            client_email: config.client_email.clone(),
            token_uri: config.token_uri.clone(),
            signing_key,
            cached: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.lock().unwrap();
            if let Some((token, expires_at)) = cached.as_ref() {
                if Instant::now() < *expires_at {
                    return Ok(token.clone());
                }
            }
        }

        let claims = token_claims(
            &self.client_email,
            &self.token_uri,
            chrono::Utc::now().timestamp(),
        );
        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.signing_key,
        )
        .map_err(|e| Error::Store(format!("Cannot sign token request: {}", e)))?;

        debug!(account = %self.client_email, "Minting storage access token");

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Store(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Token request rejected: HTTP {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("Token response unreadable: {}", e)))?;

        let token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Store("Token response missing access_token".into()))?
            .to_string();
        let lifetime = payload
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .map(Duration::from_secs)
            .unwrap_or(TOKEN_LIFETIME);

        let expires_at = Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_SLACK);
        *self.cached.lock().unwrap() = Some((token.clone(), expires_at));

        Ok(token)
    }
}

/// Public fetch URL for a stored object, path segments percent-encoded
fn public_object_url(bucket: &str, name: &str) -> String {
    let path: Vec<String> = name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("https://storage.googleapis.com/{}/{}", bucket, path.join("/"))
}

/// ACL resource for an object; the whole object name is one path segment
fn object_acl_url(bucket: &str, name: &str) -> String {
    format!(
        "{}/b/{}/o/{}/acl",
        STORAGE_API_URL,
        bucket,
        urlencoding::encode(name)
    )
}

/// Cloud Storage client for drawing uploads
pub struct FirebaseStorageClient {
    http: Client,
    bucket: String,
    tokens: ServiceAccountTokenSource,
}

impl FirebaseStorageClient {
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(),
            bucket: config.storage_bucket.clone(),
            tokens: ServiceAccountTokenSource::new(config)?,
        })
    }
}

#[async_trait]
impl ArtifactStore for FirebaseStorageClient {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/b/{}/o", STORAGE_UPLOAD_URL, self.bucket);

        debug!(name = %name, size = bytes.len(), "Uploading drawing artifact");

        let response = self
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", name)])
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Store(format!("Artifact upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Artifact upload rejected: HTTP {}",
                response.status()
            )));
        }

        // Buckets are private by default; each object is made world-readable
        // so the stored drawing_url stays fetchable without credentials.
        let response = self
            .http
            .post(object_acl_url(&self.bucket, name))
            .bearer_auth(&token)
            .json(&json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await
            .map_err(|e| Error::Store(format!("Artifact publish failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Artifact publish rejected: HTTP {}",
                response.status()
            )));
        }

        Ok(public_object_url(&self.bucket, name))
    }
}

/// Firestore client for the check-in collection
pub struct FirestoreClient {
    http: Client,
    project_id: String,
    api_key: String,
}

impl FirestoreClient {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            http: build_http_client(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            FIRESTORE_API_URL, self.project_id
        )
    }
}

#[async_trait]
impl RecordStore for FirestoreClient {
    async fn append(&self, record: NewEmotionRecord) -> Result<String> {
        let url = format!("{}/{}", self.documents_url(), COLLECTION);

        let body = json!({ "fields": record_to_fields(&record) });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("Record append failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Record append rejected: HTTP {}",
                response.status()
            )));
        }

        let created: Value = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("Record append response unreadable: {}", e)))?;

        document_id(&created)
            .ok_or_else(|| Error::Store("Record append response missing document name".into()))
    }

    async fn list_all(&self) -> Result<Vec<EmotionRecord>> {
        let url = format!("{}:runQuery", self.documents_url());

        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": COLLECTION }],
                "orderBy": [{
                    "field": { "fieldPath": "created_at" },
                    "direction": "DESCENDING"
                }]
            }
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("Record query failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Record query rejected: HTTP {}",
                response.status()
            )));
        }

        let results: Vec<Value> = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("Record query response unreadable: {}", e)))?;

        let mut records = Vec::new();
        for entry in &results {
            // runQuery interleaves readTime-only entries with documents
            let Some(document) = entry.get("document") else {
                continue;
            };
            match parse_document(document) {
                Some(record) => records.push(record),
                None => warn!("Skipping malformed check-in document: {}", document),
            }
        }

        Ok(records)
    }
}

/// Identity Toolkit client for teacher sign-in
pub struct FirebaseAuthClient {
    http: Client,
    api_key: String,
}

impl FirebaseAuthClient {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            http: build_http_client(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/accounts:signInWithPassword", IDENTITY_API_URL);

        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        // Every failure path collapses into Error::Auth. The true cause is
        // logged server-side only; the user sees one message.
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity provider unreachable: {}", e);
                Error::Auth
            })?;

        if !response.status().is_success() {
            warn!("Sign-in rejected: HTTP {}", response.status());
            return Err(Error::Auth);
        }

        let payload: Value = response.json().await.map_err(|e| {
            warn!("Sign-in response unreadable: {}", e);
            Error::Auth
        })?;

        payload
            .get("idToken")
            .and_then(|v| v.as_str())
            .map(|token| token.to_string())
            .ok_or_else(|| {
                warn!("Sign-in response missing idToken");
                Error::Auth
            })
    }
}

/// Encode a record as Firestore typed field values
fn record_to_fields(record: &NewEmotionRecord) -> Value {
    json!({
        "student_name": { "stringValue": record.student_name },
        "emotion": { "stringValue": record.emotion.label() },
        "emotion_icon": { "stringValue": record.emotion_icon },
        "drawing_url": { "stringValue": record.drawing_url },
        "drawing_path": { "stringValue": record.drawing_path },
        "date": { "stringValue": record.date },
        "time": { "stringValue": record.time },
        "created_at": { "timestampValue": record.created_at.to_rfc3339() },
    })
}

/// Trailing segment of a Firestore document resource name
fn document_id(document: &Value) -> Option<String> {
    document
        .get("name")
        .and_then(|v| v.as_str())
        .and_then(|name| name.rsplit('/').next())
        .map(|id| id.to_string())
}

fn string_field(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Decode one Firestore document into an EmotionRecord
fn parse_document(document: &Value) -> Option<EmotionRecord> {
    let id = document_id(document)?;
    let fields = document.get("fields")?;

    let created_at = fields
        .get("created_at")
        .and_then(|v| v.get("timestampValue"))
        .and_then(|v| v.as_str())
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))?;

    Some(EmotionRecord {
        id,
        student_name: string_field(fields, "student_name")?,
        emotion: string_field(fields, "emotion")?,
        emotion_icon: string_field(fields, "emotion_icon").unwrap_or_default(),
        drawing_url: string_field(fields, "drawing_url")?,
        drawing_path: string_field(fields, "drawing_path").unwrap_or_default(),
        date: string_field(fields, "date").unwrap_or_default(),
        time: string_field(fields, "time").unwrap_or_default(),
        created_at,
    })
}

use crate::{auth::AuthenticatedUser, error::AppError, state::AppState};
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use futures::{Stream, StreamExt};
use regex::Regex;
use serde_json::json;
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Multipart field that carries the file.
pub const FILE_FIELD: &str = "file";

lazy_static::lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Reduces a client-supplied filename to a single safe path component.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `file-<millis>-<random>-<name>`, unique even for two uploads in the same millisecond.
pub fn stored_filename(original: &str) -> String {
    format!(
        "file-{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_filename(original)
    )
}

/// Accepts a single multipart file and stores it in the upload directory.
///
/// ## Request Body:
/// `multipart/form-data` with the file in the `file` field. Other fields are ignored.
///
/// ## Responses:
/// - `200 OK`: `{"message": "file is uploaded"}`.
/// - `400 Bad Request`: no `file` field, a malformed payload, or the file exceeds the size limit.
/// - `401 Unauthorized`: missing or invalid token.
#[post("/uploads")]
pub async fn upload_file(
    state: web::Data<AppState>,
    mut payload: Multipart,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    while let Some(field) = payload.next().await {
        let mut field = field?;
        if field.name() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let original = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();
        let path = state.uploads.dir.join(stored_filename(&original));

        save_chunks(field, &state.uploads.dir, &path, state.uploads.max_bytes).await?;
        log::info!("user {} uploaded {}", user.id, path.display());
        return Ok(HttpResponse::Ok().json(json!({ "message": "file is uploaded" })));
    }

    Err(AppError::BadRequest("No file uploaded".into()))
}

/// Streams `chunks` into `path`. Whatever goes wrong, no partial file is left behind.
async fn save_chunks<S, B, E>(
    chunks: S,
    dir: &Path,
    path: &Path,
    max_bytes: usize,
) -> Result<(), AppError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    AppError: From<E>,
{
    fs::create_dir_all(dir).await?;
    let result = write_chunks(chunks, path, max_bytes).await;
    if result.is_err() {
        discard(path).await;
    }
    result
}

async fn write_chunks<S, B, E>(mut chunks: S, path: &Path, max_bytes: usize) -> Result<(), AppError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    AppError: From<E>,
{
    let mut file = fs::File::create(path).await?;
    let mut written = 0usize;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        written += chunk.len();
        if written > max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                max_bytes
            )));
        }
        file.write_all(chunk).await?;
    }

    file.flush().await?;
    Ok(())
}

async fn discard(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("failed to remove partial upload {}: {}", path.display(), err),
    }
}

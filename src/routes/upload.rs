use actix_multipart::Multipart;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use futures_util::TryStreamExt;

use super::JsonError;

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Form field carrying the image in multipart uploads
const FILE_FIELD: &str = "file";

/// Image bytes sent to the upload endpoints
///
/// `multipart/form-data` requests carry the image in the `file` part; any
/// other content type is read as the raw image body.
#[derive(Debug, Clone)]
pub struct ImageUpload(pub Vec<u8>);

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn upload_error(message: String) -> actix_web::Error {
    JsonError {
        error: "invalid_upload".to_string(),
        message,
        status_code: 400,
    }
    .into()
}

async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, actix_web::Error> {
    while let Some(mut field) = multipart.try_next().await? {
        if field.name() != Some(FILE_FIELD) {
            // Drain unrelated parts so the stream can advance
            while field.try_next().await?.is_some() {}
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(upload_error(format!(
                    "File exceeds {} bytes",
                    MAX_UPLOAD_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!("Read {} byte upload from multipart field", bytes.len());
        return Ok(bytes);
    }

    Err(upload_error(format!("Multipart body has no '{}' field", FILE_FIELD)))
}

impl FromRequest for ImageUpload {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req) {
            let multipart = Multipart::new(req.headers(), payload.take());
            Box::pin(async move { read_file_field(multipart).await.map(ImageUpload) })
        } else {
            let body = web::Bytes::from_request(req, payload);
            Box::pin(async move { Ok(ImageUpload(body.await?.to_vec())) })
        }
    }
}

use crate::models::Prediction;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the inference backend
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Inference backend returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct PredictionsBody {
    predictions: Vec<Prediction>,
}

/// Client for the image geolocation model server
///
/// The model runs out of process; this client posts raw image bytes and
/// reads back the ranked `(lat, lon, prob)` guesses.
pub struct InferenceClient {
    base_url: String,
    client: Client,
}

impl InferenceClient {
    /// Create a new inference client
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Predict the `top_k` most likely coordinates for an image, best first
    pub async fn predict_topk(
        &self,
        image: Vec<u8>,
        top_k: u16,
    ) -> Result<Vec<Prediction>, InferenceError> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting top-{} predictions from {} ({} bytes)", top_k, url, image.len());

        let response = self
            .client
            .post(&url)
            .query(&[("top_k", top_k)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::ApiError(format!(
                "Prediction failed: {}",
                response.status()
            )));
        }

        let body: PredictionsBody = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(format!("Failed to parse predictions: {}", e)))?;

        for prediction in &body.predictions {
            prediction
                .point()
                .check()
                .map_err(InferenceError::InvalidResponse)?;
        }

        Ok(body.predictions)
    }

    /// The single most likely coordinate, if the model produced any
    pub async fn predict_top1(&self, image: Vec<u8>) -> Result<Option<Prediction>, InferenceError> {
        Ok(self.predict_topk(image, 1).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_predict_topk_parses_predictions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_query(Matcher::UrlEncoded("top_k".into(), "2".into()))
            .match_header("content-type", "application/octet-stream")
            .match_body("fake-jpeg")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"predictions":[{"lat":48.85,"lon":2.29,"prob":0.7},{"lat":51.5,"lon":-0.12,"prob":0.2}]}"#,
            )
            .create_async()
            .await;

        let client = InferenceClient::new(server.url(), 5).unwrap();
        let predictions = client.predict_topk(b"fake-jpeg".to_vec(), 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].lat, 48.85);
        assert_eq!(predictions[1].prob, 0.2);
    }

    #[tokio::test]
    async fn test_backend_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = InferenceClient::new(server.url(), 5).unwrap();
        let result = client.predict_topk(vec![0], 1).await;

        assert!(matches!(result, Err(InferenceError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_prediction_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"predictions":[{"lat":123.0,"lon":2.29,"prob":0.9}]}"#)
            .create_async()
            .await;

        let client = InferenceClient::new(server.url(), 5).unwrap();
        let result = client.predict_top1(vec![0]).await;

        assert!(matches!(result, Err(InferenceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_empty_predictions_give_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"predictions":[]}"#)
            .create_async()
            .await;

        let client = InferenceClient::new(server.url(), 5).unwrap();
        assert!(client.predict_top1(vec![0]).await.unwrap().is_none());
    }
}

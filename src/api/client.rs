use super::types::*;
use super::utils::{check_response_status, with_retries, REQUEST_TIMEOUT};
use crate::error::{LiveroomError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

const SERVICE_NAME: &str = "Backend";

/// REST collaborator for users, students, batches and assessments.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| LiveroomError::Config(format!("Invalid token format: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LiveroomError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = with_retries(SERVICE_NAME, || self.client.get(&url).send()).await?;
        let response = check_response_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        tracing::debug!(url = %url, "PUT");
        let response =
            with_retries(SERVICE_NAME, || self.client.put(&url).json(body).send()).await?;
        check_response_status(response).await?;
        Ok(())
    }

    /// Not retried: a login is not idempotent from the backend's point of view.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.url("auth/login");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = check_response_status(response).await?;
        Ok(response.json::<LoginResponse>().await?)
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get_json("users/me").await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        self.get_json("students").await
    }

    pub async fn list_batches(&self) -> Result<Vec<Batch>> {
        self.get_json("batches").await
    }

    pub async fn batch_students(&self, batch_id: &str) -> Result<Vec<Student>> {
        self.get_json(&format!("batches/{}/students", batch_id)).await
    }

    pub async fn set_batch_students(&self, batch_id: &str, student_ids: &[String]) -> Result<()> {
        self.put_json(
            &format!("batches/{}/students", batch_id),
            &AssignStudentsRequest { student_ids },
        )
        .await
    }

    pub async fn assessment_batches(&self, assessment_id: &str) -> Result<Vec<Batch>> {
        self.get_json(&format!("assessments/{}/batches", assessment_id))
            .await
    }

    pub async fn set_assessment_batches(
        &self,
        assessment_id: &str,
        batch_ids: &[String],
    ) -> Result<()> {
        self.put_json(
            &format!("assessments/{}/batches", assessment_id),
            &AssignBatchesRequest { batch_ids },
        )
        .await
    }
}

//! Job-related API endpoints

use std::time::Duration;

use crate::SeismoClient;
use crate::error::{ClientError, Result};
use seismo_core::domain::job::Job;
use seismo_core::domain::result::{JobResult, ResultKind};
use seismo_core::dto::job::{JobStats, SubmitJob};

impl SeismoClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a chart job
    ///
    /// The API answers 202 with the job in `submitted` state; a worker picks it
    /// up asynchronously.
    pub async fn submit_job(&self, req: SubmitJob) -> Result<Job> {
        let response = self.client.post(self.url("/jobs")).json(&req).send().await?;
        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{}", job_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// List all job IDs
    pub async fn list_jobs(&self) -> Result<Vec<String>> {
        let response = self.client.get(self.url("/jobs")).send().await?;
        self.handle_response(response).await
    }

    /// Job counts by status
    pub async fn job_stats(&self) -> Result<JobStats> {
        let response = self.client.get(self.url("/jobs/stats")).send().await?;
        self.handle_response(response).await
    }

    /// Poll a job until it reaches `complete` or `failed`
    pub async fn wait_for_job(&self, job_id: &str, interval: Duration, timeout: Duration) -> Result<Job> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let job = self.get_job(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            if tokio::time::Instant::now() + interval > deadline {
                return Err(ClientError::Timeout(format!(
                    "job {} still {} after {:?}",
                    job_id, job.status, timeout
                )));
            }

            tracing::debug!("Job {} is {}, polling again", job_id, job.status);
            tokio::time::sleep(interval).await;
        }
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// Get the result of a completed job
    pub async fn get_result(&self, job_id: &str) -> Result<JobResult> {
        let response = self
            .client
            .get(self.url(&format!("/results/{}", job_id)))
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        decode_result(&content_type, body.to_vec())
    }
}

/// Tag a result body by its content type
pub fn decode_result(content_type: &str, body: Vec<u8>) -> Result<JobResult> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();

    if mime.eq_ignore_ascii_case(ResultKind::Json.content_type()) {
        Ok(JobResult::Json(body))
    } else if mime.eq_ignore_ascii_case(ResultKind::Image.content_type()) {
        Ok(JobResult::Image(body))
    } else {
        Err(ClientError::ParseError(format!(
            "Unexpected result content type '{}'",
            content_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_result_by_content_type() {
        let result = decode_result("application/json", br#"{"A":1}"#.to_vec()).unwrap();
        assert_eq!(result.kind(), ResultKind::Json);
        assert_eq!(result.as_json().unwrap()["A"], 1);

        let result = decode_result("image/png", vec![0x89, b'P']).unwrap();
        assert_eq!(result.kind(), ResultKind::Image);

        let result = decode_result("application/json; charset=utf-8", b"{}".to_vec()).unwrap();
        assert_eq!(result.kind(), ResultKind::Json);
    }

    #[test]
    fn test_decode_result_rejects_unknown_type() {
        assert!(matches!(
            decode_result("text/plain", b"hi".to_vec()),
            Err(ClientError::ParseError(_))
        ));
        assert!(decode_result("", Vec::new()).is_err());
    }
}

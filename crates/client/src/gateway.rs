//! HTTP access to the report API.

use async_trait::async_trait;
use reqwest::{Client, Response, multipart};
use satya_common::{
    NewReport, ReportEnvelope, ReportView, TrendingReport, TrendingResponse, UploadResponse,
    VoteChoice, VoteRequest, VoteTally,
};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// Operations the client performs against the report API.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    /// Publish a new report.
    async fn create_report(&self, report: &NewReport) -> ClientResult<ReportView>;

    /// Upload an image and return its public URL and storage key.
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> ClientResult<UploadResponse>;

    /// Fetch the trending feed. `None` lets the server pick the page size.
    async fn trending(&self, limit: Option<u64>) -> ClientResult<Vec<TrendingReport>>;

    /// Fetch the current tally of a report.
    async fn vote_counts(&self, report_id: &str) -> ClientResult<VoteTally>;

    /// Record `choice` for `voter_id` and return the fresh tally.
    async fn submit_vote(
        &self,
        report_id: &str,
        voter_id: &str,
        choice: VoteChoice,
    ) -> ClientResult<VoteTally>;

    /// Delete a report as an administrator.
    async fn delete_report(&self, report_id: &str, bearer_token: &str) -> ClientResult<()>;
}

/// [`ReportGateway`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReportClient {
    client: Client,
    base_url: String,
}

impl HttpReportClient {
    /// Create a client for the API rooted at `base_url`
    /// (for example `https://satya.example/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn report_url(&self, report_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "/reports/{}{suffix}",
            urlencoding::encode(report_id)
        ))
    }

    async fn check(resp: Response) -> ClientResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "API request failed");
        Err(ClientError::from_response(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
        let resp = Self::check(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ReportGateway for HttpReportClient {
    async fn create_report(&self, report: &NewReport) -> ClientResult<ReportView> {
        let resp = self
            .client
            .post(self.url("/reports"))
            .json(report)
            .send()
            .await?;
        let envelope: ReportEnvelope = Self::decode(resp).await?;
        tracing::debug!(report_id = %envelope.report.id, "Report published");
        Ok(envelope.report)
    }

    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> ClientResult<UploadResponse> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/upload-image"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn trending(&self, limit: Option<u64>) -> ClientResult<Vec<TrendingReport>> {
        let mut req = self.client.get(self.url("/trending"));
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let body: TrendingResponse = Self::decode(req.send().await?).await?;
        Ok(body.reports)
    }

    async fn vote_counts(&self, report_id: &str) -> ClientResult<VoteTally> {
        let resp = self
            .client
            .get(self.report_url(report_id, "/votes"))
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn submit_vote(
        &self,
        report_id: &str,
        voter_id: &str,
        choice: VoteChoice,
    ) -> ClientResult<VoteTally> {
        let resp = self
            .client
            .post(self.report_url(report_id, "/vote"))
            .json(&VoteRequest::new(voter_id, choice))
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn delete_report(&self, report_id: &str, bearer_token: &str) -> ClientResult<()> {
        let resp = self
            .client
            .delete(self.report_url(report_id, ""))
            .bearer_auth(bearer_token)
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::info!(report_id = %report_id, "Report deleted");
        Ok(())
    }
}

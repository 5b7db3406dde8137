//! Dataset and service endpoints

use crate::SeismoClient;
use crate::error::Result;
use seismo_core::dto::MessageResponse;

impl SeismoClient {
    /// Check that the API is up
    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    /// Plain-text usage summary served by the API
    pub async fn help(&self) -> Result<String> {
        let response = self.client.get(self.url("/help")).send().await?;
        self.handle_text_response(response).await
    }

    /// Fetch the upstream feed into the store
    pub async fn load_data(&self) -> Result<MessageResponse> {
        let response = self.client.post(self.url("/data")).send().await?;
        self.handle_response(response).await
    }

    /// Delete every record and index key
    pub async fn delete_data(&self) -> Result<MessageResponse> {
        let response = self.client.delete(self.url("/data")).send().await?;
        self.handle_response(response).await
    }
}

use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::http_server::api::client::ApiError;
use docsvc_daemon::http_server::api::document::DocumentResponse;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Document key
    #[arg(long)]
    pub key: String,
}

#[derive(Debug)]
pub struct DeleteOutput {
    pub response: DocumentResponse,
}

impl fmt::Display for DeleteOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.response.message.green(),
            "key:".dimmed(),
            self.response.key.bold()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Delete {
    type Error = DeleteError;
    type Output = DeleteOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response = client.delete_document(&self.key).await?;
        Ok(DeleteOutput { response })
    }
}

use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::http_server::api::client::ApiError;
use docsvc_daemon::http_server::api::document::DocumentResponse;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Document key
    #[arg(long)]
    pub key: String,

    /// Write the document body here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug)]
pub struct GetOutput {
    pub response: DocumentResponse,
    pub saved_to: Option<PathBuf>,
}

impl fmt::Display for GetOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.response;
        writeln!(f, "{} {}", "key:".dimmed(), r.key.bold())?;

        let fields = [
            ("name:", &r.name),
            ("content-type:", &r.content_type),
            ("extractor:", &r.extractor),
            ("title:", &r.title),
            ("created:", &r.creation_date),
            ("modified:", &r.modification_date),
        ];
        for (label, value) in fields {
            if !value.is_empty() {
                writeln!(f, "{} {}", label.dimmed(), value)?;
            }
        }
        if r.timestamp != 0 {
            writeln!(f, "{} {}", "stored at:".dimmed(), r.timestamp)?;
        }

        match &self.saved_to {
            Some(path) => write!(
                f,
                "{} {} bytes to {}",
                "saved".green(),
                r.document.len(),
                path.display()
            ),
            None => write!(f, "\n{}", r.document),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("request failed: {0}")]
    Api(#[from] ApiError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = GetOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response = client.get_document(&self.key).await?;

        if let Some(path) = &self.out {
            tokio::fs::write(path, response.document.as_bytes())
                .await
                .map_err(|source| GetError::Write {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(GetOutput {
            response,
            saved_to: self.out.clone(),
        })
    }
}

use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::http_server::api::client::ApiError;
use docsvc_daemon::http_server::api::document::{
    CreateDocumentRequest, CreateParams, DocumentResponse,
};

#[derive(Args, Debug, Clone)]
pub struct Post {
    /// File to upload
    #[arg(long)]
    pub in_file: PathBuf,

    /// Content type of the upload [default: guessed from the file extension]
    #[arg(long)]
    pub content_type: Option<String>,

    /// Store under this key instead of a generated one
    #[arg(long)]
    pub key: Option<String>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Tag of the extractor that produced the document
    #[arg(long)]
    pub extractor: Option<String>,

    /// Document title (dc:title)
    #[arg(long)]
    pub title: Option<String>,

    /// Creation date (dcterms:created)
    #[arg(long)]
    pub created: Option<String>,

    /// Modification date (dcterms:modified)
    #[arg(long)]
    pub modified: Option<String>,
}

#[derive(Debug)]
pub struct PostOutput {
    pub response: DocumentResponse,
}

impl fmt::Display for PostOutput {
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
pub enum PostError {
    #[error("request failed: {0}")]
    Api(#[from] ApiError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Post {
    fn content_type(&self) -> String {
        match &self.content_type {
            Some(content_type) => content_type.clone(),
            None => mime_guess::from_path(&self.in_file)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    fn params(&self) -> CreateParams {
        CreateParams {
            name: self.name.clone().unwrap_or_default(),
            extractor: self.extractor.clone().unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
            created: self.created.clone().unwrap_or_default(),
            modified: self.modified.clone().unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Post {
    type Error = PostError;
    type Output = PostOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let content = tokio::fs::read(&self.in_file)
            .await
            .map_err(|source| PostError::Read {
                path: self.in_file.clone(),
                source,
            })?;

        let request = CreateDocumentRequest {
            key: self.key.clone(),
            content_type: Some(self.content_type()),
            params: self.params(),
            content,
        };

        let mut client = ctx.client.clone();
        let response = client.create_document(request).await?;
        Ok(PostOutput { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(in_file: &str) -> Post {
        Post {
            in_file: PathBuf::from(in_file),
            content_type: None,
            key: None,
            name: None,
            extractor: None,
            title: Some("Report".into()),
            created: None,
            modified: None,
        }
    }

    #[test]
    fn test_content_type_guessed_from_extension() {
        assert_eq!(post("report.json").content_type(), "application/json");
        assert_eq!(post("notes").content_type(), "application/octet-stream");

        let explicit = Post {
            content_type: Some("text/csv".into()),
            ..post("report.json")
        };
        assert_eq!(explicit.content_type(), "text/csv");
    }

    #[test]
    fn test_params_from_flags() {
        let params = post("a.txt").params();
        assert_eq!(params.title, "Report");
        assert!(params.name.is_empty());
    }
}

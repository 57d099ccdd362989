//! Document endpoints: fetch, create and remove one document by key.

use axum::routing::{get, post};
use axum::Router;

use crate::ServiceState;

mod create;
mod delete;
mod get;
mod response;

// Re-export request/response types for use by CLI and other clients
pub use create::{CreateDocumentRequest, CreateParams};
pub use delete::DeleteDocumentRequest;
pub use get::GetDocumentRequest;
pub use response::{DocumentResponse, FILE_EXISTS_STATUS};

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/document", post(create::handler))
        .route(
            "/document/:key",
            get(get::handler)
                .post(create::handler_with_key)
                .delete(delete::handler),
        )
        .with_state(state)
}

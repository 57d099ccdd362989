pub mod delete;
pub mod get;
pub mod health;
pub mod post;
pub mod reconcile;
pub mod serve;
pub mod version;

pub use delete::Delete;
pub use get::Get;
pub use health::Health;
pub use post::Post;
pub use reconcile::Reconcile;
pub use serve::Serve;
pub use version::Version;

pub mod error;
pub mod export;
pub mod id;
pub mod model;
pub mod mutations;
pub mod prebuilt;
pub mod resolve;
pub mod schema;
pub mod transcode;
pub mod tree;

pub use error::{InvariantError, TranscodeError};
pub use export::{ExportConfig, to_html, to_json};
pub use id::NodeId;
pub use model::*;
pub use mutations::Mutation;
pub use resolve::resolve_target;

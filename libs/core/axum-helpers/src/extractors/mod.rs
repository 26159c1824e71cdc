//! Extractors that turn request rejections into [`AppError`](crate::AppError) responses.

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;

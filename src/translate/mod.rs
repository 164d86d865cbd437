pub mod request;
pub mod response;

pub use request::to_upstream_payload;
pub use response::{chat_completion_from_prediction, completion_from_prediction, unwrap_predictions};

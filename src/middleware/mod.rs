pub mod recovery;
pub mod response;

pub use recovery::handle_panic;
pub use response::{ApiResponse, ApiResult, Deleted, Meta};

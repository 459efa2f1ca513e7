pub mod response;

pub use response::{respond, ApiResponse, ApiResult, ResponseValue};

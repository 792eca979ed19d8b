pub mod client;
pub mod response;
pub mod timeout;

pub use self::client::{ApiClient, RequestOptions};
pub use self::response::{ApiResult, interpret, status_message};
pub use self::timeout::{TimeoutError, TimeoutLayer, TimeoutService};

pub(crate) mod api_client;
pub(crate) mod error;
pub(crate) mod error_message;
pub(crate) mod login_response;

pub use api_client::ApiClient;
pub use error::{ClientError, Result as CliClientResult};
pub use error_message::extract_error_message;
pub use login_response::LoginResponse;

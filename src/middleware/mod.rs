pub mod api_key;
pub mod cors;
pub mod recover;
pub mod request_id;
pub mod security_headers;

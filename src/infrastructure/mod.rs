// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_response;
pub mod json_config_store;
pub mod rest_source;
pub mod snapshot_stream;

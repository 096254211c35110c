pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod notify;
pub mod persistence;
pub mod sync;

pub use config::SyncConfig;
pub use http::fetcher::{AuthToken, Fetcher};
pub use http::transport::ReqwestTransport;
pub use notify::NotificationStore;
pub use persistence::StorageAdapter;
pub use sync::driver::{SyncDriver, SyncHandle};

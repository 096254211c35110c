pub mod fetcher;
pub mod mock;
pub mod mutation;
pub mod transport;

pub use fetcher::{ApiRequest, AuthToken, FetchOutcome, Fetcher};
pub use mutation::{MutationConfig, MutationError, RemoteMutation};
pub use transport::{HttpTransport, Method, ReqwestTransport};


/// Case-insensitive header lookup over a recorded header list.
pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

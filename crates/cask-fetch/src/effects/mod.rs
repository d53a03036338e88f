//! I/O at the edge: the HTTP seam and the fetcher driving it.

mod fetcher;
mod http;

pub use fetcher::{Download, Fetcher};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{BoxStream, HttpClient, HttpResponse};

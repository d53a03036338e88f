use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status line and body of a `GET`.
///
/// The body has not been read yet; dropping the response abandons it.
pub struct HttpResponse<E> {
    pub status:         u16,
    pub content_length: Option<u64>,
    pub body:           BoxStream<'static, std::result::Result<Bytes, E>>,
}

impl<E> HttpResponse<E> {
    pub fn new(
        status: u16,
        content_length: Option<u64>,
        body: BoxStream<'static, std::result::Result<Bytes, E>>,
    ) -> Self {
        Self {
            status,
            content_length,
            body,
        }
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects themselves and report any status the
/// server answered with; only transport failures are errors. The fetcher
/// decides what a non-2xx status means.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - in-memory clients in tests
pub trait HttpClient: Send + Sync {
    /// Transport error, surfaced as [`crate::FetchError::Network`].
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    type Error = C::Error;

    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<HttpResponse<Self::Error>, Self::Error>> + Send {
        (**self).get(url, headers)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;

    use super::*;
    use crate::error::{FetchError, Result};

    const USER_AGENT: &str = concat!("cask/", env!("CARGO_PKG_VERSION"));
    const MAX_REDIRECTS: usize = 10;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }

        /// Wrap a preconfigured client (proxies, extra roots).
        pub fn with_client(client: reqwest::Client) -> Self { Self { client } }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<HttpResponse<Self::Error>, Self::Error> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let content_length = response.content_length();
            let body = response.bytes_stream().boxed();

            Ok(HttpResponse::new(status, content_length, body))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;

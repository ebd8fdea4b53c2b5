use std::io::Write;

/// Blocking HTTP GET abstraction.
///
/// Implementations stream the response body for `url` into `sink` and return
/// the number of bytes written. A non-success HTTP status must be reported as
/// an error. Redirects are the implementation's concern.
pub trait HttpClient {
    type Error: std::error::Error + Send + Sync + 'static;

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, Self::Error>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    type Error = C::Error;

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, Self::Error> {
        (**self).download(url, sink)
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientError, ClientSetting, ReqwestClient};

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::io::{self, Write};

    use reqwest::{Client, Proxy, StatusCode, Url};
    use thiserror::Error;
    use tokio::runtime::{Builder, Runtime};

    use super::HttpClient;
    use crate::tracker::ProgressTrackerBuilder;

    #[derive(Debug, Error)]
    pub enum ClientError {
        #[error("invalid proxy URL {url}")]
        Proxy {
            url: String,
            #[source]
            source: reqwest::Error,
        },

        #[error("failed to build HTTP client")]
        Build(#[source] reqwest::Error),

        #[error("failed to start I/O runtime")]
        Runtime(#[source] io::Error),

        #[error("request failed")]
        Request(#[source] reqwest::Error),

        #[error("server answered {status}")]
        Status { status: StatusCode },

        #[error("failed to write response body")]
        Write(#[source] io::Error),
    }

    #[derive(Clone, Debug, Default)]
    pub struct ClientSetting {
        pub proxies: Vec<Url>,
        pub user_agent: Option<String>,
        pub progress: bool,
        /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
        pub ignore_system_proxy: bool,
    }

    impl ClientSetting {
        fn build_client(&self) -> Result<Client, ClientError> {
            let user_agent = self
                .user_agent
                .clone()
                .unwrap_or_else(|| concat!("remeta/", env!("CARGO_PKG_VERSION")).to_string());
            let mut cb = Client::builder().user_agent(user_agent);
            if self.ignore_system_proxy {
                cb = cb.no_proxy();
            }

            let (secure, insecure): (Vec<&Url>, Vec<&Url>) =
                self.proxies.iter().partition(|u| u.scheme() == "https");

            for u in secure {
                let proxy = Proxy::https(u.as_str()).map_err(|source| ClientError::Proxy {
                    url: u.to_string(),
                    source,
                })?;
                cb = cb.proxy(proxy);
            }
            for u in insecure {
                let proxy = Proxy::http(u.as_str()).map_err(|source| ClientError::Proxy {
                    url: u.to_string(),
                    source,
                })?;
                cb = cb.proxy(proxy);
            }

            cb.build().map_err(ClientError::Build)
        }
    }

    /// `reqwest` client driven on a private single-threaded runtime.
    pub struct ReqwestClient {
        client: Client,
        runtime: Runtime,
        progress: bool,
    }

    impl ReqwestClient {
        pub fn new(setting: ClientSetting) -> Result<Self, ClientError> {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(ClientError::Runtime)?;
            let client = {
                let _guard = runtime.enter();
                setting.build_client()?
            };
            Ok(Self {
                client,
                runtime,
                progress: setting.progress,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = ClientError;

        fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, ClientError> {
            self.runtime.block_on(async {
                let mut res = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(ClientError::Request)?;

                let status = res.status();
                if !status.is_success() {
                    return Err(ClientError::Status { status });
                }

                let tracker = self.progress.then(|| {
                    let tb = ProgressTrackerBuilder::default().with_prefix("download");
                    match res.content_length() {
                        Some(len) => tb.with_len(len),
                        None => tb,
                    }
                    .build()
                });

                let mut written = 0u64;
                let streamed: Result<(), ClientError> = async {
                    while let Some(chunk) = res.chunk().await.map_err(ClientError::Request)? {
                        sink.write_all(&chunk).map_err(ClientError::Write)?;
                        written += chunk.len() as u64;
                        if let Some(t) = &tracker {
                            t.step(chunk.len() as u64);
                        }
                    }
                    sink.flush().map_err(ClientError::Write)
                }
                .await;

                match (streamed, tracker) {
                    (Ok(()), Some(t)) => t.finish(),
                    (Err(e), Some(t)) => {
                        t.abandon();
                        return Err(e);
                    }
                    (Err(e), None) => return Err(e),
                    (Ok(()), None) => {}
                }
                Ok(written)
            })
        }
    }

}

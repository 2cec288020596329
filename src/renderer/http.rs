use reqwest::blocking::Client;

use crate::config::Config;

/// Builds the blocking HTTP client shared by the web backends
pub fn build_client(config: &Config) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("schnizzle/", env!("CARGO_PKG_VERSION")));

    if let Some(proxy) = &config.proxy {
        log::info!("Using HTTP proxy {}", proxy);
        builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
    }

    builder.build()
}

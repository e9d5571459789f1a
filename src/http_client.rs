use std::time::Duration;

use reqwest::ClientBuilder;

/// Stable identification for upstream access logs.
const USER_AGENT: &str = concat!("relay/", env!("CARGO_PKG_VERSION"));

fn base_builder(timeout: Duration) -> ClientBuilder {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
}

pub fn client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_builder(timeout).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_any_timeout() {
        assert!(client_with_timeout(Duration::from_millis(1)).is_ok());
        assert!(client_with_timeout(Duration::from_secs(30)).is_ok());
    }
}

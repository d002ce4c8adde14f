//! random.org integer generator with local fallback.

use std::time::Duration;

use async_trait::async_trait;
use mastermind_rules::DigitRange;
use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::random::{LocalSource, SecretSource, UpstreamError};

/// Fetches digits from a random.org-compatible integers endpoint.
///
/// One request per call, no retries. Any failure falls back to
/// [`LocalSource`]: transport errors, non-success status, timeout,
/// cancellation, unparsable lines, values outside the range, or a line
/// count different from the one requested.
#[derive(Debug, Clone)]
pub struct RandomOrgSource {
    client: Client,
    integers_url: Url,
    fallback: LocalSource,
}

impl RandomOrgSource {
    /// Creates a source calling `<base_address><integers_endpoint>`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the URL is invalid or the HTTP client cannot be built.
    #[instrument]
    pub fn new(base_address: &str, integers_endpoint: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let integers_url = Url::parse(base_address)
            .and_then(|base| base.join(integers_endpoint))
            .map_err(|e| {
                UpstreamError::new(format!(
                    "Invalid random service URL '{}{}': {}",
                    base_address, integers_endpoint, e
                ))
            })?;

        let client = Client::builder().timeout(timeout).build()?;

        info!(url = %integers_url, ?timeout, "Created random service client");
        Ok(Self {
            client,
            integers_url,
            fallback: LocalSource,
        })
    }

    /// Request URL for `count` integers in `range`.
    pub fn request_url(&self, count: usize, range: DigitRange) -> Url {
        let mut url = self.integers_url.clone();
        url.query_pairs_mut()
            .append_pair("num", &count.to_string())
            .append_pair("min", &range.min().to_string())
            .append_pair("max", &range.max().to_string())
            .append_pair("col", "1")
            .append_pair("base", "10")
            .append_pair("format", "plain")
            .append_pair("rnd", "new");
        url
    }

    #[instrument(skip(self))]
    async fn fetch(&self, count: usize, range: DigitRange) -> Result<Vec<i32>, UpstreamError> {
        let response = self.client.get(self.request_url(count, range)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::new(format!("Random service returned status {}", status)));
        }

        let body = response.text().await?;
        parse_plain_integers(&body, count, range)
    }
}

/// Parses one integer per line, ignoring blank lines.
fn parse_plain_integers(body: &str, count: usize, range: DigitRange) -> Result<Vec<i32>, UpstreamError> {
    let lines: Vec<&str> = body
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() != count {
        return Err(UpstreamError::new(format!(
            "Random service returned {} lines, expected {}",
            lines.len(),
            count
        )));
    }

    lines
        .into_iter()
        .map(|line| {
            let value: i32 = line
                .trim()
                .parse()
                .map_err(|e| UpstreamError::new(format!("Unparsable line '{}': {}", line, e)))?;
            if range.contains(value) {
                Ok(value)
            } else {
                Err(UpstreamError::new(format!(
                    "Value {} outside [{}, {}]",
                    value,
                    range.min(),
                    range.max()
                )))
            }
        })
        .collect()
}

#[async_trait]
impl SecretSource for RandomOrgSource {
    #[instrument(skip(self, cancel))]
    async fn generate(&self, count: usize, range: DigitRange, cancel: &CancellationToken) -> Vec<i32> {
        // Cancellation is treated like any other remote failure.
        let remote = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UpstreamError::new("Random service call cancelled")),
            result = self.fetch(count, range) => result,
        };

        match remote {
            Ok(digits) => {
                debug!(count, "Generated digits remotely");
                digits
            }
            Err(e) => {
                warn!(error = %e, "Random service failed; using local fallback");
                self.fallback.draw(count, range)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: DigitRange = DigitRange::new(0, 7);

    #[test]
    fn parses_crlf_lines() {
        assert_eq!(parse_plain_integers("1\r\n7\r\n0\r\n3\r\n", 4, RANGE).unwrap(), vec![1, 7, 0, 3]);
    }

    #[test]
    fn rejects_wrong_line_count() {
        assert!(parse_plain_integers("1\n2\n3\n", 4, RANGE).is_err());
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(parse_plain_integers("1\nx\n3\n4\n", 4, RANGE).is_err());
        assert!(parse_plain_integers("1\n2\n3\n8\n", 4, RANGE).is_err());
    }

    #[test]
    fn request_url_carries_plain_text_query() {
        let source = RandomOrgSource::new("https://www.random.org/", "integers/", Duration::from_secs(5))
            .expect("Valid URL");
        assert_eq!(
            source.request_url(4, RANGE).as_str(),
            "https://www.random.org/integers/?num=4&min=0&max=7&col=1&base=10&format=plain&rnd=new"
        );
    }
}

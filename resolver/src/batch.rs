use crate::{Error, Resolver};
use futures::stream::{self, StreamExt};
use lr_core::ResolutionResult;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// The distinct URLs in the input, in order of first appearance.
pub fn unique_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();

    urls.into_iter()
        .map(|url| url.as_ref().to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

impl Resolver {
    /// Resolve every distinct URL in the input concurrently.
    ///
    /// The result contains exactly one entry per distinct URL, in no
    /// particular order. Individual failures are reported in their entries.
    pub async fn resolve_all<I, S>(&self, urls: I) -> Vec<ResolutionResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = unique_urls(urls);
        let count = urls.len();

        log::info!("Resolving {} URLs", count);

        let results = stream::iter(urls)
            .map(|url| async move { self.resolve(&url).await })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        log::info!(
            "Resolved {} URLs ({} failed)",
            count,
            results.iter().filter(|result| result.failed).count()
        );

        results
    }

    /// Like `resolve_all`, but gives up on every outstanding request as soon
    /// as the token is cancelled.
    pub async fn resolve_all_until<I, S>(
        &self,
        urls: I,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResolutionResult>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            results = self.resolve_all(urls) => Ok(results),
        }
    }
}

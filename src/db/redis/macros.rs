/// Read-through lookup against an optional [`Cache`](crate::db::Cache).
///
/// Evaluates to an `AppResult` of the fetched value:
/// * `$cache` is an `Option<&Cache>`; with `None` the fetch runs directly.
/// * A hit returns the cached value without fetching.
/// * A miss, or a Redis read failure, runs the fetch and queues the result for writing.
///
/// ```rust,ignore
/// let detail: AppResult<Option<MovieDetail>> = cached!(
///     self.cache.as_ref(),
///     CacheKey::MovieDetail(title.to_string()),
///     DETAIL_CACHE_TTL,
///     self.fetch_by_title(title)
/// );
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $fetch:expr) => {{
        match $cache {
            None => $fetch.await,
            Some(cache) => {
                let key = $key;
                match cache.get_from_cache(&key).await {
                    Ok(Some(hit)) => Ok(hit),
                    outcome => {
                        if let Err(e) = outcome {
                            tracing::warn!(error = %e, key = %key, "Cache read failed, fetching");
                        }
                        $fetch.await.map(|value| {
                            cache.set_in_background(&key, &value, $ttl);
                            value
                        })
                    }
                }
            }
        }
    }};
}

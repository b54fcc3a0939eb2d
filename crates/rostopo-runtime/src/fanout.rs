//! Bounded fan-out with a single join point

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};

/// Run `f` over `items` with at most `limit` futures in flight.
///
/// Results come back in input order. The first error in input order is
/// returned once every earlier item has finished, and every future still
/// pending is dropped, so no partial result ever leaves this function. A `limit` of 0 is treated as 1.
pub async fn try_join_bounded<I, F, Fut, T, E>(items: I, limit: usize, f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_preserves_input_order() {
        let out: Result<Vec<u64>, ()> = try_join_bounded(vec![30u64, 10, 20], 3, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(ms)
        })
        .await;
        assert_eq!(out, Ok(vec![30, 10, 20]));
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let out: Result<Vec<usize>, ()> = try_join_bounded(0..20usize, 4, |i| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            }
        })
        .await;

        assert_eq!(out.unwrap().len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_error_order_follows_input() {
        let out: Result<Vec<u64>, u64> = try_join_bounded(vec![20u64, 0], 2, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Err(ms)
        })
        .await;
        // the second item fails first but the first item's error is reported
        assert_eq!(out, Err(20));
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let started = AtomicUsize::new(0);
        let out: Result<Vec<usize>, String> = try_join_bounded(0..10usize, 1, |i| {
            let started = &started;
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                if i == 2 {
                    Err(format!("item {}", i))
                } else {
                    Ok(i)
                }
            }
        })
        .await;

        assert_eq!(out, Err("item 2".to_string()));
        // sequential: nothing after the failing item was started
        assert_eq!(started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let out: Result<Vec<u8>, ()> = try_join_bounded(Vec::<u8>::new(), 0, |i| async move { Ok(i) }).await;
        assert_eq!(out, Ok(vec![]));
    }
}

// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

//! Polling watchers built on `tokio::sync::watch`. A watcher resolves its
//! first value before the receiver is handed out, so consumers never
//! observe an uninitialized channel.

use std::{future::Future, time::Duration};

use tokio::{
    sync::watch::{self, Ref},
    task::JoinHandle,
    time::{self, sleep},
};

/// Polls `function` on `interval` and publishes every successful result.
///
/// The initial value is resolved eagerly; an error during the first call is
/// returned to the caller instead of being retried in the background. Later
/// failures keep the previous value and retry after half an interval.
pub async fn new_watcher<T, F, Fut>(
    interval: Duration,
    function: F,
) -> anyhow::Result<watch::Receiver<T>>
where
    F: Fn() -> Fut + Send + 'static,
    T: Sync + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send,
{
    let initial_value = function().await?;

    let (tx, rx) = watch::channel(initial_value);

    tokio::spawn(async move {
        let mut ticks = time::interval(interval);
        ticks.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        // the first tick of a tokio interval completes immediately
        ticks.tick().await;
        loop {
            ticks.tick().await;
            match function().await {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        tracing::debug!("Watcher channel closed, stopping watcher task");
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Watcher update failed, keeping previous value");
                    sleep(interval.div_f32(2.0)).await;
                }
            }
        }
    });
    Ok(rx)
}

/// Runs `function` for the current value of `rx` and then once for every
/// subsequent change.
pub fn watch_pipe<T, F, Fut>(rx: watch::Receiver<T>, function: F) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Ref<'_, T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut rx = rx;
        let value = rx.borrow();
        function(value).await;
        loop {
            match rx.changed().await {
                Ok(()) => {
                    let value = rx.borrow();
                    function(value).await;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Watched channel closed, stopping pipe task");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test]
    async fn watcher_resolves_initial_value_and_keeps_updating() {
        let counter = Arc::new(AtomicU64::new(0));
        let poll_counter = counter.clone();

        let rx = new_watcher(Duration::from_millis(10), move || {
            let poll_counter = poll_counter.clone();
            async move { Ok(poll_counter.fetch_add(1, Ordering::SeqCst)) }
        })
        .await
        .unwrap();

        assert_eq!(*rx.borrow(), 0);

        let mut rx = rx;
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("watcher should tick within a second")
            .unwrap();
        assert!(*rx.borrow() >= 1);
    }

    #[tokio::test]
    async fn watcher_propagates_initial_error() {
        let result = new_watcher(Duration::from_millis(10), || async {
            Err::<u64, _>(anyhow::anyhow!("boom"))
        })
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn pipe_runs_for_current_and_changed_values() {
        let (tx, rx) = watch::channel(1u64);
        let seen = Arc::new(AtomicU64::new(0));
        let sink = seen.clone();

        let handle = watch_pipe(rx, move |value| {
            let sink = sink.clone();
            let value = *value;
            async move {
                sink.fetch_add(value, Ordering::SeqCst);
            }
        });

        tx.send(2).unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while seen.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("pipe should observe both values");

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("pipe task should stop once the sender is dropped")
            .unwrap();
    }
}

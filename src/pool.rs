//! Fixed-cap concurrency for the two fan-out levels.
//!
//! The same pool type bounds both in-flight collections and in-flight items
//! within one collection. Work runs as futures on the calling task through
//! `buffer_unordered`, so at most `cap` of them are polled at a time and a
//! slow unit only occupies its own slot.

use futures::stream::{self, StreamExt};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPool {
    cap: usize,
}

impl BoundedPool {
    /// A cap of zero is raised to one.
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1) }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Run `f` over every item with at most `cap` futures in flight.
    ///
    /// Results come back in completion order.
    pub async fn run<I, F, Fut>(&self, items: I, f: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future,
    {
        stream::iter(items)
            .map(f)
            .buffer_unordered(self.cap)
            .collect()
            .await
    }

    /// Like [`run`](Self::run), but results are returned in input order.
    pub async fn run_ordered<I, F, Fut>(&self, items: I, mut f: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future,
    {
        let mut indexed = self
            .run(items.into_iter().enumerate(), |(index, item)| {
                let fut = f(item);
                async move { (index, fut.await) }
            })
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, output)| output).collect()
    }
}

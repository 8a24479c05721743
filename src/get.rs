//! Awaiting a promise from async code.
//!
//! [`Get`] parks the task, not the thread: the listener it registers stores
//! the outcome and wakes whoever polled last.
use std::future::{Future, IntoFuture};
use std::panic::Location;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::sync::Synchronized;
use crate::{Failure, Promise, Value, LOG_TARGET};

/// The future returned by [`Promise::get`].
///
/// # Examples
///
/// ```
/// use swear::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let (promise, resolver) = Promise::<String>::pending();
/// let task = thread::spawn(move || block_on(async { promise.await }));
/// resolver.resolve("🍓".into());
/// assert_eq!(task.join().expect("The task thread has panicked").unwrap(), "🍓");
/// ```
#[derive(Debug)]
pub struct Get<T, E> {
    shared: Arc<Synchronized<Handoff<T, E>>>,
}

#[derive(Debug)]
struct Handoff<T, E> {
    result: Option<Result<T, E>>,
    waker: Option<Waker>,
}

impl<T, E> Future for Get<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.shared.lock(|handoff| match handoff.result.take() {
            Some(result) => Poll::Ready(result),
            None => {
                let stale = handoff
                    .waker
                    .as_ref()
                    .map_or(true, |waker| !waker.will_wake(cx.waker()));
                if stale {
                    handoff.waker = Some(cx.waker().clone());
                }
                Poll::Pending
            }
        })
    }
}

impl<T: Value, E: Failure> Promise<T, E> {
    /// Resolves once the promise finishes, without blocking the thread.
    pub fn get(&self) -> Get<T, E> {
        let shared = Arc::new(Synchronized::new(Handoff {
            result: None,
            waker: None,
        }));
        let filled = shared.clone();
        self.listen(move |result| {
            let waker = filled.lock(|handoff| {
                handoff.result = Some(result);
                handoff.waker.take()
            });
            if let Some(waker) = waker {
                waker.wake()
            }
        });
        Get { shared }
    }

    /// Resolves to the value, or to `None` after logging the failure
    /// together with the location of this call.
    #[track_caller]
    pub fn get_or_log_error(&self) -> impl Future<Output = Option<T>> + Send + 'static {
        let caller = Location::caller();
        let get = self.get();
        async move {
            match get.await {
                Ok(value) => Some(value),
                Err(error) => {
                    log::error!(
                        target: LOG_TARGET,
                        "asynchronous error (fetched at {caller}): {error:?}"
                    );
                    None
                }
            }
        }
    }
}

impl<T: Value, E: Failure> IntoFuture for Promise<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Get<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.get()
    }
}

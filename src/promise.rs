use std::any::type_name;
use std::fmt::{self, Debug};
use std::mem;
use std::panic::Location;
use std::sync::Arc;

use crate::sync::Synchronized;
use crate::{Error, Failure, Value, LOG_TARGET};

type Listener<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

enum State<T, E> {
    Pending,
    Finished(Result<T, E>),
}

struct Slot<T, E> {
    state: State<T, E>,
    listeners: Vec<Listener<T, E>>,
    observed: bool,
}

struct Inner<T, E: Debug> {
    slot: Synchronized<Slot<T, E>>,
}

impl<T, E: Debug> Drop for Inner<T, E> {
    /// Nobody holds a handle or a resolver anymore: report what can't be
    /// observed from here on.
    fn drop(&mut self) {
        let slot = self.slot.get_mut();
        match &slot.state {
            State::Pending => log::warn!(
                target: LOG_TARGET,
                "dropping a pending Promise<{}>, its producer never completed it",
                type_name::<T>()
            ),
            State::Finished(Err(error)) if !slot.observed => log::error!(
                target: LOG_TARGET,
                "unhandled Promise<{}> error: {:?}",
                type_name::<T>(),
                error
            ),
            State::Finished(_) => {}
        }
    }
}

/// A value of type `T` that becomes available exactly once, or fails with `E`.
///
/// Cloning a `Promise` clones the handle: every clone observes the same
/// outcome.
///
/// # Examples
///
/// ```
/// use swear::Promise;
///
/// let (promise, resolver) = Promise::<String>::pending();
/// let copy = promise.clone();
/// resolver.resolve("🍓".into());
/// assert_eq!(copy.wait().unwrap(), "🍓");
/// ```
pub struct Promise<T, E: Debug = Error> {
    inner: Arc<Inner<T, E>>,
}

/// Completes the [`Promise`] it was created with. Only the first completion
/// counts; clones may be handed to several producers racing each other.
pub struct Resolver<T, E: Debug = Error> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E: Debug> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E: Debug> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E: Debug> Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finished = self
            .inner
            .slot
            .lock(|slot| matches!(slot.state, State::Finished(_)));
        f.debug_struct("Promise")
            .field("value", &type_name::<T>())
            .field("finished", &finished)
            .finish()
    }
}

impl<T, E: Debug> Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("value", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: Value, E: Failure> Promise<T, E> {
    fn with_state(state: State<T, E>) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Synchronized::new(Slot {
                    state,
                    listeners: Vec::new(),
                    observed: false,
                }),
            }),
        }
    }

    /// Creates a pending promise and runs `producer` right away, on the
    /// calling thread. The producer keeps the [`Resolver`] for as long as
    /// the underlying operation runs.
    pub fn new<F>(producer: F) -> Self
    where
        F: FnOnce(Resolver<T, E>),
    {
        let (promise, resolver) = Self::pending();
        producer(resolver);
        promise
    }

    /// A pending promise together with the resolver that completes it.
    pub fn pending() -> (Self, Resolver<T, E>) {
        let promise = Self::with_state(State::Pending);
        let resolver = Resolver {
            inner: promise.inner.clone(),
        };
        (promise, resolver)
    }

    pub fn from_result(result: Result<T, E>) -> Self {
        Self::with_state(State::Finished(result))
    }

    pub fn from_value(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    pub fn from_error(error: E) -> Self {
        Self::from_result(Err(error))
    }

    /// Registers a one-shot listener.
    ///
    /// Listeners fire in registration order on the thread that completes the
    /// promise. If the promise is already finished, `listener` runs
    /// immediately on the calling thread.
    pub fn listen<F>(&self, listener: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        let finished = self.inner.slot.lock(|slot| {
            slot.observed = true;
            match &slot.state {
                State::Finished(result) => Some((result.clone(), listener)),
                State::Pending => {
                    slot.listeners.push(Box::new(listener));
                    None
                }
            }
        });
        if let Some((result, listener)) = finished {
            listener(result);
        }
    }

    /// Listens for a successful value. A failure is logged together with
    /// the location of this call.
    #[track_caller]
    pub fn listen_or_log_error<F>(&self, listener: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        let caller = Location::caller();
        self.listen(move |result| match result {
            Ok(value) => listener(value),
            Err(error) => log::error!(
                target: LOG_TARGET,
                "asynchronous error (listened for at {caller}): {error:?}"
            ),
        });
    }

    /// [`Promise::listen`], returning the promise for further chaining.
    pub fn peek_listen<F>(&self, listener: F) -> &Self
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.listen(listener);
        self
    }

    /// Drops the promise, spelling out that nobody is interested in it.
    pub fn forget(self) {}

    pub fn is_finished(&self) -> bool {
        self.inner
            .slot
            .lock(|slot| matches!(slot.state, State::Finished(_)))
    }

    /// The outcome, if there is one yet. Does not count as listening.
    pub fn try_result(&self) -> Option<Result<T, E>> {
        self.inner.slot.lock(|slot| match &slot.state {
            State::Finished(result) => Some(result.clone()),
            State::Pending => None,
        })
    }
}

impl<T: Value, E: Failure> From<Result<T, E>> for Promise<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::from_result(result)
    }
}

impl<T: Value, E: Failure> Resolver<T, E> {
    /// Finishes the promise and notifies its listeners, outside of the lock.
    ///
    /// Returns `false`, and notifies nobody, if the promise had already
    /// been completed.
    pub fn complete(&self, result: Result<T, E>) -> bool {
        let listeners = self.inner.slot.lock(|slot| match slot.state {
            State::Pending => {
                slot.state = State::Finished(result.clone());
                Some(mem::take(&mut slot.listeners))
            }
            State::Finished(_) => None,
        });
        match listeners {
            Some(listeners) => {
                deliver(listeners, result);
                true
            }
            None => {
                log::debug!(
                    target: LOG_TARGET,
                    "ignoring repeated completion of Promise<{}>",
                    type_name::<T>()
                );
                false
            }
        }
    }

    pub fn resolve(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    pub fn reject(&self, error: E) -> bool {
        self.complete(Err(error))
    }
}

fn deliver<T: Value, E: Failure>(listeners: Vec<Listener<T, E>>, result: Result<T, E>) {
    let mut listeners = listeners.into_iter().peekable();
    while let Some(listener) = listeners.next() {
        if listeners.peek().is_some() {
            listener(result.clone());
        } else {
            listener(result);
            return;
        }
    }
}

//! Promises derived from other promises.
//!
//! Every combinator returns a new [`Promise`] that listens on `self`; none of
//! them block. Errors pass through untouched unless the combinator exists to
//! transform them.
//!
//! Completing a promise delivers down the chain built on it recursively, a
//! few stack frames per `map`/`then` link, on the completing thread. Chains
//! of a few thousand links are fine; tens of thousands of pending links can
//! overflow the stack. Use [`sequence`](crate::sequence) for unbounded
//! chains, it is driven iteratively.
use std::sync::Arc;

use crate::sync::Synchronized;
use crate::{Failure, Promise, Value};

impl<T: Value, E: Failure> Promise<T, E> {
    /// Chains a synchronous computation. `transform` runs on whichever
    /// thread completes `self`.
    pub fn map<U, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Value,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Promise::new(|resolver| {
            self.listen(move |result| {
                resolver.complete(result.map(transform));
            })
        })
    }

    /// Chains another asynchronous computation. The returned promise
    /// finishes with whatever the promise built by `next` finishes with.
    pub fn then<U, F>(&self, next: F) -> Promise<U, E>
    where
        U: Value,
        F: FnOnce(T) -> Promise<U, E> + Send + 'static,
    {
        Promise::new(|resolver| {
            self.listen(move |result| match result {
                Ok(value) => next(value).listen(move |result| {
                    resolver.complete(result);
                }),
                Err(error) => {
                    resolver.reject(error);
                }
            })
        })
    }

    /// Transforms the whole outcome, which allows recovering from an error
    /// or changing the error type.
    pub fn map_result<U, E2, F>(&self, transform: F) -> Promise<U, E2>
    where
        U: Value,
        E2: Failure,
        F: FnOnce(Result<T, E>) -> Result<U, E2> + Send + 'static,
    {
        Promise::new(|resolver| {
            self.listen(move |result| {
                resolver.complete(transform(result));
            })
        })
    }

    pub fn map_err<E2, F>(&self, transform: F) -> Promise<T, E2>
    where
        E2: Failure,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        self.map_result(move |result| result.map_err(transform))
    }

    /// Discards the value.
    pub fn void(&self) -> Promise<(), E> {
        self.map(|_| ())
    }

    /// Succeeds with `()` no matter how `self` finishes. Use it once a
    /// failure has been dealt with elsewhere.
    pub fn swallow(&self) -> Promise<(), E> {
        Promise::new(|resolver| {
            self.listen(move |_| {
                resolver.resolve(());
            })
        })
    }

    /// A finished promise holding the outcome of `block`.
    ///
    /// ```
    /// use swear::Promise;
    ///
    /// let parsed: Promise<u8> = Promise::catching(|| "256".parse::<u8>().map_err(swear::Error::new));
    /// assert!(parsed.wait().is_err());
    /// ```
    pub fn catching<E2, F>(block: F) -> Self
    where
        E2: Into<E>,
        F: FnOnce() -> Result<T, E2>,
    {
        Self::from_result(block().map_err(Into::into))
    }

    /// Like [`Promise::catching`], for a block that builds a promise.
    pub fn catching_then<E2, F>(block: F) -> Self
    where
        E2: Into<E>,
        F: FnOnce() -> Result<Promise<T, E>, E2>,
    {
        match block() {
            Ok(promise) => promise,
            Err(error) => Self::from_error(error.into()),
        }
    }

    /// [`Promise::map`] with a transform that may fail.
    pub fn map_catching<U, E2, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Value,
        E2: Into<E>,
        F: FnOnce(T) -> Result<U, E2> + Send + 'static,
    {
        self.then(move |value| Promise::catching(move || transform(value)))
    }

    /// [`Promise::then`] with a step that may fail before it returns a promise.
    pub fn then_catching<U, E2, F>(&self, next: F) -> Promise<U, E>
    where
        U: Value,
        E2: Into<E>,
        F: FnOnce(T) -> Result<Promise<U, E>, E2> + Send + 'static,
    {
        self.then(move |value| Promise::catching_then(move || next(value)))
    }

    /// Blocks the calling thread until the promise finishes.
    ///
    /// Never call this on the thread that is supposed to complete the
    /// promise: it will wait forever.
    pub fn wait(&self) -> Result<T, E> {
        let slot = Arc::new(Synchronized::new(None));
        let filled = slot.clone();
        self.listen(move |result| filled.set(Some(result)));
        slot.wait_map(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Promise, Synchronized};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Oops(&'static str);

    #[test]
    fn test_then_chain() {
        let promise = Promise::<i32, Oops>::from_value(1).then(|x| Promise::from_value(x + 1));
        assert_eq!(promise.wait(), Ok(2));
    }

    #[test]
    fn test_error_short_circuits() {
        let called = Arc::new(Synchronized::new(false));
        let flag = called.clone();
        let promise = Promise::<i32, Oops>::from_value(1)
            .then(|_| Promise::<i32, Oops>::from_error(Oops("nope")))
            .map(move |x| {
                flag.set(true);
                x * 10
            });
        assert_eq!(promise.wait(), Err(Oops("nope")));
        assert!(!called.get());
    }

    #[test]
    fn test_map_result_recovers() {
        let promise = Promise::<i32, Oops>::from_error(Oops("nope"))
            .map_result(|result| result.or_else(|_| Ok::<_, String>(0)));
        assert_eq!(promise.wait(), Ok(0));
    }

    #[test]
    fn test_map_err_retypes() {
        let promise = Promise::<i32, Oops>::from_error(Oops("nope")).map_err(|Oops(why)| why.len());
        assert_eq!(promise.wait(), Err(4));
    }

    #[test]
    fn test_void_keeps_error() {
        assert_eq!(Promise::<i32, Oops>::from_value(5).void().wait(), Ok(()));
        assert_eq!(
            Promise::<i32, Oops>::from_error(Oops("nope")).void().wait(),
            Err(Oops("nope"))
        );
    }

    #[test]
    fn test_swallow_discards_error() {
        let promise = Promise::<i32, Oops>::from_error(Oops("nope")).swallow();
        assert_eq!(promise.wait(), Ok(()));
    }

    #[test]
    fn test_catching_variants() {
        let ok: Promise<i32> = Promise::catching(|| Ok::<_, Error>(3));
        assert_eq!(ok.wait().unwrap(), 3);

        let failed = ok.map_catching(|x| {
            if x > 2 {
                Err("too big")
            } else {
                Ok(x)
            }
        });
        assert_eq!(failed.wait().unwrap_err().to_string(), "too big");

        let chained = Promise::<i32>::from_value(4)
            .then_catching(|x| Ok::<_, Error>(Promise::from_value(x * 2)));
        assert_eq!(chained.wait().unwrap(), 8);

        let refused: Promise<i32> = Promise::catching_then(|| Err("refused"));
        assert_eq!(refused.wait().unwrap_err().to_string(), "refused");
    }

    #[test]
    fn test_pending_map_chain_of_a_thousand_links() {
        let (root, resolver) = Promise::<u32, Oops>::pending();
        let mut tail = root.map(|x| x + 1);
        for _ in 1..1000 {
            tail = tail.map(|x| x + 1);
        }
        resolver.resolve(0);
        assert_eq!(tail.wait(), Ok(1000));
    }

    #[test]
    fn test_catching_converts_io_errors() {
        let promise: Promise<String> = Promise::catching(|| {
            std::fs::read_to_string("/definitely/not/a/real/path/🍓")
        });
        assert!(matches!(promise.wait(), Err(Error::Other(_))));
    }

    #[test]
    fn test_wait_across_threads() {
        let promise = Promise::<String, Oops>::new(|resolver| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                resolver.resolve(String::from("🍓"));
            });
        });
        let mapped = promise.map(|value| format!("{value}!"));
        let task = thread::spawn(move || mapped.wait());
        assert_eq!(
            task.join().expect("The waiting thread has panicked"),
            Ok("🍓!".to_string())
        );
        assert_eq!(promise.wait(), Ok("🍓".to_string()));
    }
}

//! Listenable promises.
//!
//! A [`Promise`] holds a value that becomes available exactly once, or an
//! error. Unlike Rust futures, a promise starts running as soon as it is
//! built: the producer handed to [`Promise::new`] runs synchronously inside
//! the constructor and gets a [`Resolver`] it may call later from any
//! thread. Consumers [`listen`](Promise::listen), block with
//! [`wait`](Promise::wait), or `.await` the promise.
//!
//! # Examples
//!
//! ```
//! use swear::{Promise, Resolver};
//! use std::thread;
//!
//! let promise: Promise<u32> = Promise::new(|resolver: Resolver<u32>| {
//!     thread::spawn(move || resolver.resolve(20));
//! });
//! let answer = promise.map(|x| x * 2).then(|x| Promise::from_value(x + 2));
//! assert_eq!(answer.wait().unwrap(), 42);
//! ```
//!
//! Promises that are dropped while still pending, or that failed without
//! anyone listening, are reported through the `log` facade.
use std::fmt::{self, Debug};
use std::io;
use std::sync::Arc;

pub mod aggregate;
pub mod combinator;
pub mod get;
pub mod promise;
pub mod sync;

pub use aggregate::{all, sequence};
pub use get::Get;
pub use promise::{Promise, Resolver};
pub use sync::Synchronized;

pub(crate) const LOG_TARGET: &str = "swear::promise";

/// Values a promise can carry. Every listener receives its own copy.
pub trait Value: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Value for T {}

/// Errors a promise can carry. `Debug` is what the drop diagnostics print.
pub trait Failure: Clone + Send + Debug + 'static {}

impl<E: Clone + Send + Debug + 'static> Failure for E {}

/// The default, type-erased error of a [`Promise`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Other(Arc::new(error))
    }

    pub fn msg(message: impl fmt::Display) -> Self {
        Error::Message(message.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::new(error)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Message(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Message(message.to_owned())
    }
}

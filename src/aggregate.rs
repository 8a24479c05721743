//! Joining several promises into one.
use std::fmt::Debug;
use std::iter;
use std::mem;
use std::sync::Arc;

use crate::sync::Synchronized;
use crate::{Failure, Promise, Resolver, Value};

struct Join<T> {
    values: Vec<Option<T>>,
    remaining: usize,
    failed: bool,
}

/// Finishes once every promise has succeeded, or with the first failure.
///
/// The promises may be completed concurrently from different threads. The
/// values are reported in the order the promises were given, not in the
/// order they finished. Outcomes arriving after a failure are dropped. No
/// promises at all means immediate success with an empty `Vec`.
///
/// ```
/// use swear::{all, Promise};
///
/// let (slow, resolver) = Promise::<i32>::pending();
/// let joined = all([slow, Promise::from_value(2), Promise::from_value(3)]);
/// resolver.resolve(1);
/// assert_eq!(joined.wait().unwrap(), vec![1, 2, 3]);
/// ```
pub fn all<T, E, I>(promises: I) -> Promise<Vec<T>, E>
where
    T: Value,
    E: Failure,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    if promises.is_empty() {
        return Promise::from_value(Vec::new());
    }
    Promise::new(|resolver| {
        let join = Arc::new(Synchronized::new(Join {
            values: iter::repeat_with(|| None).take(promises.len()).collect(),
            remaining: promises.len(),
            failed: false,
        }));
        for (index, promise) in promises.iter().enumerate() {
            let join = join.clone();
            let resolver = resolver.clone();
            promise.listen(move |result| {
                let finished = join.lock(|join| {
                    if join.failed || join.remaining == 0 {
                        return None;
                    }
                    match result {
                        Ok(value) => {
                            join.values[index] = Some(value);
                            join.remaining -= 1;
                            (join.remaining == 0)
                                .then(|| Ok(join.values.drain(..).flatten().collect()))
                        }
                        Err(error) => {
                            join.failed = true;
                            Some(Err(error))
                        }
                    }
                });
                if let Some(result) = finished {
                    resolver.complete(result);
                }
            });
        }
    })
}

/// Runs the steps one after another, each one only after the previous one
/// succeeded, and collects their values in order. The first failure ends
/// the sequence; later steps are never invoked.
///
/// Steps that finish synchronously are driven in a loop, so a long
/// sequence of them does not grow the stack.
///
/// ```
/// use swear::{sequence, Promise};
///
/// let steps = (1..=3).map(|n| move || Promise::<i32>::from_value(n * 10));
/// assert_eq!(sequence(steps).wait().unwrap(), vec![10, 20, 30]);
/// ```
pub fn sequence<T, E, I, F>(steps: I) -> Promise<Vec<T>, E>
where
    T: Value,
    E: Failure,
    I: IntoIterator<Item = F>,
    I::IntoIter: Send + 'static,
    F: FnOnce() -> Promise<T, E>,
{
    Promise::new(|resolver| {
        Sequence::run(Sequence {
            steps: steps.into_iter(),
            values: Vec::new(),
            resolver,
        })
    })
}

struct Sequence<S, T, E: Debug> {
    steps: S,
    values: Vec<T>,
    resolver: Resolver<Vec<T>, E>,
}

/// Hands a step's outcome either back to the loop that registered the
/// listener, or, once that loop has parked the sequence, to the listener.
enum Handoff<Q, R> {
    Registering,
    Delivered(R),
    Parked(Q),
}

impl<S, T, E, F> Sequence<S, T, E>
where
    S: Iterator<Item = F> + Send + 'static,
    F: FnOnce() -> Promise<T, E>,
    T: Value,
    E: Failure,
{
    fn run(mut sequence: Self) {
        loop {
            let Some(step) = sequence.steps.next() else {
                sequence.resolver.resolve(sequence.values);
                return;
            };
            let handoff = Arc::new(Synchronized::new(
                Handoff::<Self, Result<T, E>>::Registering,
            ));
            let listener = handoff.clone();
            step().listen(move |result| {
                let parked = listener.lock(|handoff| {
                    match mem::replace(handoff, Handoff::Registering) {
                        Handoff::Registering => {
                            *handoff = Handoff::Delivered(result);
                            None
                        }
                        Handoff::Parked(sequence) => Some((sequence, result)),
                        Handoff::Delivered(_) => None,
                    }
                });
                if let Some((mut sequence, result)) = parked {
                    if sequence.advance(result) {
                        Sequence::run(sequence);
                    }
                }
            });
            let delivered = handoff.lock(move |handoff| {
                match mem::replace(handoff, Handoff::Registering) {
                    Handoff::Delivered(result) => Some((sequence, result)),
                    _ => {
                        *handoff = Handoff::Parked(sequence);
                        None
                    }
                }
            });
            match delivered {
                Some((resumed, result)) => {
                    sequence = resumed;
                    if !sequence.advance(result) {
                        return;
                    }
                }
                None => return,
            }
        }
    }

    fn advance(&mut self, result: Result<T, E>) -> bool {
        match result {
            Ok(value) => {
                self.values.push(value);
                true
            }
            Err(error) => {
                self.resolver.reject(error);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use std::sync::Arc;
    use std::{thread, time::Duration};
    use swear::{all, sequence, Error, Promise, Resolver, Synchronized};

    fn delayed<T: Clone + Send + 'static>(value: T, millis: u64) -> Promise<T> {
        Promise::new(|resolver: Resolver<T>| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(millis));
                resolver.resolve(value);
            });
        })
    }

    #[test]
    fn test_promise_resolve() {
        let (promise, resolver) = Promise::<String>::pending();
        let task1 = thread::spawn(move || promise.wait());
        let task2 = thread::spawn(move || resolver.resolve(String::from("🍓")));
        assert!(task2.join().expect("The task2 thread has panicked"));
        let value = task1.join().expect("The task1 thread has panicked");
        assert_eq!(value.unwrap(), "🍓");
    }

    #[test]
    fn test_promise_reject() {
        let (promise, resolver) = Promise::<String>::pending();
        let task1 = thread::spawn(move || block_on(async { promise.await }));
        let task2 = thread::spawn(move || resolver.reject("reject!!".into()));
        task2.join().expect("The task2 thread has panicked");
        let error = task1.join().expect("The task1 thread has panicked").unwrap_err();
        assert_eq!(error.to_string(), "reject!!");
    }

    #[test]
    fn test_two_consumers() {
        let promise = delayed(42, 30);
        let copy = promise.clone();
        let task1 = thread::spawn(move || promise.wait().unwrap());
        let task2 = thread::spawn(move || block_on(copy.get()).unwrap());
        assert_eq!(task1.join().expect("The task1 thread has panicked"), 42);
        assert_eq!(task2.join().expect("The task2 thread has panicked"), 42);
    }

    #[test]
    fn test_chain_across_threads() {
        let promise = delayed(1, 10)
            .then(|x| delayed(x + 1, 10))
            .map(|x| x * 10)
            .then(|x| Promise::from_value(x + 1));
        assert_eq!(promise.wait().unwrap(), 21);
    }

    #[test]
    fn test_error_skips_rest_of_chain() {
        let touched = Arc::new(Synchronized::new(false));
        let flag = touched.clone();
        let promise = delayed(1, 10)
            .then(|_| Promise::<i32>::from_error(Error::msg("boom")))
            .map(move |x| {
                flag.set(true);
                x
            });
        assert_eq!(promise.wait().unwrap_err().to_string(), "boom");
        assert!(!touched.get());
    }

    #[test]
    fn test_all_of_delayed() {
        let joined = all([delayed(1, 40), delayed(2, 20), delayed(3, 0)]);
        assert_eq!(joined.wait().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_all_with_failure() {
        let joined = all([
            delayed(1, 10),
            Promise::from_error(Error::msg("E")),
            delayed(3, 10),
        ]);
        assert_eq!(joined.wait().unwrap_err().to_string(), "E");
    }

    #[test]
    fn test_sequence_of_delayed() {
        let steps: Vec<fn() -> Promise<i32>> = vec![|| delayed(1, 20), || delayed(2, 0)];
        assert_eq!(sequence(steps).wait().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_late_listener_after_thread_completion() {
        let promise = delayed("🍓", 0);
        promise.wait().unwrap();
        let seen = Arc::new(Synchronized::new(None));
        let sink = seen.clone();
        promise.listen(move |result| sink.set(result.ok()));
        assert_eq!(seen.get(), Some("🍓"));
    }

    #[test]
    fn test_peek_listen_and_try_result() {
        let (promise, resolver) = Promise::<i32>::pending();
        let seen = Arc::new(Synchronized::new(0));
        let sink = seen.clone();
        assert!(promise
            .peek_listen(move |result| sink.set(result.unwrap_or_default()))
            .try_result()
            .is_none());
        resolver.resolve(9);
        assert_eq!(seen.get(), 9);
        assert_eq!(promise.try_result().map(Result::unwrap), Some(9));
        promise.forget();
    }
}

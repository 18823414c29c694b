//! Concurrency-capped execution of independent judging calls

use crate::error::{JudgeError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

/// Run `jobs` on at most `concurrency` worker threads.
///
/// Returns one result per job, in job order. A failing job does not affect the
/// others. Once `cancel` is set no further jobs are started; jobs that never
/// ran report [`JudgeError::Interrupted`].
pub fn run_batch<T, F>(jobs: Vec<F>, concurrency: usize, cancel: Option<&AtomicBool>) -> Vec<Result<T>>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    let total = jobs.len();
    let workers = concurrency.max(1).min(total);
    let queue = Mutex::new(jobs.into_iter().enumerate().collect::<VecDeque<_>>());
    let (sender, receiver) = mpsc::channel::<(usize, Result<T>)>();

    tracing::debug!(total, workers, "starting batch");

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let queue = &queue;
            scope.spawn(move || loop {
                if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                    break;
                }
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some((index, job)) = next else {
                    break;
                };
                if sender.send((index, job())).is_err() {
                    break;
                }
            });
        }
    });
    drop(sender);

    let mut results: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();
    for (index, result) in receiver {
        results[index] = Some(result);
    }

    let skipped = results.iter().filter(|r| r.is_none()).count();
    if skipped > 0 {
        tracing::warn!(skipped, total, "batch interrupted before all jobs ran");
    }

    results
        .into_iter()
        .map(|r| r.unwrap_or(Err(JudgeError::Interrupted)))
        .collect()
}

//! Background dialog round-trips.
//!
//! A [`HostTask`] moves the host onto a worker thread, runs one job against
//! it and hands both back through a channel, so the UI keeps painting while
//! a native dialog is open.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::{debug, error};

/// Result of polling a [`HostTask`].
#[derive(Debug)]
pub enum TaskState<T> {
    Running,
    Finished(T),
    /// The worker died without answering.
    Lost,
}

pub struct HostTask<H, T> {
    receiver: Receiver<(H, T)>,
}

impl<H, T> HostTask<H, T>
where
    H: Send + 'static,
    T: Send + 'static,
{
    /// Run `job` on a new thread. `notify` runs after the result is sent,
    /// typically to wake the UI.
    pub fn spawn<F, N>(mut host: H, job: F, notify: N) -> Self
    where
        F: FnOnce(&mut H) -> T + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("file-dialog".into())
            .spawn(move || {
                let out = job(&mut host);
                let _ = sender.send((host, out));
                notify();
            });
        if let Err(err) = spawned {
            // The sender was dropped with the closure, so polling reports Lost.
            error!("could not start dialog thread: {}", err);
        } else {
            debug!("dialog task started");
        }
        Self { receiver }
    }

    /// Non-blocking check for the job's result.
    pub fn poll(&self) -> TaskState<(H, T)> {
        match self.receiver.try_recv() {
            Ok(done) => TaskState::Finished(done),
            Err(TryRecvError::Empty) => TaskState::Running,
            Err(TryRecvError::Disconnected) => TaskState::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    use super::*;
    use crate::bridge::fake::FakeHost;
    use crate::bridge::{self, Outcome};

    fn wait<H: Send + 'static, T: Send + 'static>(task: &HostTask<H, T>) -> TaskState<(H, T)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match task.poll() {
                TaskState::Running if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5))
                }
                state => return state,
            }
        }
    }

    #[test]
    fn host_comes_back_with_the_result() {
        let mut host = FakeHost::default();
        host.open_answer = Some(PathBuf::from("/pics/cat.png"));
        host.files.insert(PathBuf::from("/pics/cat.png"), b"\x89PNG".to_vec());

        let woke = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&woke);
        let task = HostTask::spawn(
            host,
            |host: &mut FakeHost| bridge::select_image(host),
            move || flag.store(true, Ordering::SeqCst),
        );

        match wait(&task) {
            TaskState::Finished((host, Ok(Outcome::Done(selected)))) => {
                assert_eq!(host.open_dialogs, 1);
                assert_eq!(selected.file_name, "cat.png");
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(woke.load(Ordering::SeqCst));
    }

    #[test]
    fn cancelled_dialog_finishes_as_cancelled() {
        let task = HostTask::spawn(FakeHost::default(), |host| bridge::select_image(host), || {});
        assert!(matches!(
            wait(&task),
            TaskState::Finished((_, Ok(Outcome::Cancelled)))
        ));
    }

    #[test]
    fn panicking_job_is_reported_lost() {
        let task: HostTask<FakeHost, ()> =
            HostTask::spawn(FakeHost::default(), |_| panic!("dialog crashed"), || {});
        assert!(matches!(wait(&task), TaskState::Lost));
    }
}

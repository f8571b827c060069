//! Worker-thread tally writes
//!
//! Wraps another store so `increment_tally`/`set_tally` return immediately;
//! the wrapped store applies them in order on a dedicated thread. Dropping the
//! wrapper closes the channel and waits for queued writes to finish.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use super::TallyStore;

enum Command {
    Increment,
    Set(u64),
    Flush(mpsc::Sender<()>),
}

fn apply<S: TallyStore>(store: &S, command: Command) {
    match command {
        Command::Increment => store.increment_tally(),
        Command::Set(value) => store.set_tally(value),
        Command::Flush(ack) => {
            let _ = ack.send(());
        }
    }
}

pub struct BackgroundTallyStore<S: TallyStore + Send + Sync + 'static> {
    inner: Arc<S>,
    sender: Option<mpsc::Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: TallyStore + Send + Sync + 'static> BackgroundTallyStore<S> {
    pub fn new(store: S) -> Self {
        let inner = Arc::new(store);
        let (sender, receiver) = mpsc::channel::<Command>();
        let worker_store = Arc::clone(&inner);

        let spawned = thread::Builder::new()
            .name("tally-writer".into())
            .spawn(move || {
                while let Ok(command) = receiver.recv() {
                    apply(worker_store.as_ref(), command);
                }
                log::debug!("Tally writer stopped");
            });

        match spawned {
            Ok(worker) => Self {
                inner,
                sender: Some(sender),
                worker: Some(worker),
            },
            Err(e) => {
                log::warn!("Failed to start tally writer ({e}); writing synchronously");
                Self {
                    inner,
                    sender: None,
                    worker: None,
                }
            }
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn dispatch(&self, command: Command) {
        match &self.sender {
            Some(sender) => {
                if let Err(mpsc::SendError(command)) = sender.send(command) {
                    log::warn!("Tally writer is gone; writing synchronously");
                    apply(self.inner.as_ref(), command);
                }
            }
            None => apply(self.inner.as_ref(), command),
        }
    }

    /// Block until every write queued so far has been applied
    pub fn flush(&self) {
        let (ack, done) = mpsc::channel();
        self.dispatch(Command::Flush(ack));
        let _ = done.recv();
    }
}

impl<S: TallyStore + Send + Sync + 'static> TallyStore for BackgroundTallyStore<S> {
    fn get_tally(&self) -> u64 {
        self.inner.get_tally()
    }

    fn increment_tally(&self) {
        self.dispatch(Command::Increment);
    }

    fn set_tally(&self, value: u64) {
        self.dispatch(Command::Set(value));
    }
}

impl<S: TallyStore + Send + Sync + 'static> Drop for BackgroundTallyStore<S> {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Tally writer panicked");
            }
        }
    }
}

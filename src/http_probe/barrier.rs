use tokio::sync::mpsc;

/// Join barrier for one probe invocation.
///
/// Every task that is launched gets a [`Completion`] from [`JoinBarrier::register`].
/// [`JoinBarrier::wait`] returns once each registered completion has either
/// delivered its value or been dropped, so a task that dies early cannot
/// leave the caller waiting forever.
pub struct JoinBarrier<T> {
    pending: usize,
    sender: mpsc::UnboundedSender<T>,
    receiver: mpsc::UnboundedReceiver<T>,
}

/// Handle owned by one task, used to signal that it finished.
pub struct Completion<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Completion<T> {
    pub fn complete(self, value: T) {
        if self.sender.send(value).is_err() {
            log::warn!("Barrier dropped before the task completed");
        }
    }
}

impl<T> Default for JoinBarrier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JoinBarrier<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        JoinBarrier {
            pending: 0,
            sender,
            receiver,
        }
    }

    pub fn register(&mut self) -> Completion<T> {
        self.pending += 1;
        Completion {
            sender: self.sender.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Blocks until every registered task reported back, returns the values in arrival order.
    pub async fn wait(self) -> Vec<T> {
        let JoinBarrier {
            pending,
            sender,
            mut receiver,
        } = self;
        // only the completions keep the channel open from here on
        drop(sender);

        let mut completed = Vec::with_capacity(pending);
        while completed.len() < pending {
            match receiver.recv().await {
                Some(value) => completed.push(value),
                None => {
                    log::warn!(
                        "{} task(s) ended without reporting a result",
                        pending - completed.len()
                    );
                    break;
                }
            }
        }
        completed
    }
}

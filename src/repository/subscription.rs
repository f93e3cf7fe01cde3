use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use super::Snapshot;

/// A live view of a repository's collection.
///
/// Yields the snapshot current at subscription time first, then every later
/// snapshot in commit order. Ends once the repository is closed or dropped.
pub struct Subscription<E> {
    initial: Option<Snapshot<E>>,
    receiver: Option<broadcast::Receiver<Snapshot<E>>>,
    kind: &'static str,
}

impl<E: Clone + Send + Sync + 'static> Subscription<E> {
    pub(super) fn new(
        initial: Snapshot<E>,
        receiver: Option<broadcast::Receiver<Snapshot<E>>>,
        kind: &'static str,
    ) -> Self {
        Self {
            initial: Some(initial),
            receiver,
            kind,
        }
    }

    /// Next snapshot, or `None` after the repository closed.
    ///
    /// A subscriber that falls more than the channel capacity behind skips
    /// the missed intermediate snapshots and continues with newer ones.
    pub async fn next(&mut self) -> Option<Snapshot<E>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(kind = self.kind, skipped, "Subscriber lagged, skipping snapshots");
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Adapt into a `futures::Stream` of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Snapshot<E>> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|snapshot| (snapshot, sub))
        })
    }
}

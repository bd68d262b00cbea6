//! The committed place name shared by every dashboard section.
//!
//! One [`PlaceWriter`] exists per store; it is handed to whatever commits
//! searches. Any number of [`PlaceReader`]s observe the value. Updates swap the
//! whole `Arc<str>`, so a reader never sees a partially written name.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub struct SelectedPlace;

impl SelectedPlace {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(initial: impl Into<Arc<str>>) -> (PlaceWriter, PlaceReader) {
        let (tx, rx) = watch::channel(initial.into());
        (PlaceWriter { tx }, PlaceReader { rx })
    }
}

#[derive(Debug)]
pub struct PlaceWriter {
    tx: watch::Sender<Arc<str>>,
}

impl PlaceWriter {
    /// Commit a new place and wake every reader, even if the name is unchanged.
    pub fn commit(&self, place: impl Into<Arc<str>>) {
        let place = place.into();
        info!(place = %place, "Place committed");
        self.tx.send_replace(place);
    }

    pub fn current(&self) -> Arc<str> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> PlaceReader {
        PlaceReader {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceReader {
    rx: watch::Receiver<Arc<str>>,
}

impl PlaceReader {
    pub fn current(&self) -> Arc<str> {
        self.rx.borrow().clone()
    }

    /// Read the value and mark it as seen by this reader.
    pub fn current_and_mark_seen(&mut self) -> Arc<str> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next commit. Fails once the writer is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn readers_observe_committed_value() {
        let (writer, reader) = SelectedPlace::new("London");
        let other = reader.clone();

        assert_eq!(&*reader.current(), "London");
        writer.commit("Paris");
        assert_eq!(&*reader.current(), "Paris");
        assert_eq!(&*other.current(), "Paris");
        assert_eq!(&*writer.current(), "Paris");
    }

    #[tokio::test]
    async fn readers_are_woken_on_commit() {
        let (writer, mut reader) = SelectedPlace::new("London");
        reader.current_and_mark_seen();

        let waiter = tokio::spawn(async move {
            reader.changed().await.expect("writer alive");
            reader.current_and_mark_seen()
        });

        writer.commit("Lisbon");
        let seen = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("reader woken")
            .expect("task completed");
        assert_eq!(&*seen, "Lisbon");
    }

    #[tokio::test]
    async fn same_value_commit_still_notifies() {
        let (writer, mut reader) = SelectedPlace::new("Oslo");
        reader.current_and_mark_seen();

        writer.commit("Oslo");
        assert!(reader.changed().await.is_ok());
    }

    #[tokio::test]
    async fn dropping_writer_ends_subscription() {
        let (writer, mut reader) = SelectedPlace::new("Rome");
        reader.current_and_mark_seen();
        drop(writer);
        assert!(reader.changed().await.is_err());
    }
}

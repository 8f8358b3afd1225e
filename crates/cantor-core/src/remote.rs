//! Lock-free queue for pitch events supplied by a network peer.
//!
//! SPSC pattern:
//! - Producer: network receive thread
//! - Consumer: the judge, drained once per tick before scheduling

use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use tracing::warn;

/// Pitch detected on a remote device, already tagged with its song beat.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RemotePitchEvent {
    pub beat: i32,
    pub semitone: i32,
    pub frequency_hz: f32,
}

/// Create a bounded queue for remote pitch events.
pub fn remote_pitch_queue(capacity: usize) -> (RemotePitchProducer, RemotePitchConsumer) {
    let rb = HeapRb::<RemotePitchEvent>::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (
        RemotePitchProducer { producer },
        RemotePitchConsumer { consumer },
    )
}

/// Sending half; move it to the network thread.
pub struct RemotePitchProducer {
    producer: HeapProd<RemotePitchEvent>,
}

impl RemotePitchProducer {
    /// Push an event. Returns false (event dropped) when the queue is full.
    #[inline]
    pub fn push(&mut self, event: RemotePitchEvent) -> bool {
        if self.producer.try_push(event).is_err() {
            warn!(beat = event.beat, "remote pitch queue full, dropping event");
            return false;
        }
        true
    }
}

/// Receiving half, owned by the judge.
pub struct RemotePitchConsumer {
    consumer: HeapCons<RemotePitchEvent>,
}

impl RemotePitchConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<RemotePitchEvent> {
        self.consumer.try_pop()
    }

    /// Number of queued events.
    #[inline]
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Pop everything currently queued, in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = RemotePitchEvent> + '_ {
        core::iter::from_fn(move || self.consumer.try_pop())
    }
}

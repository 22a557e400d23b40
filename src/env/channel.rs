//! Outgoing packet channel.
//!
//! The guest hands signed network payloads to `ChannelProxy.sendMessage`; the real network layer
//! picks them up through [`PacketChannel::await_and_drain`]. Publishing happens on the dispatch
//! path and never blocks. Draining is the only blocking operation of the environment.
//!
//! # Synchronization
//!
//! A single mutex guards the queue and a condition variable wakes one waiting consumer per
//! published packet. Consumers wait with `wait_while`, so spurious wake-ups re-check the queue
//! instead of returning early.
//!
//! # Examples
//!
//! ```rust
//! use qsecenv::env::{OutgoingPacket, PacketChannel};
//! use std::{sync::Arc, thread};
//!
//! let channel = Arc::new(PacketChannel::new(16));
//!
//! let consumer = {
//!     let channel = Arc::clone(&channel);
//!     thread::spawn(move || channel.await_and_drain())
//! };
//!
//! channel.publish(OutgoingPacket::new("trpc.o3.ecdh_access.EcdhAccess.SsoSecureA2Establish", vec![1, 2], 7))?;
//!
//! let packet = consumer.join().unwrap()?;
//! assert_eq!(packet.correlation_id, 7);
//! # Ok::<(), qsecenv::Error>(())
//! ```

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex},
    time::Duration,
};

use crate::{utils::to_hex, Error, Result};

/// Correlation id marking a packet that expects no response and is never queued.
pub const DISCARD_CORRELATION_ID: i64 = -1;

/// A signed payload emitted by the guest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingPacket {
    /// The service command, e.g. `trpc.o3.ecdh_access.EcdhAccess.SsoSecureA2Establish`.
    pub command: String,

    /// The signed payload.
    pub payload: Vec<u8>,

    /// Pairs the packet with the request that caused it.
    pub correlation_id: i64,
}

impl OutgoingPacket {
    /// Creates a packet.
    #[must_use]
    pub fn new(command: impl Into<String>, payload: Vec<u8>, correlation_id: i64) -> Self {
        Self {
            command: command.into(),
            payload,
            correlation_id,
        }
    }

    /// Returns `true` if this packet carries the discard correlation id.
    #[must_use]
    pub fn is_discard(&self) -> bool {
        self.correlation_id == DISCARD_CORRELATION_ID
    }

    /// Returns the payload as a lower-case hex string.
    #[must_use]
    pub fn payload_hex(&self) -> String {
        to_hex(&self.payload)
    }
}

/// Bounded FIFO hand-off between the dispatch path and the network layer.
///
/// When the queue is full, publishing evicts the oldest packet with a warning instead of waiting
/// for the consumer.
#[derive(Debug)]
pub struct PacketChannel {
    queue: Mutex<VecDeque<OutgoingPacket>>,
    available: Condvar,
    capacity: usize,
}

impl PacketChannel {
    /// Creates a channel holding at most `capacity` packets.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Returns the maximum number of queued packets.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publishes a packet and wakes at most one waiting consumer.
    ///
    /// Packets with the discard correlation id are logged and dropped without touching the queue
    /// or waking anyone.
    ///
    /// # Returns
    ///
    /// `true` if the packet was queued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn publish(&self, packet: OutgoingPacket) -> Result<bool> {
        if packet.is_discard() {
            log::debug!("Dropping packet {} without correlation id", packet.command);
            return Ok(false);
        }

        {
            let mut queue = lock!(self.queue);
            if queue.len() >= self.capacity {
                if let Some(evicted) = queue.pop_front() {
                    log::warn!(
                        "Packet queue full ({}), evicting {} id = {}",
                        self.capacity,
                        evicted.command,
                        evicted.correlation_id
                    );
                }
            }
            queue.push_back(packet);
        }

        self.available.notify_one();
        Ok(true)
    }

    /// Blocks until a packet is available, then removes and returns the oldest one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn await_and_drain(&self) -> Result<OutgoingPacket> {
        let queue = lock!(self.queue);
        let mut queue = self
            .available
            .wait_while(queue, |queue| queue.is_empty())
            .map_err(|_| Error::LockError)?;

        queue
            .pop_front()
            .ok_or_else(|| Error::Error("Packet queue empty after wake-up".to_string()))
    }

    /// Like [`await_and_drain`](Self::await_and_drain), but gives up after `timeout`.
    ///
    /// # Returns
    ///
    /// The oldest packet, or `None` if none arrived in time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn drain_timeout(&self, timeout: Duration) -> Result<Option<OutgoingPacket>> {
        let queue = lock!(self.queue);
        let (mut queue, _) = self
            .available
            .wait_timeout_while(queue, timeout, |queue| queue.is_empty())
            .map_err(|_| Error::LockError)?;

        Ok(queue.pop_front())
    }

    /// Removes and returns the oldest packet without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn try_drain(&self) -> Result<Option<OutgoingPacket>> {
        Ok(lock!(self.queue).pop_front())
    }

    /// Returns the number of queued packets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(lock!(self.queue).len())
    }

    /// Returns `true` if no packets are queued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue was poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(lock!(self.queue).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Instant};

    fn packet(id: i64) -> OutgoingPacket {
        OutgoingPacket::new(format!("cmd.{id}"), vec![id as u8], id)
    }

    #[test]
    fn test_fifo() {
        let channel = PacketChannel::new(8);
        assert!(channel.publish(packet(1)).unwrap());
        assert!(channel.publish(packet(2)).unwrap());
        assert_eq!(channel.len().unwrap(), 2);

        assert_eq!(channel.await_and_drain().unwrap(), packet(1));
        assert_eq!(channel.await_and_drain().unwrap(), packet(2));
        assert!(channel.is_empty().unwrap());
    }

    #[test]
    fn test_discard_is_not_queued() {
        let channel = PacketChannel::new(8);
        assert!(!channel.publish(packet(DISCARD_CORRELATION_ID)).unwrap());
        assert!(channel.is_empty().unwrap());
        assert_eq!(channel.try_drain().unwrap(), None);
    }

    #[test]
    fn test_full_queue_evicts_oldest() {
        let channel = PacketChannel::new(2);
        for id in 1..=3 {
            channel.publish(packet(id)).unwrap();
        }
        assert_eq!(channel.len().unwrap(), 2);
        assert_eq!(channel.try_drain().unwrap(), Some(packet(2)));
        assert_eq!(channel.try_drain().unwrap(), Some(packet(3)));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let channel = PacketChannel::new(0);
        assert_eq!(channel.capacity(), 1);
        channel.publish(packet(1)).unwrap();
        channel.publish(packet(2)).unwrap();
        assert_eq!(channel.try_drain().unwrap(), Some(packet(2)));
    }

    #[test]
    fn test_drain_timeout_expires() {
        let channel = PacketChannel::new(1);
        let start = Instant::now();
        assert_eq!(channel.drain_timeout(Duration::from_millis(20)).unwrap(), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_consumer_blocks_until_publish() {
        let channel = Arc::new(PacketChannel::new(4));
        let consumer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.await_and_drain().unwrap())
        };

        thread::sleep(Duration::from_millis(20));
        channel.publish(packet(42)).unwrap();

        assert_eq!(consumer.join().unwrap(), packet(42));
    }

    #[test]
    fn test_payload_hex() {
        let packet = OutgoingPacket::new("cmd", vec![0xde, 0xad, 0x01], 1);
        assert_eq!(packet.payload_hex(), "dead01");
        assert!(!packet.is_discard());
    }
}

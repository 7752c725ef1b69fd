//! Per-player connection state and the outgoing message queue.

use std::collections::VecDeque;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// FIFO of pending outbound messages for one player.
///
/// Messages are appended at the tail and flushed from the head, one
/// message per write-readiness event. The queue tracks how much of the
/// head message has already reached the socket, so a partial write
/// resumes from the unsent remainder instead of re-sending the whole
/// message.
#[derive(Debug, Default)]
pub struct OutgoingQueue {
    messages: VecDeque<Vec<u8>>,
    /// Bytes of the head message already handed to the socket.
    head_sent: usize,
}

impl OutgoingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a complete message at the tail.
    pub fn push(&mut self, message: String) {
        self.messages.push_back(message.into_bytes());
    }

    /// Returns the unsent remainder of the head message, if any.
    pub fn head(&self) -> Option<&[u8]> {
        self.messages.front().map(|m| &m[self.head_sent..])
    }

    /// Records `n` more bytes of the head message as sent.
    ///
    /// Returns true if the head message is now complete and has been
    /// dequeued.
    pub fn advance(&mut self, n: usize) -> bool {
        self.head_sent += n;
        if let Some(front) = self.messages.front() {
            if self.head_sent >= front.len() {
                self.messages.pop_front();
                self.head_sent = 0;
                return true;
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

/// A player occupying one connection slot.
///
/// The slot table stores these as `Option<Player>`: an empty slot is
/// `None`, a connected player has `draining == false`, and a player on
/// the way out has `draining == true` until their queue empties and the
/// slot is reclaimed.
#[derive(Debug)]
pub struct Player {
    /// Stable for the lifetime of the slot occupancy; slot index + 1.
    pub id: u32,
    pub addr: SocketAddr,
    pub stream: TcpStream,
    pub queue: OutgoingQueue,
    /// No further reads are serviced once set; the slot is reclaimed as
    /// soon as the queue drains.
    pub draining: bool,
}

impl Player {
    pub fn new(id: u32, addr: SocketAddr, stream: TcpStream) -> Self {
        Self {
            id,
            addr,
            stream,
            queue: OutgoingQueue::new(),
            draining: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_starts_empty() {
        let queue = OutgoingQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.head().is_none());
    }

    #[test]
    fn test_queue_preserves_fifo_order() {
        let mut queue = OutgoingQueue::new();
        queue.push("first\n".to_string());
        queue.push("second\n".to_string());
        queue.push("third\n".to_string());

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.head().unwrap(), b"first\n");

        assert!(queue.advance(6));
        assert_eq!(queue.head().unwrap(), b"second\n");

        assert!(queue.advance(7));
        assert_eq!(queue.head().unwrap(), b"third\n");

        assert!(queue.advance(6));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_partial_write_resumes_from_offset() {
        let mut queue = OutgoingQueue::new();
        queue.push("abcdef".to_string());

        assert!(!queue.advance(2));
        assert_eq!(queue.head().unwrap(), b"cdef");

        assert!(!queue.advance(3));
        assert_eq!(queue.head().unwrap(), b"f");

        assert!(queue.advance(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_offset_resets_between_messages() {
        let mut queue = OutgoingQueue::new();
        queue.push("long message\n".to_string());
        queue.push("hi\n".to_string());

        assert!(!queue.advance(5));
        assert!(queue.advance(8));
        // The next head must start from its own byte 0.
        assert_eq!(queue.head().unwrap(), b"hi\n");
    }
}

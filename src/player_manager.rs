//! Slot-based registry of connected players with broadcast queuing.
//!
//! The manager owns a fixed number of connection slots, allocated at
//! startup and immutable thereafter. It is the only place slots are
//! allocated or reclaimed, and it maintains the active-player count
//! incrementally so the reactor never has to rescan the table.

use log::{debug, info};
use std::net::SocketAddr;
use tokio::net::TcpStream;

use crate::player::Player;

/// Fixed-capacity table of player slots.
///
/// A slot holds at most one player at a time. Player ids are the slot
/// index plus one, so ids are reused across occupants of the same slot
/// over time but never aliased concurrently.
pub struct PlayerManager {
    slots: Vec<Option<Player>>,
    /// Count of occupied slots (connected or draining), maintained on
    /// every allocation and reclamation.
    active: usize,
}

impl PlayerManager {
    /// Creates a manager with `max_players` slots.
    pub fn new(max_players: usize) -> Self {
        Self {
            slots: (0..max_players).map(|_| None).collect(),
            active: 0,
        }
    }

    /// Number of slots, fixed at startup.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots (connected or draining).
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn is_full(&self) -> bool {
        self.active == self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    pub fn get(&self, slot: usize) -> Option<&Player> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Player> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Seats a new connection in the first free slot.
    ///
    /// Returns the assigned player id, or None if every slot is taken,
    /// in which case the stream is dropped and the connection closed.
    pub fn add_player(&mut self, stream: TcpStream, addr: SocketAddr) -> Option<u32> {
        let slot = self.slots.iter().position(Option::is_none)?;
        let id = slot as u32 + 1;

        self.slots[slot] = Some(Player::new(id, addr, stream));
        self.active += 1;
        info!("Player {} connected from {}", id, addr);

        Some(id)
    }

    /// Frees a slot: closes the handle, discards any queued messages,
    /// and decrements the active count. Returns the freed player's id.
    pub fn reclaim(&mut self, slot: usize) -> Option<u32> {
        let player = self.slots.get_mut(slot)?.take()?;
        self.active -= 1;
        debug!(
            "Reclaimed slot {} (player {}, {} queued message(s) discarded)",
            slot,
            player.id,
            player.queue.len()
        );
        Some(player.id)
    }

    /// Appends a message to one player's queue.
    pub fn enqueue(&mut self, id: u32, message: String) {
        let slot = (id - 1) as usize;
        if let Some(player) = self.get_mut(slot) {
            player.queue.push(message);
        }
    }

    /// Appends a message to every occupied slot's queue, connected or
    /// draining, except the player matching `exclude`.
    pub fn broadcast(&mut self, message: &str, exclude: Option<u32>) {
        for player in self.slots.iter_mut().flatten() {
            if Some(player.id) == exclude {
                continue;
            }
            player.queue.push(message.to_string());
        }
    }

    /// Marks every occupied slot as draining: no further reads, and the
    /// slot is reclaimed once its queue flushes. Used for the forced
    /// end-of-round teardown.
    pub fn drain_all(&mut self) {
        for player in self.slots.iter_mut().flatten() {
            player.draining = true;
        }
    }

    /// Drops every player, closing all handles and discarding all
    /// queues. Shutdown cleanup only; no drain is attempted.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn stream_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted, connected) =
            tokio::join!(listener.accept(), TcpStream::connect(addr));
        (accepted.unwrap().0, connected.unwrap())
    }

    async fn seat(manager: &mut PlayerManager) -> Option<u32> {
        let (server_side, _client_side) = stream_pair().await;
        let addr = server_side.peer_addr().unwrap();
        manager.add_player(server_side, addr)
    }

    #[test]
    fn test_manager_creation() {
        let manager = PlayerManager::new(3);
        assert_eq!(manager.capacity(), 3);
        assert_eq!(manager.active_count(), 0);
        assert!(manager.is_empty());
        assert!(!manager.is_full());
    }

    #[tokio::test]
    async fn test_ids_follow_slot_order() {
        let mut manager = PlayerManager::new(3);
        assert_eq!(seat(&mut manager).await, Some(1));
        assert_eq!(seat(&mut manager).await, Some(2));
        assert_eq!(seat(&mut manager).await, Some(3));
        assert!(manager.is_full());
    }

    #[tokio::test]
    async fn test_add_player_at_capacity_fails() {
        let mut manager = PlayerManager::new(1);
        assert_eq!(seat(&mut manager).await, Some(1));
        assert_eq!(seat(&mut manager).await, None);
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn test_reclaim_frees_slot_for_reuse() {
        let mut manager = PlayerManager::new(2);
        seat(&mut manager).await;
        seat(&mut manager).await;

        assert_eq!(manager.reclaim(0), Some(1));
        assert_eq!(manager.active_count(), 1);
        assert!(manager.get(0).is_none());

        // The freed slot is handed out again with the slot-derived id.
        assert_eq!(seat(&mut manager).await, Some(1));
        assert!(manager.is_full());
    }

    #[tokio::test]
    async fn test_reclaim_empty_slot_is_noop() {
        let mut manager = PlayerManager::new(2);
        seat(&mut manager).await;
        assert_eq!(manager.reclaim(1), None);
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_respects_exclusion() {
        let mut manager = PlayerManager::new(3);
        seat(&mut manager).await;
        seat(&mut manager).await;
        seat(&mut manager).await;

        manager.broadcast("hello\n", Some(2));

        assert_eq!(manager.get(0).unwrap().queue.len(), 1);
        assert_eq!(manager.get(1).unwrap().queue.len(), 0);
        assert_eq!(manager.get(2).unwrap().queue.len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_order_matches_enqueue_order() {
        let mut manager = PlayerManager::new(1);
        seat(&mut manager).await;

        manager.broadcast("first\n", None);
        manager.broadcast("second\n", None);
        manager.enqueue(1, "third\n".to_string());

        let queue = &mut manager.get_mut(0).unwrap().queue;
        assert_eq!(queue.head().unwrap(), b"first\n");
        queue.advance(6);
        assert_eq!(queue.head().unwrap(), b"second\n");
        queue.advance(7);
        assert_eq!(queue.head().unwrap(), b"third\n");
    }

    #[tokio::test]
    async fn test_broadcast_includes_draining_players() {
        let mut manager = PlayerManager::new(2);
        seat(&mut manager).await;
        seat(&mut manager).await;
        manager.get_mut(0).unwrap().draining = true;

        manager.broadcast("notice\n", None);
        assert_eq!(manager.get(0).unwrap().queue.len(), 1);
        assert_eq!(manager.get(1).unwrap().queue.len(), 1);
    }

    #[tokio::test]
    async fn test_drain_all_marks_every_player() {
        let mut manager = PlayerManager::new(2);
        seat(&mut manager).await;
        seat(&mut manager).await;

        manager.drain_all();
        assert!(manager.get(0).unwrap().draining);
        assert!(manager.get(1).unwrap().draining);
        // Draining players still count as active until reclaimed.
        assert_eq!(manager.active_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let mut manager = PlayerManager::new(2);
        seat(&mut manager).await;
        seat(&mut manager).await;
        manager.broadcast("pending\n", None);

        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.get(0).is_none());
        assert!(manager.get(1).is_none());
    }
}

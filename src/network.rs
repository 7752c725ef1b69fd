//! Readiness-driven event loop multiplexing the listener and all
//! player sockets.
//!
//! The server runs as a single task with exactly one suspension point
//! per iteration: a `poll_fn` wait that watches the shutdown future,
//! the listener (only while a free slot exists), every connected
//! player for readability, and every player with queued output for
//! writability. All state is owned by the loop, so no handler ever
//! runs concurrently with another and no locking is needed.

use log::{debug, error, info, warn};
use std::future::{poll_fn, Future};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::net::{TcpListener, TcpStream};

use crate::game::{GameRound, Verdict};
use crate::player_manager::PlayerManager;
use crate::protocol::{self, MAX_BUFFER};

/// Everything found ready by one blocking wait, in servicing order:
/// the listener first, then slots in ascending order, reads before
/// writes.
#[derive(Default)]
struct Readiness {
    accept: Option<io::Result<(TcpStream, SocketAddr)>>,
    readable: Vec<usize>,
    writable: Vec<usize>,
}

enum Wake {
    Shutdown,
    Io(Readiness),
}

/// Follow-up decided while a player slot was mutably borrowed.
enum WriteOutcome {
    Continue,
    /// Queue drained while draining: finish reclamation.
    Drained,
    /// The pipe is gone; drop the slot without flushing.
    Broken,
}

/// The guessing-game server: one listener, a fixed slot table, and the
/// current round, all driven by [`Server::run`].
pub struct Server {
    listener: TcpListener,
    players: PlayerManager,
    round: GameRound,
}

impl Server {
    /// Binds the listener and draws the first target.
    pub async fn new(addr: &str, seed: u64, max_players: usize) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            players: PlayerManager::new(max_players),
            round: GameRound::new(seed),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the event loop until `shutdown` completes.
    ///
    /// Shutdown closes the listener and every connection and discards
    /// all queues; no drain is attempted.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> io::Result<()> {
        tokio::pin!(shutdown);

        loop {
            let wake = poll_fn(|cx| self.poll_wake(cx, shutdown.as_mut())).await;

            match wake {
                Wake::Shutdown => {
                    info!(
                        "Shutting down, closing {} connection(s)",
                        self.players.active_count()
                    );
                    self.players.clear();
                    return Ok(());
                }
                Wake::Io(readiness) => {
                    if let Some(result) = readiness.accept {
                        self.service_accept(result);
                    }
                    for slot in readiness.readable {
                        self.service_read(slot);
                    }
                    for slot in readiness.writable {
                        self.service_write(slot);
                    }
                    self.check_round_reset();
                }
            }
        }
    }

    /// The single blocking wait: registers interest for everything the
    /// current state calls for and collects all sources that are
    /// already ready.
    fn poll_wake<F: Future<Output = ()>>(
        &mut self,
        cx: &mut Context<'_>,
        shutdown: Pin<&mut F>,
    ) -> Poll<Wake> {
        if shutdown.poll(cx).is_ready() {
            return Poll::Ready(Wake::Shutdown);
        }

        let mut readiness = Readiness::default();
        let mut woke = false;

        // Admission control: the listener leaves the read set while
        // every slot is taken, so a full server simply stops accepting.
        if !self.players.is_full() {
            if let Poll::Ready(result) = self.listener.poll_accept(cx) {
                readiness.accept = Some(result);
                woke = true;
            }
        }

        for slot in 0..self.players.capacity() {
            let Some(player) = self.players.get(slot) else {
                continue;
            };
            if !player.draining && player.stream.poll_read_ready(cx).is_ready() {
                readiness.readable.push(slot);
                woke = true;
            }
            if !player.queue.is_empty() && player.stream.poll_write_ready(cx).is_ready() {
                readiness.writable.push(slot);
                woke = true;
            }
        }

        if woke {
            Poll::Ready(Wake::Io(readiness))
        } else {
            Poll::Pending
        }
    }

    /// Seats an accepted connection and queues the welcome and join
    /// notices.
    fn service_accept(&mut self, result: io::Result<(TcpStream, SocketAddr)>) {
        let (stream, addr) = match result {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                return;
            }
        };

        match self.players.add_player(stream, addr) {
            Some(id) => {
                self.players.enqueue(id, protocol::welcome(id));
                self.players.broadcast(&protocol::player_joined(id), Some(id));
            }
            None => {
                // The listener is only watched while a slot is free, so
                // this is an invariant violation. add_player dropped the
                // handle, which closed it.
                error!("Accepted {} while at capacity, closing it", addr);
            }
        }
    }

    /// Reads one chunk from a connected player: either a disconnect or
    /// a guess.
    fn service_read(&mut self, slot: usize) {
        let (id, outcome) = {
            let Some(player) = self.players.get_mut(slot) else {
                return;
            };
            // A winning guess earlier in this iteration may have put
            // this player into draining; their input no longer matters.
            if player.draining {
                return;
            }
            let mut buf = [0u8; MAX_BUFFER];
            let outcome = player
                .stream
                .try_read(&mut buf)
                .map(|n| buf[..n].to_vec());
            (player.id, outcome)
        };

        match outcome {
            Ok(data) if data.is_empty() => {
                info!("Player {} disconnected", id);
                self.disconnect(slot);
            }
            Ok(data) => {
                debug!("Read {} byte(s) from player {}", data.len(), id);
                self.handle_guess(id, &data);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                warn!("Read error from player {}: {}", id, e);
                self.disconnect(slot);
            }
        }
    }

    /// Broadcasts the guess and its verdict; a correct guess ends the
    /// round for everyone.
    fn handle_guess(&mut self, id: u32, data: &[u8]) {
        let guess = protocol::parse_guess(data);
        debug!("Player {} guessed {}", id, guess);
        self.players
            .broadcast(&protocol::player_guessed(id, guess), None);

        match self.round.evaluate(guess) {
            Verdict::TooHigh => self.players.broadcast(&protocol::too_high(guess), None),
            Verdict::TooLow => self.players.broadcast(&protocol::too_low(guess), None),
            Verdict::Correct => {
                info!("Player {} won the round", id);
                self.players.broadcast(&protocol::player_wins(id), None);
                self.players
                    .broadcast(&protocol::reveal(self.round.target()), None);
                // The round ends for everyone: flush each queue, then
                // close each connection as it drains.
                self.players.drain_all();
            }
        }
    }

    /// Handles a peer close or read error: notifies the others, then
    /// reclaims the slot now if nothing is queued, or lets it drain.
    fn disconnect(&mut self, slot: usize) {
        let Some(player) = self.players.get_mut(slot) else {
            return;
        };
        let id = player.id;
        let drained = player.queue.is_empty();
        player.draining = true;

        self.players
            .broadcast(&protocol::player_disconnected(id), Some(id));
        if drained {
            self.players.reclaim(slot);
        }
    }

    /// Flushes the head of one player's queue, resuming a partial
    /// write where it left off.
    fn service_write(&mut self, slot: usize) {
        let outcome = {
            let Some(player) = self.players.get_mut(slot) else {
                return;
            };
            let Some(head) = player.queue.head() else {
                return;
            };
            match player.stream.try_write(head) {
                Ok(n) => {
                    player.queue.advance(n);
                    if player.queue.is_empty() && player.draining {
                        WriteOutcome::Drained
                    } else {
                        WriteOutcome::Continue
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => WriteOutcome::Continue,
                Err(e) => {
                    warn!("Write error to player {}: {}", player.id, e);
                    WriteOutcome::Broken
                }
            }
        };

        match outcome {
            WriteOutcome::Continue => {}
            WriteOutcome::Drained => {
                self.players.reclaim(slot);
            }
            WriteOutcome::Broken => {
                let was_draining = self
                    .players
                    .get(slot)
                    .map(|p| p.draining)
                    .unwrap_or(true);
                if let Some(id) = self.players.reclaim(slot) {
                    if !was_draining {
                        self.players
                            .broadcast(&protocol::player_disconnected(id), Some(id));
                    }
                }
            }
        }
    }

    /// Runs once per iteration: begins a new round once the finished
    /// round's last participant has fully disconnected.
    fn check_round_reset(&mut self) {
        if self.round.try_reset(self.players.active_count()) {
            info!("All players left, starting a new round");
        }
    }
}

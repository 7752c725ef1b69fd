//! # Guessing Game Server
//!
//! A single-process TCP server that lets multiple clients concurrently
//! play a shared number-guessing game over persistent, newline-terminated
//! text connections.
//!
//! ## Architecture
//!
//! The server is a readiness-driven event loop running on a
//! current-thread runtime. Each iteration performs one blocking wait
//! that watches the listening socket (only while a player slot is
//! free), every connected player for readability, and every player with
//! queued output for writability. Ready sources are then serviced in a
//! fixed order: the listener first, then player slots in ascending
//! order, reads before writes, followed by the round-reset check.
//!
//! Because every piece of state is owned and mutated by that one loop,
//! there is no locking anywhere: "no two handlers run concurrently" is
//! guaranteed structurally.
//!
//! ## Backpressure
//!
//! Nothing is ever written to a socket directly. Every outbound message
//! is appended to the recipient's FIFO queue and flushed one message
//! per write-readiness event, resuming partial writes from the unsent
//! offset. A slot is registered for write readiness exactly while its
//! queue is non-empty.
//!
//! ## Rounds
//!
//! A seeded generator draws a target in [1, 100]. Guesses are broadcast
//! to every player together with a too-high/too-low verdict. A correct
//! guess announces the winner, reveals the target, and schedules every
//! connection for teardown once its queue drains. Only after the last
//! participant has fully disconnected is the next target drawn, so a
//! round boundary is also a full churn of the player population.
//!
//! ## Module Organization
//!
//! - [`protocol`]: the exact wire message catalog and `atoi`-style
//!   guess parsing.
//! - [`player`]: one player's connection state and outgoing queue.
//! - [`player_manager`]: the fixed-capacity slot table, allocation and
//!   reclamation, and broadcast queuing.
//! - [`game`]: round state and guess evaluation.
//! - [`network`]: the event loop tying it all together.

pub mod game;
pub mod network;
pub mod player;
pub mod player_manager;
pub mod protocol;

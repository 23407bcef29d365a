//! Session driver for the ctflink grid protocol.
//!
//! A [`Session`] wraps one connection: it requests a room, sends actions, and
//! applies every frame the server sends to its [`codec::BoardState`]. A
//! [`Listener`] runs the same read loop on a background thread and publishes
//! each update.
//!
//! ```no_run
//! use client::{ClientConfig, Session};
//!
//! let config = ClientConfig::default();
//! let mut session = Session::connect(&config)?;
//! session.start_game(config.room_type)?;
//! let view = session.request_frame(1)?;
//! println!("score {:?}", view.score);
//! # Ok::<(), client::ClientError>(())
//! ```

mod config;
mod error;
mod listener;
mod session;

pub use config::{ClientConfig, Credentials, DEFAULT_PORT};
pub use error::{ClientError, ClientResult};
pub use listener::{Listener, ListenerEvent, SharedBoard, EVENT_CAPACITY};
pub use session::Session;

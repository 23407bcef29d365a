//! The session driver: bootstrap, action submission, and frame application.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use codec::{BoardState, BoardView, CodecResult, ProtocolError};
use tracing::{debug, info};
use wire::{encode_action, encode_login, encode_room_request, read_frame, read_start_ack};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// One connection to the game server and the board it maintains.
///
/// Every read takes `&mut self`, so a session has exactly one reader. A
/// failed read or decode leaves the board at its last good value.
#[derive(Debug)]
pub struct Session<S> {
    stream: S,
    board: BoardState,
    frames_applied: u64,
}

impl<S: Read + Write> Session<S> {
    /// Wraps a connected stream. No I/O happens here.
    pub fn new(stream: S) -> Self {
        Self::with_board(stream, BoardState::new())
    }

    /// Wraps a connected stream with a preconfigured board.
    pub const fn with_board(stream: S, board: BoardState) -> Self {
        Self {
            stream,
            board,
            frames_applied: 0,
        }
    }

    /// Sends the login packet. The server does not reply to it.
    pub fn login(&mut self, username: &str, password: &str) -> ClientResult<()> {
        let packet = encode_login(username, password)?;
        self.send(&packet)?;
        debug!(username, "login sent");
        Ok(())
    }

    /// Requests a room and waits for the start-ack.
    ///
    /// On success the board is reset for the new game.
    pub fn start_game(&mut self, room_type: u8) -> CodecResult<()> {
        self.send(&encode_room_request(room_type))?;
        let ack = read_start_ack(&mut self.stream)?;
        if !ack.is_started() {
            return Err(ProtocolError::StartRejected { code: ack.success });
        }
        self.board.reset();
        self.frames_applied = 0;
        info!(room_type, "game started");
        Ok(())
    }

    /// Sends one action packet.
    pub fn send_action(&mut self, action: u8) -> CodecResult<()> {
        self.send(&encode_action(action))
    }

    /// Reads exactly one frame, applies it, and returns the updated view.
    pub fn next_frame(&mut self) -> CodecResult<BoardView> {
        let frame = read_frame(&mut self.stream)?;
        self.board.apply_frame(&frame)?;
        self.frames_applied += 1;
        let score = frame.score();
        debug!(
            code = frame.code().raw(),
            own = score.own,
            opponent = score.opponent,
            "frame applied"
        );
        Ok(self.board.current_view())
    }

    /// Sends `action` and returns the board after the server's next frame.
    ///
    /// The action is sent once. Idle read timeouts keep waiting for the reply;
    /// any other error is returned, and the caller may resume with
    /// [`next_frame`](Self::next_frame) without sending the action again.
    pub fn request_frame(&mut self, action: u8) -> CodecResult<BoardView> {
        self.send_action(action)?;
        loop {
            match self.next_frame() {
                Err(err) if err.is_idle_timeout() => {}
                result => return result,
            }
        }
    }

    fn send(&mut self, packet: &[u8]) -> CodecResult<()> {
        self.stream
            .write_all(packet)
            .and_then(|()| self.stream.flush())
            .map_err(|err| ProtocolError::Io(err.kind()))
    }
}

impl<S> Session<S> {
    /// Returns an owned copy of the current board.
    #[must_use]
    pub fn view(&self) -> BoardView {
        self.board.current_view()
    }

    /// Returns the board state.
    #[must_use]
    pub const fn board(&self) -> &BoardState {
        &self.board
    }

    /// Frames applied since the last game start.
    #[must_use]
    pub const fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    /// Returns a reference to the underlying stream.
    #[must_use]
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consumes the session and returns the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl Session<TcpStream> {
    /// Connects to `config.addr`, applies socket options, and logs in if
    /// credentials are configured.
    pub fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let stream = open_stream(config)?;
        let mut session = Self::with_board(stream, config.board());
        if let Some(login) = &config.login {
            session.login(&login.username, &login.password)?;
        }
        Ok(session)
    }
}

fn open_stream(config: &ClientConfig) -> ClientResult<TcpStream> {
    let addr = config.addr.as_str();
    let connect_err = |source| ClientError::Connect {
        addr: addr.to_string(),
        source,
    };

    let candidates = addr
        .to_socket_addrs()
        .map_err(|source| ClientError::Resolve {
            addr: addr.to_string(),
            source,
        })?;

    let mut last_err = None;
    let mut stream = None;
    for candidate in candidates {
        let attempt = match config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
            None => TcpStream::connect(candidate),
        };
        match attempt {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(err) => {
                debug!(%candidate, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    let stream = match (stream, last_err) {
        (Some(stream), _) => stream,
        (None, Some(err)) => return Err(connect_err(err)),
        (None, None) => {
            return Err(ClientError::NoAddress {
                addr: addr.to_string(),
            })
        }
    };

    stream.set_nodelay(true).map_err(connect_err)?;
    stream
        .set_read_timeout(config.read_timeout)
        .map_err(connect_err)?;
    stream
        .set_write_timeout(config.write_timeout)
        .map_err(connect_err)?;
    debug!(addr, "connected");
    Ok(stream)
}

//! Blocking frame reader over a byte stream.

use std::io::{self, Read};

use crate::error::{DecodeError, WireResult};
use crate::header::{
    FrameCode, Score, DELTA_HEADER_SIZE, HEADER_SIZE, PATCH_SIZE, SNAPSHOT_HEADER_SIZE, VERSION,
};
use crate::packet::{DeltaFrame, Frame, SnapshotFrame, StartAck};

/// Reads exactly one board frame from `reader`.
///
/// Consumes only the bytes of that frame. The version byte is checked before
/// anything past the two-byte header is read.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> WireResult<Frame> {
    let mut stream = FrameRead::new(reader);
    let code = stream.read_header()?;
    match FrameCode::from_raw(code) {
        Some(FrameCode::Snapshot) => {
            let mut sub = [0u8; SNAPSHOT_HEADER_SIZE];
            stream.fill(&mut sub)?;
            let payload = stream.take(usize::from(sub[2]))?;
            Ok(Frame::Snapshot(SnapshotFrame {
                score: Score::new(sub[0], sub[1]),
                payload,
            }))
        }
        Some(FrameCode::Delta) => {
            let mut sub = [0u8; DELTA_HEADER_SIZE];
            stream.fill(&mut sub)?;
            let sequence = i32::from_be_bytes([sub[0], sub[1], sub[2], sub[3]]);
            let count = u16::from_be_bytes([sub[6], sub[7]]);
            let patches = stream.take(usize::from(count) * PATCH_SIZE)?;
            Ok(Frame::Delta(DeltaFrame {
                sequence,
                score: Score::new(sub[4], sub[5]),
                patches,
            }))
        }
        _ => Err(DecodeError::UnknownFrameType { tag: code }),
    }
}

/// Reads the three-byte start-ack sent in reply to a room request.
pub fn read_start_ack<R: Read + ?Sized>(reader: &mut R) -> WireResult<StartAck> {
    let mut stream = FrameRead::new(reader);
    let code = stream.read_header()?;
    if code != FrameCode::StartAck.raw() {
        return Err(DecodeError::UnexpectedFrame {
            expected: FrameCode::StartAck.raw(),
            found: code,
        });
    }
    let mut success = [0u8; 1];
    stream.fill(&mut success)?;
    Ok(StartAck {
        success: success[0],
    })
}

/// Iterator over the frames of a stream, such as a capture file.
///
/// Yields frames until the stream closes on a frame boundary. The first error
/// is yielded once and ends iteration.
#[derive(Debug)]
pub struct Frames<R> {
    inner: R,
    done: bool,
}

impl<R: Read> Frames<R> {
    /// Wraps a reader.
    pub const fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for Frames<R> {
    type Item = WireResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_frame(&mut self.inner) {
            Ok(frame) => Some(Ok(frame)),
            Err(DecodeError::Closed) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Byte counter for the frame currently being read.
struct FrameRead<'a, R: ?Sized> {
    inner: &'a mut R,
    read: usize,
}

impl<'a, R: Read + ?Sized> FrameRead<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, read: 0 }
    }

    /// Reads version + code and returns the code.
    fn read_header(&mut self) -> WireResult<u8> {
        let mut header = [0u8; HEADER_SIZE];
        self.fill(&mut header)?;
        if header[0] != VERSION {
            return Err(DecodeError::WrongVersion { found: header[0] });
        }
        Ok(header[1])
    }

    fn take(&mut self, len: usize) -> WireResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8]) -> WireResult<()> {
        let needed = self.read + buf.len();
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if self.read == 0 => return Err(DecodeError::Closed),
                Ok(0) => {
                    return Err(DecodeError::Truncated {
                        needed,
                        read: self.read,
                    })
                }
                Ok(n) => {
                    filled += n;
                    self.read += n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(DecodeError::from_io(&err, self.read)),
            }
        }
        Ok(())
    }
}

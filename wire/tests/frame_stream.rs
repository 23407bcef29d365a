use std::io::Cursor;

use proptest::prelude::*;
use wire::{
    encode_delta_frame, encode_snapshot_frame, read_frame, DecodeError, DeltaFrame, Frame, Frames,
    Score, SnapshotFrame,
};

fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop_oneof![
        (any::<(u8, u8)>(), prop::collection::vec(any::<u8>(), 0..=255)).prop_map(
            |(score, payload)| Frame::Snapshot(SnapshotFrame {
                score: score.into(),
                payload,
            })
        ),
        (
            any::<i32>(),
            any::<(u8, u8)>(),
            prop::collection::vec(any::<[u8; 3]>(), 0..64)
        )
            .prop_map(|(sequence, score, patches)| Frame::Delta(DeltaFrame {
                sequence,
                score: score.into(),
                patches: patches.concat(),
            })),
    ]
}

proptest! {
    #[test]
    fn arbitrary_bytes_dont_crash_reader(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut cursor = Cursor::new(bytes);
        let _ = read_frame(&mut cursor);
    }

    #[test]
    fn interleaved_stream_reads_back_in_order(frames in prop::collection::vec(frame_strategy(), 0..16)) {
        let mut stream = Vec::new();
        for frame in &frames {
            stream.extend(wire::encode_frame(frame).unwrap());
        }
        let decoded: Vec<Frame> = Frames::new(Cursor::new(stream))
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(decoded, frames);
    }

    #[test]
    fn any_cut_is_truncated_or_closed(frame in frame_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = wire::encode_frame(&frame).unwrap();
        let cut = cut.index(bytes.len());
        let err = read_frame(&mut Cursor::new(&bytes[..cut])).unwrap_err();
        if cut == 0 {
            prop_assert_eq!(err, DecodeError::Closed);
        } else {
            prop_assert!(
                matches!(err, DecodeError::Truncated { read, .. } if read == cut),
                "unexpected error {err:?}"
            );
        }
    }
}

#[test]
fn wrong_version_on_delta_stops_at_header() {
    let mut bytes = encode_delta_frame(1, Score::new(0, 0), &[1, 1, 1]).unwrap();
    bytes[0] = 2;
    let mut cursor = Cursor::new(bytes);
    let err = read_frame(&mut cursor).unwrap_err();
    assert_eq!(err, DecodeError::WrongVersion { found: 2 });
    assert_eq!(cursor.position(), 2);
}

#[test]
fn snapshot_then_delta_on_one_stream() {
    let mut stream = encode_snapshot_frame(Score::new(0, 0), b"0:1000").unwrap();
    stream.extend(encode_delta_frame(1, Score::new(1, 0), &[5, 2, 4]).unwrap());

    let mut cursor = Cursor::new(stream);
    let first = read_frame(&mut cursor).unwrap();
    let second = read_frame(&mut cursor).unwrap();
    assert!(matches!(first, Frame::Snapshot(_)));
    match second {
        Frame::Delta(delta) => {
            assert_eq!(delta.sequence, 1);
            assert_eq!(delta.score, Score::new(1, 0));
            assert_eq!(delta.patches, vec![5, 2, 4]);
        }
        Frame::Snapshot(_) => panic!("expected delta"),
    }
    assert_eq!(read_frame(&mut cursor).unwrap_err(), DecodeError::Closed);
}

use std::collections::HashMap;
use std::io::Cursor;

use codec::{
    decode_rle, delta_frame, encode_rle, BoardState, Frame, Grid, Patch, ProtocolError, Score,
    CELLS, COLS, ROWS,
};
use proptest::prelude::*;
use wire::{encode_frame, read_frame, DeltaFrame, SnapshotFrame};

fn arb_grid() -> impl Strategy<Value = Grid> {
    // Few distinct values so runs are long, as on a real board.
    prop::collection::vec(0u8..8, CELLS)
        .prop_map(|cells| Grid::from_cells(cells).expect("full board"))
}

fn arb_runs_grid() -> impl Strategy<Value = Grid> {
    prop::collection::vec((0u8..8, 1usize..200), 1..20).prop_map(|runs| {
        let mut cells: Vec<u8> = runs
            .into_iter()
            .flat_map(|(value, count)| std::iter::repeat(value).take(count))
            .take(CELLS)
            .collect();
        cells.resize(CELLS, 0);
        Grid::from_cells(cells).expect("full board")
    })
}

fn arb_patch() -> impl Strategy<Value = Patch> {
    (0u8..COLS as u8, 0u8..ROWS as u8, any::<u8>()).prop_map(|(x, y, v)| Patch::new(x, y, v))
}

proptest! {
    #[test]
    fn rle_roundtrip(grid in arb_grid()) {
        let text = encode_rle(&grid);
        prop_assert_eq!(decode_rle(text.as_bytes()).unwrap(), grid);
    }

    #[test]
    fn rle_roundtrip_long_runs(grid in arb_runs_grid()) {
        let text = encode_rle(&grid);
        prop_assert_eq!(decode_rle(text.as_bytes()).unwrap(), grid);
    }

    #[test]
    fn rle_wrong_total_is_size_mismatch(total in 0usize..3000, split in 0usize..3000) {
        prop_assume!(total != CELLS);
        let first = split.min(total);
        let text = format!("1:{first}|2:{}", total - first);
        let err = decode_rle(text.as_bytes()).unwrap_err();
        prop_assert_eq!(err, ProtocolError::SizeMismatch { expected: CELLS, actual: total });
    }

    #[test]
    fn rle_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_rle(&bytes);
    }

    #[test]
    fn delta_changes_only_named_cells(
        start in arb_grid(),
        patches in prop::collection::vec(arb_patch(), 0..64),
    ) {
        let mut board = BoardState::new();
        board.apply_snapshot(start.clone(), Score::default());
        board.apply_delta(&patches, Score::new(1, 2), 1).unwrap();

        let named: std::collections::HashSet<(usize, usize)> = patches
            .iter()
            .map(|p| (usize::from(p.y), usize::from(p.x)))
            .collect();
        for (row, col) in start.diff(board.grid()) {
            prop_assert!(named.contains(&(row, col)));
        }
    }

    #[test]
    fn delta_last_write_wins(patches in prop::collection::vec(arb_patch(), 1..64)) {
        let mut board = BoardState::new();
        board.apply_snapshot(Grid::zeroed(), Score::default());
        board.apply_delta(&patches, Score::default(), 1).unwrap();

        let mut expected = HashMap::new();
        for patch in &patches {
            expected.insert((usize::from(patch.y), usize::from(patch.x)), patch.value);
        }
        for ((row, col), value) in expected {
            prop_assert_eq!(board.grid().get(row, col), Some(value));
        }
    }

    #[test]
    fn score_matches_last_frame(
        scores in prop::collection::vec((any::<u8>(), any::<u8>(), any::<bool>()), 1..16),
    ) {
        let mut board = BoardState::new();
        for (seq, (own, opponent, snapshot)) in scores.into_iter().enumerate() {
            let score = Score::new(own, opponent);
            let frame = if snapshot || seq == 0 {
                Frame::Snapshot(SnapshotFrame { score, payload: b"0:1000".to_vec() })
            } else {
                Frame::Delta(delta_frame(seq as i32, score, &[Patch::new(0, 0, own)]))
            };
            board.apply_frame(&frame).unwrap();
            prop_assert_eq!(board.score(), score);
        }
    }

    #[test]
    fn out_of_range_patch_anywhere_rejects_whole_frame(
        start in arb_grid(),
        mut patches in prop::collection::vec(arb_patch(), 1..32),
        bad_at in any::<prop::sample::Index>(),
        bad_x in 50u8..=255,
    ) {
        let idx = bad_at.index(patches.len());
        patches[idx] = Patch::new(bad_x, 0, 1);

        let mut board = BoardState::new();
        board.apply_snapshot(start, Score::new(3, 4));
        let before = board.current_view();
        let err = board.apply_delta(&patches, Score::new(9, 9), 1).unwrap_err();
        prop_assert!(
            matches!(err, ProtocolError::CoordinateOutOfRange { .. }),
            "unexpected error: {:?}",
            err
        );
        prop_assert_eq!(board.current_view(), before);
    }
}

#[test]
fn wire_bytes_to_board() {
    let snapshot = Frame::Snapshot(SnapshotFrame {
        score: Score::new(0, 0),
        payload: b"0:998|3:2".to_vec(),
    });
    let delta = Frame::Delta(DeltaFrame {
        sequence: 1,
        score: Score::new(1, 0),
        patches: vec![5, 2, 4],
    });
    let mut bytes = encode_frame(&snapshot).unwrap();
    bytes.extend(encode_frame(&delta).unwrap());

    let mut cursor = Cursor::new(bytes);
    let mut board = BoardState::new();
    board.apply_frame(&read_frame(&mut cursor).unwrap()).unwrap();
    assert_eq!(board.grid()[19][48], 3);
    assert_eq!(board.grid()[19][49], 3);

    board.apply_frame(&read_frame(&mut cursor).unwrap()).unwrap();
    assert_eq!(board.grid()[2][5], 4);
    assert_eq!(board.score(), Score::new(1, 0));
    assert_eq!(board.grid().diff(&Grid::zeroed()).len(), 3);
}

#[test]
fn bad_snapshot_then_good_delta_keeps_prior_board() {
    let mut board = BoardState::new();
    board
        .apply_frame(&Frame::Snapshot(SnapshotFrame {
            score: Score::new(1, 1),
            payload: b"2:1000".to_vec(),
        }))
        .unwrap();

    let err = board
        .apply_frame(&Frame::Snapshot(SnapshotFrame {
            score: Score::new(5, 5),
            payload: b"3:5:2".to_vec(),
        }))
        .unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedRle { .. }));
    assert!(!err.is_fatal());
    assert_eq!(board.grid(), &Grid::filled(2));

    board
        .apply_frame(&Frame::Delta(delta_frame(1, Score::new(2, 1), &[Patch::new(0, 0, 0)])))
        .unwrap();
    assert_eq!(board.grid()[0][0], 0);
    assert_eq!(board.grid()[0][1], 2);
}

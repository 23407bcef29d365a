#![no_main]

use std::io::Cursor;

use codec::BoardState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);
    let mut board = BoardState::new();

    // Bounded: every successful read consumes at least a header.
    while let Ok(frame) = wire::read_frame(&mut cursor) {
        let before = board.current_view();
        if board.apply_frame(&frame).is_err() {
            assert_eq!(board.current_view(), before);
        }
    }
});

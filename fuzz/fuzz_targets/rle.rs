#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(grid) = codec::decode_rle(data) {
        let text = codec::encode_rle(&grid);
        let again = codec::decode_rle(text.as_bytes()).expect("canonical rle decodes");
        assert_eq!(again, grid);
    }
});

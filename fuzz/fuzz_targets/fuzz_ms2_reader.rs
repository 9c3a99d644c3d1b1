#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use lipidflow::spectrum::Ms2Reader;

fuzz_target!(|data: &[u8]| {
    // Any input must either parse or fail with an error, never panic
    let mut reader = Ms2Reader::new(Cursor::new(data));
    for _ in 0..1000 {
        match reader.next_scan() {
            Ok(Some(scan)) => {
                assert!(!scan.peaks.is_empty());
                assert!(scan.retention_time.is_finite());
            }
            Ok(None) | Err(_) => break,
        }
    }
});

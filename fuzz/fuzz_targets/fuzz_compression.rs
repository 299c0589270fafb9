#![no_main]

use libfuzzer_sys::fuzz_target;
use rock_wire::utils::compression::{compress_gzip, decompress_gzip};

fuzz_target!(|data: &[u8]| {
    if let Ok(compressed) = compress_gzip(data) {
        let restored = decompress_gzip(&compressed, data.len() + 1);
        assert_eq!(restored.ok().as_deref(), Some(data));
    }

    // Raw bytes must fail cleanly or stay under the limit
    let _ = decompress_gzip(data, 1024 * 1024);
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use rock_wire::config::ProtocolConfig;
use rock_wire::MessageCodec;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a frame stream
    let codec = MessageCodec::new(ProtocolConfig {
        max_protocol_length: 1024 * 1024,
        ..ProtocolConfig::default()
    });
    let _ = codec.decode_from_slice(data);

    // Same bytes as a body behind a valid header, both compression flags
    for gzip in [false, true] {
        let mut frame = rock_wire::Header::new(data.len() as u32, gzip)
            .to_bytes()
            .to_vec();
        frame.extend_from_slice(data);
        let _ = codec.decode_from_slice(&frame);
    }
});

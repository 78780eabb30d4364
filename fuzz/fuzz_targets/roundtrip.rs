#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwpack::{Config, Decoder, Encoder};

fuzz_target!(|data: &[u8]| {
    // Small tables freeze early, large ones keep growing.
    for &size in &[9, 12, 20] {
        let config = Config::new(size).unwrap();
        let compressed = Encoder::with_config(config).compress(data).unwrap();
        let result = Decoder::with_config(config).decompress(&compressed);
        assert!(result.as_deref() == Ok(data), "{}, {:?}", size, result);
    }
});

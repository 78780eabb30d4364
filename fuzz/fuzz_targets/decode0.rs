#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let mut stream = b"LZW1".to_vec();
    stream.extend_from_slice(raw_data);
    let _ = lzwpack::decompress(&stream);
});

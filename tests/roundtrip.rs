use lzwpack::{bits, BitOrder, CodeWidth, Config, Decoder, Encoder};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs;

#[test]
fn roundtrip_all() {
    let file = env!("CARGO_MANIFEST_DIR").to_owned() + "/src/dictionary.rs";
    let data = fs::read(file).unwrap();

    for &code_size in &[9u8, 10, 12, 16, 20, 24] {
        assert_roundtrips(&data, code_size);
        let masked: Vec<_> = data.iter().map(|b| b & 0x0f).collect();
        assert_roundtrips(&masked, code_size);
    }
}

#[test]
fn roundtrip_boundaries() {
    for data in &[&b""[..], &[0u8][..], &[0xffu8][..], &b"ab"[..], &b"aaa"[..], &b"abababa"[..]] {
        assert_roundtrips(data, 20);
        assert_roundtrips(data, 9);
    }
}

#[test]
fn roundtrip_random() {
    let mut rng = StdRng::seed_from_u64(0x4c5a_5731);
    for _ in 0..32 {
        let len = rng.gen_range(0..20_000);
        let alphabet = rng.gen_range(1..=256u32);
        let data: Vec<u8> = (0..len).map(|_| rng.gen_range(0..alphabet) as u8).collect();
        assert_roundtrips(&data, rng.gen_range(9..=16));
    }
}

#[test]
fn roundtrip_past_a_full_table() {
    // Random bytes learn a new entry for almost every code and fill a 9-bit table quickly.
    let mut rng = StdRng::seed_from_u64(7);
    let mut data = vec![0u8; 100_000];
    rng.fill(&mut data[..]);
    assert_roundtrips(&data, 9);
    assert_roundtrips(&data, 12);
}

#[test]
fn roundtrip_long_runs() {
    let mut data = vec![0x41; 10_000];
    data.extend(std::iter::repeat(0x42).take(3_000));
    data.extend((0..=255u8).cycle().take(70_000));
    assert_roundtrips(&data, 20);
    assert_roundtrips(&data, 10);
}

#[test]
fn stages_compose() {
    let data = b"she sells sea shells by the sea shore, the shells she sells are sea shells";
    let config = Config::default();
    let width = CodeWidth::variable(&config);

    let codes = Encoder::new().encode(data);
    assert!(codes.len() < data.len());
    let packed = bits::pack(&codes, width, BitOrder::Msb).unwrap();
    let unpacked = bits::unpack(&packed, width, BitOrder::Msb, codes.len()).unwrap();
    assert_eq!(unpacked, codes);
    assert_eq!(Decoder::new().decode(&unpacked).unwrap(), &data[..]);
}

#[test]
fn stream_adapters() {
    let data = b"TOBEORNOTTOBEORTOBEORNOT".repeat(50);
    let encoder = Encoder::new();
    let mut compressed = vec![];
    let result = encoder.into_stream(&mut compressed).encode_all(&data[..]);
    assert!(result.status.is_ok());
    assert_eq!(result.bytes_read, data.len());
    assert_eq!(result.bytes_written, compressed.len());

    let decoder = Decoder::new();
    let mut decompressed = vec![];
    let result = decoder.into_stream(&mut decompressed).decode_all(&compressed[..]);
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(result.bytes_read, compressed.len());
    assert_eq!(decompressed, data);
}

fn assert_roundtrips(data: &[u8], code_size: u8) {
    let config = Config::new(code_size).unwrap();
    let encoder = Encoder::with_config(config);
    let decoder = Decoder::with_config(config);

    let compressed = encoder.compress(data).unwrap();
    let decompressed = decoder.decompress(&compressed);
    assert!(decompressed.is_ok(), "{}, {:?}", code_size, decompressed);
    assert!(data == &*decompressed.unwrap(), "{}", code_size);

    let codes = encoder.encode(data);
    assert!(codes.iter().all(|&code| (code as usize) < config.max_entries()));
    assert_eq!(decoder.decode(&codes).unwrap(), data);
}

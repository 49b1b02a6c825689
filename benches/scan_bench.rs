use byteorder::{LittleEndian, WriteBytesExt};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glbscope::chunk::{CHUNK_TYPE_BIN, CHUNK_TYPE_JSON};
use glbscope::reader::{extract_from_reader, ExtractOptions};
use glbscope::GLB_MAGIC;
use std::io::Cursor;

fn build_glb(json: &[u8], bin_len: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    let total = 12 + 8 + json.len() + 8 + bin_len;
    buf.write_u32::<LittleEndian>(GLB_MAGIC).unwrap();
    buf.write_u32::<LittleEndian>(2).unwrap();
    buf.write_u32::<LittleEndian>(total as u32).unwrap();
    buf.write_u32::<LittleEndian>(bin_len as u32).unwrap();
    buf.write_u32::<LittleEndian>(CHUNK_TYPE_BIN).unwrap();
    buf.extend(std::iter::repeat(0u8).take(bin_len));
    buf.write_u32::<LittleEndian>(json.len() as u32).unwrap();
    buf.write_u32::<LittleEndian>(CHUNK_TYPE_JSON).unwrap();
    buf.extend_from_slice(json);
    buf
}

fn bench_skip_bin(c: &mut Criterion) {
    let json = br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"camera":0}],"cameras":[{"type":"perspective"}]}"#;
    let glb = build_glb(json, 16 * 1024 * 1024);
    let options = ExtractOptions::default();

    c.bench_function("extract_after_16mb_bin", |b| {
        b.iter(|| extract_from_reader(Cursor::new(black_box(&glb)), &options).unwrap())
    });
}

fn bench_large_json(c: &mut Criterion) {
    let nodes: Vec<String> = (0..10_000)
        .map(|i| format!(r#"{{"name":"node_{i}","translation":[{i},0,0]}}"#))
        .collect();
    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"nodes":[{}],"meshes":[]}}"#,
        nodes.join(",")
    );
    let glb = build_glb(json.as_bytes(), 0);
    let options = ExtractOptions::default();

    c.bench_function("extract_10k_nodes", |b| {
        b.iter(|| extract_from_reader(Cursor::new(black_box(&glb)), &options).unwrap())
    });
}

criterion_group!(benches, bench_skip_bin, bench_large_json);
criterion_main!(benches);

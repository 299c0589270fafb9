use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rock_wire::{Message, MessageCodec, MemoryStream, Notify, Request};

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = MessageCodec::default();
    let messages: Vec<(&str, Message)> = vec![
        ("small_request", Request::new(7, 3, "ping").into()),
        ("notify_2k", Notify::new(1, vec![1u8; 2048]).into()),
        ("notify_50k_gzip", Notify::new(9, vec![0u8; 50_000]).into()),
    ];

    for (name, msg) in &messages {
        group.bench_function(format!("encode_{name}"), |b| {
            b.iter(|| codec.encode_to_vec(msg).unwrap())
        });

        let frame = codec.encode_to_vec(msg).unwrap();
        group.bench_function(format!("decode_{name}"), |b| {
            b.iter_batched(
                || MemoryStream::with_input(frame.clone()),
                |mut stream| codec.decode(&mut stream).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);

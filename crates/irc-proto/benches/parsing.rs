//! Benchmarks for message parsing and serialization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use irc_proto::Message;

const SIMPLE_MESSAGE: &str = "PING :irc.example.com";
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";
const NUMERIC_RESPONSE: &str =
    ":irc.server.net 001 nickname :Welcome to the Network nickname!user@host";
const SJOIN_MESSAGE: &str = ":001 SJOIN 1234567890 #channel +nt :@001AAAAAA +001AAAAAB 001AAAAAC";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    group.bench_function("simple_ping", |b| {
        b.iter(|| {
            let msg: Message = black_box(SIMPLE_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| {
            let msg: Message = black_box(PREFIX_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("numeric_response", |b| {
        b.iter(|| {
            let msg: Message = black_box(NUMERIC_RESPONSE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("sjoin", |b| {
        b.iter(|| {
            let msg: Message = black_box(SJOIN_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let simple: Message = SIMPLE_MESSAGE.parse().unwrap();
    let with_prefix: Message = PREFIX_MESSAGE.parse().unwrap();
    let sjoin: Message = SJOIN_MESSAGE.parse().unwrap();

    group.bench_function("simple_ping", |b| {
        b.iter(|| black_box(&simple).to_string())
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| black_box(&with_prefix).to_string())
    });

    group.bench_function("sjoin", |b| b.iter(|| black_box(&sjoin).to_string()));

    group.finish();
}

fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("Round Trip");

    let messages = vec![
        ("simple", SIMPLE_MESSAGE),
        ("prefix", PREFIX_MESSAGE),
        ("numeric", NUMERIC_RESPONSE),
        ("sjoin", SJOIN_MESSAGE),
    ];

    for (name, msg_str) in messages {
        group.bench_with_input(BenchmarkId::new("parse_serialize", name), msg_str, |b, s| {
            b.iter(|| {
                let msg: Message = black_box(s).parse().unwrap();
                black_box(msg.to_string())
            })
        });
    }

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Batch");

    let messages: Vec<String> = (0..100).map(|i| format!("PING :server{}\r\n", i)).collect();
    let batch: String = messages.concat();

    group.bench_function("parse_100_messages", |b| {
        b.iter(|| {
            let mut count = 0;
            for line in black_box(&batch).lines() {
                if line.parse::<Message>().is_ok() {
                    count += 1;
                }
            }
            black_box(count)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_round_trip,
    benchmark_batch,
);

criterion_main!(benches);

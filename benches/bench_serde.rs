use criterion::{Criterion, criterion_group, criterion_main};
use bigmath::{BigDecimal, BigInteger};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{hint::black_box, str::FromStr};

// ============================================================================
// JSON Serialization/Deserialization
// ============================================================================

fn bench_big_integer_serialize_json(c: &mut Criterion) {
    c.bench_function("big_integer_serialize_json", |b| {
        let v = BigInteger::from_str("123456789012345678901234567890").unwrap();
        b.iter(|| black_box(serde_json::to_string(black_box(&v)).unwrap()));
    });
}

fn bench_big_integer_deserialize_json(c: &mut Criterion) {
    c.bench_function("big_integer_deserialize_json", |b| {
        let json = r#""123456789012345678901234567890""#;
        b.iter(|| black_box(serde_json::from_str::<BigInteger>(black_box(json)).unwrap()));
    });
}

fn bench_big_decimal_serialize_json(c: &mut Criterion) {
    c.bench_function("big_decimal_serialize_json", |b| {
        let d = BigDecimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(serde_json::to_string(black_box(&d)).unwrap()));
    });
}

fn bench_big_decimal_deserialize_json(c: &mut Criterion) {
    c.bench_function("big_decimal_deserialize_json", |b| {
        let json = r#""123.456789""#;
        b.iter(|| black_box(serde_json::from_str::<BigDecimal>(black_box(json)).unwrap()));
    });
}

fn bench_big_decimal_roundtrip_json(c: &mut Criterion) {
    c.bench_function("big_decimal_roundtrip_json", |b| {
        let d = BigDecimal::from_str("123.456789").unwrap();
        b.iter(|| {
            let json = serde_json::to_string(black_box(&d)).unwrap();
            black_box(serde_json::from_str::<BigDecimal>(&json).unwrap())
        });
    });
}

fn bench_rust_decimal_roundtrip_json(c: &mut Criterion) {
    c.bench_function("rust_decimal_roundtrip_json", |b| {
        let d = Decimal::from_str("123.456789").unwrap();
        b.iter(|| {
            let json = serde_json::to_string(&black_box(d)).unwrap();
            black_box(serde_json::from_str::<Decimal>(&json).unwrap())
        });
    });
}

// ============================================================================
// Bincode (Binary Serialization)
// ============================================================================

fn bench_big_integer_serialize_bincode(c: &mut Criterion) {
    c.bench_function("big_integer_serialize_bincode", |b| {
        let v = BigInteger::from_str("-123456789012345678901234567890").unwrap();
        b.iter(|| black_box(bincode::serialize(black_box(&v)).unwrap()));
    });
}

fn bench_big_integer_deserialize_bincode(c: &mut Criterion) {
    c.bench_function("big_integer_deserialize_bincode", |b| {
        let v = BigInteger::from_str("-123456789012345678901234567890").unwrap();
        let bytes = bincode::serialize(&v).unwrap();
        b.iter(|| black_box(bincode::deserialize::<BigInteger>(black_box(&bytes)).unwrap()));
    });
}

fn bench_big_decimal_serialize_bincode(c: &mut Criterion) {
    c.bench_function("big_decimal_serialize_bincode", |b| {
        let d = BigDecimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(bincode::serialize(black_box(&d)).unwrap()));
    });
}

fn bench_big_decimal_deserialize_bincode(c: &mut Criterion) {
    c.bench_function("big_decimal_deserialize_bincode", |b| {
        let d = BigDecimal::from_str("123.456789").unwrap();
        let bytes = bincode::serialize(&d).unwrap();
        b.iter(|| black_box(bincode::deserialize::<BigDecimal>(black_box(&bytes)).unwrap()));
    });
}

fn bench_rust_decimal_serialize_bincode(c: &mut Criterion) {
    c.bench_function("rust_decimal_serialize_bincode", |b| {
        let d = Decimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(bincode::serialize(&black_box(d)).unwrap()));
    });
}

fn bench_rust_decimal_deserialize_bincode(c: &mut Criterion) {
    c.bench_function("rust_decimal_deserialize_bincode", |b| {
        let d = Decimal::from_str("123.456789").unwrap();
        let bytes = bincode::serialize(&d).unwrap();
        b.iter(|| black_box(bincode::deserialize::<Decimal>(black_box(&bytes)).unwrap()));
    });
}

// ============================================================================
// Struct Serialization (Realistic Use Case)
// ============================================================================

#[derive(Serialize, Deserialize)]
struct Ledger {
    account: u64,
    balance: BigDecimal,
    interest_rate: BigDecimal,
    nonce: BigInteger,
}

fn bench_struct_roundtrip_json(c: &mut Criterion) {
    c.bench_function("ledger_roundtrip_json", |b| {
        let ledger = Ledger {
            account: 42,
            balance: BigDecimal::from_str("1048576.125").unwrap(),
            interest_rate: BigDecimal::from_str("0.0375").unwrap(),
            nonce: BigInteger::ONE << 200,
        };
        b.iter(|| {
            let json = serde_json::to_string(black_box(&ledger)).unwrap();
            black_box(serde_json::from_str::<Ledger>(&json).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_big_integer_serialize_json,
    bench_big_integer_deserialize_json,
    bench_big_decimal_serialize_json,
    bench_big_decimal_deserialize_json,
    bench_big_decimal_roundtrip_json,
    bench_rust_decimal_roundtrip_json,
    bench_big_integer_serialize_bincode,
    bench_big_integer_deserialize_bincode,
    bench_big_decimal_serialize_bincode,
    bench_big_decimal_deserialize_bincode,
    bench_rust_decimal_serialize_bincode,
    bench_rust_decimal_deserialize_bincode,
    bench_struct_roundtrip_json,
);
criterion_main!(benches);

use std::hint::black_box;
use std::str::FromStr;

use bigmath::{BigDecimal, MathContext, RoundingMode};
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;

// ============================================================================
// BigDecimal
// ============================================================================

fn bench_addition(c: &mut Criterion) {
    c.bench_function("big_decimal_addition", |b| {
        let x = BigDecimal::from_str("123.456789").unwrap();
        let y = BigDecimal::from_str("987.654321").unwrap();
        b.iter(|| black_box(black_box(&x) + black_box(&y)));
    });
}

fn bench_multiplication(c: &mut Criterion) {
    c.bench_function("big_decimal_multiplication", |b| {
        let x = BigDecimal::from_str("123.456789").unwrap();
        let y = BigDecimal::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(&x) * black_box(&y)));
    });
}

fn bench_division(c: &mut Criterion) {
    c.bench_function("big_decimal_division_decimal128", |b| {
        let x = BigDecimal::from_str("123.456789").unwrap();
        let y = BigDecimal::from_str("9.876543").unwrap();
        b.iter(|| {
            black_box(black_box(&x).div_ctx(black_box(&y), &MathContext::DECIMAL128).unwrap())
        });
    });
}

fn bench_set_scale(c: &mut Criterion) {
    c.bench_function("big_decimal_set_scale_half_even", |b| {
        let x = BigDecimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(black_box(&x).set_scale(2, RoundingMode::HalfEven).unwrap()));
    });
}

fn bench_sqrt(c: &mut Criterion) {
    c.bench_function("big_decimal_sqrt_decimal64", |b| {
        let x = BigDecimal::TWO;
        b.iter(|| black_box(black_box(&x).sqrt(&MathContext::DECIMAL64).unwrap()));
    });
}

fn bench_parsing(c: &mut Criterion) {
    c.bench_function("big_decimal_parsing", |b| {
        b.iter(|| black_box(BigDecimal::from_str(black_box("123.456789")).unwrap()));
    });
}

fn bench_formatting(c: &mut Criterion) {
    c.bench_function("big_decimal_formatting", |b| {
        let x = BigDecimal::from_str("123.456789").unwrap();
        b.iter(|| black_box(black_box(&x).to_string()));
    });
}

// ============================================================================
// rust_decimal, same inputs
// ============================================================================

fn bench_rust_decimal_addition(c: &mut Criterion) {
    c.bench_function("rust_decimal_addition", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("987.654321").unwrap();
        b.iter(|| black_box(black_box(x) + black_box(y)));
    });
}

fn bench_rust_decimal_multiplication(c: &mut Criterion) {
    c.bench_function("rust_decimal_multiplication", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(x) * black_box(y)));
    });
}

fn bench_rust_decimal_division(c: &mut Criterion) {
    c.bench_function("rust_decimal_division", |b| {
        let x = Decimal::from_str("123.456789").unwrap();
        let y = Decimal::from_str("9.876543").unwrap();
        b.iter(|| black_box(black_box(x) / black_box(y)));
    });
}

fn bench_rust_decimal_parsing(c: &mut Criterion) {
    c.bench_function("rust_decimal_parsing", |b| {
        b.iter(|| black_box(Decimal::from_str(black_box("123.456789")).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_addition,
    bench_multiplication,
    bench_division,
    bench_set_scale,
    bench_sqrt,
    bench_parsing,
    bench_formatting,
    bench_rust_decimal_addition,
    bench_rust_decimal_multiplication,
    bench_rust_decimal_division,
    bench_rust_decimal_parsing,
);
criterion_main!(benches);

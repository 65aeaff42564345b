//! Unsigned multi-word arithmetic on little-endian `u32` slices.
//!
//! Every function here takes and returns *trimmed* magnitudes (no
//! most-significant zero word; zero is the empty slice) unless stated
//! otherwise.

use core::cmp::Ordering;

use alloc::vec;
use alloc::vec::Vec;

/// Operand size, in words, from which multiplication switches to Karatsuba.
///
/// Both operands must reach the threshold; below it schoolbook multiplication
/// wins on overhead.
pub const KARATSUBA_THRESHOLD: usize = 40;

const BASE: u64 = 1 << 32;
const LOW_MASK: u64 = 0xFFFF_FFFF;

// ============================================================================
// Normalization and Comparison
// ============================================================================

/// Drops most-significant zero words.
#[inline]
pub(crate) fn trim(v: &mut Vec<u32>) {
    while let Some(&0) = v.last() {
        v.pop();
    }
}

#[inline]
pub(crate) fn trimmed(v: &[u32]) -> &[u32] {
    let mut len = v.len();
    while len > 0 && v[len - 1] == 0 {
        len -= 1;
    }
    &v[..len]
}

/// Compares two trimmed magnitudes.
pub(crate) fn cmp(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        if x != y {
            return x.cmp(y);
        }
    }
    Ordering::Equal
}

// ============================================================================
// Addition and Subtraction
// ============================================================================

pub(crate) fn add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for i in 0..long.len() {
        let s = long[i] as u64 + *short.get(i).unwrap_or(&0) as u64 + carry;
        out.push(s as u32);
        carry = s >> 32;
    }
    if carry != 0 {
        out.push(carry as u32);
    }
    out
}

/// `a - b`; requires `a >= b`.
pub(crate) fn sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(cmp(a, b) != Ordering::Less, "magnitude subtraction underflow");
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for i in 0..a.len() {
        let d = a[i] as i64 - *b.get(i).unwrap_or(&0) as i64 - borrow;
        out.push(d as u32);
        borrow = (d < 0) as i64;
    }
    trim(&mut out);
    out
}

/// Adds `b` into `acc` starting at word `offset`; `acc` must be long enough
/// to absorb the final carry.
fn add_into(acc: &mut [u32], b: &[u32], offset: usize) {
    let mut carry = 0u64;
    let mut i = 0;
    while i < b.len() || carry != 0 {
        let s = acc[offset + i] as u64 + *b.get(i).unwrap_or(&0) as u64 + carry;
        acc[offset + i] = s as u32;
        carry = s >> 32;
        i += 1;
    }
}

/// Subtracts `b` from `acc` in place; requires `acc >= b`.
fn sub_assign(acc: &mut [u32], b: &[u32]) {
    let mut borrow = 0i64;
    let mut i = 0;
    while i < b.len() || borrow != 0 {
        let d = acc[i] as i64 - *b.get(i).unwrap_or(&0) as i64 - borrow;
        acc[i] = d as u32;
        borrow = (d < 0) as i64;
        i += 1;
    }
}

/// `v = v * m + a`, growing `v` as needed.
pub(crate) fn mul_add_word(v: &mut Vec<u32>, m: u32, a: u32) {
    let mut carry = a as u64;
    for w in v.iter_mut() {
        let p = *w as u64 * m as u64 + carry;
        *w = p as u32;
        carry = p >> 32;
    }
    if carry != 0 {
        v.push(carry as u32);
    }
    trim(v);
}

// ============================================================================
// Multiplication
// ============================================================================

pub(crate) fn mul(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    if a.len() < KARATSUBA_THRESHOLD || b.len() < KARATSUBA_THRESHOLD {
        mul_schoolbook(a, b)
    } else {
        trace_event!(trace, words_a = a.len(), words_b = b.len(), "karatsuba multiplication");
        mul_karatsuba(a, b)
    }
}

pub(crate) fn mul_schoolbook(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = vec![0u32; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            // (2^32-1)^2 + 2 * (2^32-1) == 2^64 - 1, so this never overflows
            let t = x as u64 * y as u64 + out[i + j] as u64 + carry;
            out[i + j] = t as u32;
            carry = t >> 32;
        }
        out[i + b.len()] = carry as u32;
    }
    trim(&mut out);
    out
}

/// Karatsuba: with `a = a1·B^h + a0` and `b = b1·B^h + b0`,
/// `a·b = z2·B^2h + (z1 - z2 - z0)·B^h + z0` where `z1 = (a0+a1)(b0+b1)`.
fn mul_karatsuba(a: &[u32], b: &[u32]) -> Vec<u32> {
    let half = (a.len().max(b.len()) + 1) / 2;
    let (a0, a1) = split(a, half);
    let (b0, b1) = split(b, half);

    let z0 = mul(a0, b0);
    let z2 = mul(a1, b1);
    let mut z1 = mul(&add(a0, a1), &add(b0, b1));
    sub_assign(&mut z1, &z0);
    sub_assign(&mut z1, &z2);
    trim(&mut z1);

    let mut out = vec![0u32; a.len() + b.len() + 1];
    add_into(&mut out, &z0, 0);
    add_into(&mut out, &z1, half);
    add_into(&mut out, &z2, 2 * half);
    trim(&mut out);
    out
}

#[inline]
fn split(v: &[u32], at: usize) -> (&[u32], &[u32]) {
    if v.len() <= at {
        (v, &[])
    } else {
        let (lo, hi) = v.split_at(at);
        (trimmed(lo), hi)
    }
}

// ============================================================================
// Division
// ============================================================================

/// Short division by a single non-zero word.
pub(crate) fn div_rem_word(a: &[u32], d: u32) -> (Vec<u32>, u32) {
    debug_assert!(d != 0);
    let mut q = vec![0u32; a.len()];
    let mut rem = 0u64;
    for i in (0..a.len()).rev() {
        let cur = (rem << 32) | a[i] as u64;
        q[i] = (cur / d as u64) as u32;
        rem = cur % d as u64;
    }
    trim(&mut q);
    (q, rem as u32)
}

/// Truncating division of magnitudes; `b` must be non-zero.
pub(crate) fn div_rem(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    debug_assert!(!b.is_empty(), "magnitude division by zero");
    if cmp(a, b) == Ordering::Less {
        return (Vec::new(), a.to_vec());
    }
    if b.len() == 1 {
        let (q, r) = div_rem_word(a, b[0]);
        let r = if r == 0 { Vec::new() } else { vec![r] };
        return (q, r);
    }
    trace_event!(trace, words_a = a.len(), words_b = b.len(), "knuth long division");
    div_rem_knuth(a, b)
}

/// Knuth, TAOCP vol. 2, algorithm 4.3.1 D. Requires `b.len() >= 2` and
/// `a >= b`.
fn div_rem_knuth(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let n = b.len();
    let m = a.len() - n;

    // D1: shift so the divisor's top word has its high bit set
    let s = b[n - 1].leading_zeros();
    let vn = shl_bits(b, s, n);
    let mut un = shl_bits(a, s, a.len() + 1);
    let mut q = vec![0u32; m + 1];

    let v_top = vn[n - 1] as u64;
    let v_next = vn[n - 2] as u64;

    for j in (0..=m).rev() {
        // D3: estimate, then correct at most twice
        let num = ((un[j + n] as u64) << 32) | un[j + n - 1] as u64;
        let mut qhat = num / v_top;
        let mut rhat = num % v_top;
        while qhat >= BASE || qhat * v_next > ((rhat << 32) | un[j + n - 2] as u64) {
            qhat -= 1;
            rhat += v_top;
            if rhat >= BASE {
                break;
            }
        }

        // D4: multiply and subtract
        let mut k = 0i64;
        for i in 0..n {
            let p = qhat * vn[i] as u64;
            let t = un[i + j] as i64 - k - (p & LOW_MASK) as i64;
            un[i + j] = t as u32;
            k = (p >> 32) as i64 - (t >> 32);
        }
        let t = un[j + n] as i64 - k;
        un[j + n] = t as u32;

        // D6: the estimate was one too large; add back
        if t < 0 {
            qhat -= 1;
            let mut carry = 0u64;
            for i in 0..n {
                let s = un[i + j] as u64 + vn[i] as u64 + carry;
                un[i + j] = s as u32;
                carry = s >> 32;
            }
            un[j + n] = un[j + n].wrapping_add(carry as u32);
        }
        q[j] = qhat as u32;
    }

    // D8: unnormalize the remainder
    let mut r = Vec::with_capacity(n);
    for i in 0..n {
        let hi = if s == 0 { 0 } else { un[i + 1] << (32 - s) };
        r.push((un[i] >> s) | hi);
    }
    trim(&mut q);
    trim(&mut r);
    (q, r)
}

/// Left-shifts by `s < 32` bits into a buffer of exactly `len` words.
fn shl_bits(v: &[u32], s: u32, len: usize) -> Vec<u32> {
    let mut out = vec![0u32; len];
    if s == 0 {
        out[..v.len()].copy_from_slice(v);
        return out;
    }
    let mut carry = 0u32;
    for (i, &w) in v.iter().enumerate() {
        out[i] = (w << s) | carry;
        carry = w >> (32 - s);
    }
    if carry != 0 {
        out[v.len()] = carry;
    }
    out
}

// ============================================================================
// Shifts and Bits
// ============================================================================

pub(crate) fn shl(a: &[u32], n: usize) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    let words = n / 32;
    let bits = (n % 32) as u32;
    let mut out = vec![0u32; words];
    out.extend(shl_bits(a, bits, a.len() + 1));
    trim(&mut out);
    out
}

pub(crate) fn shr(a: &[u32], n: usize) -> Vec<u32> {
    let words = n / 32;
    if words >= a.len() {
        return Vec::new();
    }
    let bits = (n % 32) as u32;
    let src = &a[words..];
    let mut out = Vec::with_capacity(src.len());
    for i in 0..src.len() {
        let lo = src[i] >> bits;
        let hi = match (bits, src.get(i + 1)) {
            (0, _) | (_, None) => 0,
            (_, Some(&next)) => next << (32 - bits),
        };
        out.push(lo | hi);
    }
    trim(&mut out);
    out
}

pub(crate) fn bit_length(a: &[u32]) -> u64 {
    match a.last() {
        None => 0,
        Some(&top) => (a.len() as u64 - 1) * 32 + (32 - top.leading_zeros()) as u64,
    }
}

/// Index of the lowest set bit, `None` for zero.
pub(crate) fn trailing_zeros(a: &[u32]) -> Option<u64> {
    a.iter()
        .position(|&w| w != 0)
        .map(|i| i as u64 * 32 + a[i].trailing_zeros() as u64)
}

/// `true` if any of the low `n` bits is set.
pub(crate) fn any_low_bits(a: &[u32], n: u64) -> bool {
    trailing_zeros(a).is_some_and(|tz| tz < n)
}

#[inline]
pub(crate) fn test_bit(a: &[u32], n: u64) -> bool {
    let word = (n / 32) as usize;
    word < a.len() && (a[word] >> (n % 32)) & 1 == 1
}

// ============================================================================
// Roots
// ============================================================================

/// Floor square root by Newton iteration.
pub(crate) fn sqrt(a: &[u32]) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    // 2^ceil(bits/2) is always >= sqrt(a)
    let mut x = shl(&[1], bit_length(a).div_ceil(2) as usize);
    loop {
        let (q, _) = div_rem(a, &x);
        let y = shr(&add(&x, &q), 1);
        if cmp(&y, &x) != Ordering::Less {
            return x;
        }
        x = y;
    }
}

// ============================================================================
// Radix Conversion
// ============================================================================

/// Largest `(k, radix^k)` such that `radix^k` fits in a word.
pub(crate) const fn radix_chunk(radix: u32) -> (usize, u32) {
    let mut k = 1;
    let mut p = radix as u64;
    while p * radix as u64 <= u32::MAX as u64 {
        p *= radix as u64;
        k += 1;
    }
    (k, p as u32)
}

/// Digit values (most significant first) of a magnitude in `radix`.
/// Zero yields a single `0` digit.
pub(crate) fn to_radix_digits(a: &[u32], radix: u32) -> Vec<u8> {
    if a.is_empty() {
        return vec![0];
    }
    let (chunk_len, chunk) = radix_chunk(radix);
    let mut digits = Vec::with_capacity(a.len() * 32);
    let mut cur = a.to_vec();
    while !cur.is_empty() {
        let (q, mut r) = div_rem_word(&cur, chunk);
        for _ in 0..chunk_len {
            digits.push((r % radix) as u8);
            r /= radix;
            if q.is_empty() && r == 0 {
                break;
            }
        }
        cur = q;
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    digits.reverse();
    digits
}

/// Builds a magnitude from digit values (most significant first), each
/// already validated to be `< radix`.
pub(crate) fn from_radix_digits(digits: &[u8], radix: u32) -> Vec<u32> {
    let (chunk_len, chunk) = radix_chunk(radix);
    let mut out = Vec::with_capacity(digits.len() / chunk_len + 1);
    for group in digits.chunks(chunk_len) {
        let mut value = 0u32;
        let mut scale = 1u32;
        for &d in group {
            value = value * radix + d as u32;
            scale = scale.wrapping_mul(radix);
        }
        let multiplier = if group.len() == chunk_len { chunk } else { scale };
        mul_add_word(&mut out, multiplier, value);
    }
    trim(&mut out);
    out
}


#[cfg(test)]
mod karatsuba_property_tests {
    use super::*;
    use proptest::prelude::*;

    fn magnitude(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(any::<u32>(), 0..max_len).prop_map(|mut v| {
            trim(&mut v);
            v
        })
    }

    proptest! {
        #[test]
        fn prop_karatsuba_matches_schoolbook(
            a in magnitude(3 * KARATSUBA_THRESHOLD),
            b in magnitude(3 * KARATSUBA_THRESHOLD),
        ) {
            let expected = if a.is_empty() || b.is_empty() {
                Vec::new()
            } else {
                mul_schoolbook(&a, &b)
            };
            prop_assert_eq!(mul(&a, &b), expected);
        }

        #[test]
        fn prop_div_rem_reconstructs(
            a in magnitude(12),
            b in magnitude(6).prop_filter("non-zero divisor", |b| !b.is_empty()),
        ) {
            let (q, r) = div_rem(&a, &b);
            prop_assert_eq!(cmp(&r, &b), Ordering::Less);
            prop_assert_eq!(add(&mul(&q, &b), &r), a);
        }

        #[test]
        fn prop_shift_round_trip(a in magnitude(8), n in 0usize..200) {
            prop_assert_eq!(shr(&shl(&a, n), n), a);
        }
    }
}

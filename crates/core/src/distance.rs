//! Distance kernels.
//!
//! Each kernel has a portable scalar form and an AVX2+FMA form that works in
//! 8-lane groups with a scalar tail for `dim % 8`. The public [`l2_squared`]
//! and [`inner_product`] entry points are bound to one of the two forms at
//! compile time: build with `-C target-feature=+avx2,+fma` (or
//! `-C target-cpu=native` on a capable host) to get the vectorized path.
//!
//! Accumulation is single precision throughout. The two forms sum in a
//! different order and agree only to within floating-point tolerance.

use crate::Metric;

/// A resolved scoring function over two equal-length vectors.
pub type Kernel = fn(&[f32], &[f32]) -> f32;

/// Number of f32 lanes processed per step by the vectorized kernels.
pub const LANES: usize = 8;

/// Whether the dispatcher resolved to the vectorized kernels.
pub const SIMD_ENABLED: bool = cfg!(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
));

/// Name of the kernel family the dispatcher resolved to.
pub fn active_kernel() -> &'static str {
    if SIMD_ENABLED {
        "avx2+fma"
    } else {
        "scalar"
    }
}

// ============================================================================
// Scalar reference kernels
// ============================================================================

/// Squared Euclidean distance, portable form.
#[inline]
pub fn l2_squared_scalar(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;

    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_remainder = a_chunks.remainder();
    let b_remainder = b_chunks.remainder();

    for (a_chunk, b_chunk) in a_chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
    }

    for (a_val, b_val) in a_remainder.iter().zip(b_remainder.iter()) {
        let d = a_val - b_val;
        sum += d * d;
    }

    sum
}

/// Inner product, portable form.
#[inline]
pub fn inner_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;

    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_remainder = a_chunks.remainder();
    let b_remainder = b_chunks.remainder();

    for (a_chunk, b_chunk) in a_chunks.zip(b_chunks) {
        sum += a_chunk[0] * b_chunk[0]
            + a_chunk[1] * b_chunk[1]
            + a_chunk[2] * b_chunk[2]
            + a_chunk[3] * b_chunk[3];
    }

    for (a_val, b_val) in a_remainder.iter().zip(b_remainder.iter()) {
        sum += a_val * b_val;
    }

    sum
}

// ============================================================================
// x86_64 AVX2+FMA kernels
// ============================================================================

/// Horizontal sum of the 8 lanes of an AVX register.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[inline]
unsafe fn hsum_avx2(acc: std::arch::x86_64::__m256) -> f32 {
    use std::arch::x86_64::*;

    let hi = _mm256_extractf128_ps(acc, 1);
    let lo = _mm256_castps256_ps128(acc);
    let sum128 = _mm_add_ps(lo, hi);
    let shuf = _mm_movehdup_ps(sum128);
    let sums = _mm_add_ps(sum128, shuf);
    let shuf2 = _mm_movehl_ps(sums, sums);
    _mm_cvtss_f32(_mm_add_ss(sums, shuf2))
}

/// Squared Euclidean distance over 8-lane groups with fused multiply-add.
///
/// # Safety
///
/// The CPU must support AVX2 and FMA, and `a` and `b` must have equal length.
/// Loads are unaligned, so no alignment is required.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
pub unsafe fn l2_squared_avx2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let n = a.len();
    let chunks = n / LANES;

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm256_setzero_ps();
    for i in 0..chunks {
        let va = _mm256_loadu_ps(a_ptr.add(i * LANES));
        let vb = _mm256_loadu_ps(b_ptr.add(i * LANES));
        let diff = _mm256_sub_ps(va, vb);
        acc = _mm256_fmadd_ps(diff, diff, acc);
    }

    let mut sum = hsum_avx2(acc);

    for i in chunks * LANES..n {
        let d = a[i] - b[i];
        sum += d * d;
    }

    sum
}

/// Inner product over 8-lane groups with fused multiply-add.
///
/// # Safety
///
/// Same contract as [`l2_squared_avx2`].
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
pub unsafe fn inner_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let n = a.len();
    let chunks = n / LANES;

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm256_setzero_ps();
    for i in 0..chunks {
        let va = _mm256_loadu_ps(a_ptr.add(i * LANES));
        let vb = _mm256_loadu_ps(b_ptr.add(i * LANES));
        acc = _mm256_fmadd_ps(va, vb, acc);
    }

    let mut sum = hsum_avx2(acc);

    for i in chunks * LANES..n {
        sum += a[i] * b[i];
    }

    sum
}

// ============================================================================
// Static dispatch
// ============================================================================

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
#[inline(always)]
fn l2_squared_dispatch(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: avx2 and fma are enabled for the whole build.
    unsafe { l2_squared_avx2(a, b) }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma")))]
#[inline(always)]
fn l2_squared_dispatch(a: &[f32], b: &[f32]) -> f32 {
    l2_squared_scalar(a, b)
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
#[inline(always)]
fn inner_product_dispatch(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: avx2 and fma are enabled for the whole build.
    unsafe { inner_product_avx2(a, b) }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma")))]
#[inline(always)]
fn inner_product_dispatch(a: &[f32], b: &[f32]) -> f32 {
    inner_product_scalar(a, b)
}

/// Squared Euclidean distance `Σ (a_i - b_i)²`. Lower is more similar.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    l2_squared_dispatch(a, b)
}

/// Inner product `Σ a_i · b_i`. Higher is more similar.
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    inner_product_dispatch(a, b)
}

/// Score two vectors under `metric`.
///
/// Resolves the kernel on every call; loops should hold on to
/// [`Metric::kernel`] instead.
#[inline]
pub fn score(a: &[f32], b: &[f32], metric: Metric) -> f32 {
    (metric.kernel())(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    const EPSILON: f32 = 1e-6;

    fn assert_approx_eq(a: f32, b: f32) {
        assert!(
            (a - b).abs() < EPSILON,
            "Values not approximately equal: {} vs {}",
            a,
            b
        );
    }

    fn assert_close(a: f32, b: f32, dim: usize) {
        let tolerance = 1e-4 * a.abs().max(b.abs()).max(1.0);
        assert!(
            (a - b).abs() <= tolerance,
            "kernels disagree at dim {}: {} vs {}",
            dim,
            a,
            b
        );
    }

    fn random_pair(rng: &mut StdRng, dim: usize) -> (Vec<f32>, Vec<f32>) {
        let a = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        (a, b)
    }

    #[test]
    fn test_l2_squared() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert_approx_eq(l2_squared(&a, &b), 2.0);

        let c = vec![1.0, 2.0, 3.0];
        let d = vec![4.0, 5.0, 6.0];
        // (4-1)^2 + (5-2)^2 + (6-3)^2 = 27
        assert_approx_eq(l2_squared(&c, &d), 27.0);
    }

    #[test]
    fn test_inner_product() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        // 4 + 10 + 18
        assert_approx_eq(inner_product(&a, &b), 32.0);
    }

    #[test]
    fn test_same_point() {
        let a = vec![0.25, -1.5, 3.0, 7.0, 0.0];
        assert_eq!(l2_squared(&a, &a), 0.0);
        assert_eq!(l2_squared_scalar(&a, &a), 0.0);
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(l2_squared_scalar(&[], &[]), 0.0);
        assert_eq!(inner_product_scalar(&[], &[]), 0.0);
        assert_eq!(l2_squared(&[], &[]), 0.0);
    }

    #[test]
    fn test_scalar_unroll_matches_naive() {
        let mut rng = StdRng::seed_from_u64(7);
        for dim in 1..=33 {
            let (a, b) = random_pair(&mut rng, dim);
            let naive_l2: f32 = a.iter().zip(&b).map(|(x, y)| (x - y) * (x - y)).sum();
            let naive_ip: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
            assert_close(l2_squared_scalar(&a, &b), naive_l2, dim);
            assert_close(inner_product_scalar(&a, &b), naive_ip, dim);
        }
    }

    #[test]
    fn test_dispatch_matches_scalar() {
        let mut rng = StdRng::seed_from_u64(11);
        for dim in [1, 3, 7, 8, 9, 15, 16, 17, 31, 64, 100, 127, 768] {
            let (a, b) = random_pair(&mut rng, dim);
            assert_close(l2_squared(&a, &b), l2_squared_scalar(&a, &b), dim);
            assert_close(inner_product(&a, &b), inner_product_scalar(&a, &b), dim);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_avx2_matches_scalar() {
        if !(is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")) {
            return;
        }

        let mut rng = StdRng::seed_from_u64(42);
        // Cover every tail length 0..8 several times over.
        for dim in 1..=67 {
            for _ in 0..4 {
                let (a, b) = random_pair(&mut rng, dim);
                let l2 = unsafe { l2_squared_avx2(&a, &b) };
                let ip = unsafe { inner_product_avx2(&a, &b) };
                assert_close(l2, l2_squared_scalar(&a, &b), dim);
                assert_close(ip, inner_product_scalar(&a, &b), dim);
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_avx2_exact_on_small_integers() {
        if !(is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")) {
            return;
        }

        let a: Vec<f32> = (0..19).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..19).map(|i| (i * 2) as f32).collect();
        // Σ i² for i in 0..19 = 2109
        assert_eq!(unsafe { l2_squared_avx2(&a, &b) }, 2109.0);
        assert_eq!(unsafe { inner_product_avx2(&a, &b) }, 4218.0);
    }

    #[test]
    fn test_active_kernel_name() {
        let name = active_kernel();
        assert_eq!(name == "avx2+fma", SIMD_ENABLED);
    }

    #[test]
    fn test_score_uses_metric() {
        let a = [1.0, 1.0];
        let b = [2.0, 3.0];
        assert_approx_eq(score(&a, &b, Metric::L2Squared), 5.0);
        assert_approx_eq(score(&a, &b, Metric::InnerProduct), 5.0);
    }

    #[test]
    fn test_large_vectors() {
        let a: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
        let b: Vec<f32> = (0..1000).map(|i| (i * 2) as f32 / 1000.0).collect();

        let dist = l2_squared(&a, &b);
        assert!(dist > 0.0);
        assert_close(dist, l2_squared_scalar(&a, &b), 1000);
    }
}

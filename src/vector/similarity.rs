//! Vector Math
//!
//! Dot product and L2 normalization over `f32` slices.

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len().min(b.len());
    let mut sum = 0.0f32;

    // Process 4 elements at a time (manual unrolling)
    let chunks = len / 4;
    let remainder = len % 4;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    for i in (len - remainder)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// L2 norm of a vector
#[inline]
pub fn magnitude(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// Normalize a vector in place to unit length. Zero vectors are left as-is.
pub fn normalize_vector(v: &mut [f32]) {
    let mag = magnitude(v);
    if mag > 0.0 {
        for x in v.iter_mut() {
            *x /= mag;
        }
    }
}

/// `acc += scale * v`
#[inline]
pub fn add_scaled(acc: &mut [f32], v: &[f32], scale: f32) {
    debug_assert_eq!(acc.len(), v.len(), "Vector dimensions must match");
    for (a, x) in acc.iter_mut().zip(v) {
        *a += scale * x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        assert!((dot_product(&a, &b) - 32.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_product_unrolled_tail() {
        let a = vec![1.0; 7];
        let b = vec![2.0; 7];
        assert!((dot_product(&a, &b) - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0, 0.0];
        normalize_vector(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!(v[2].abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        let mut v = vec![0.0, 0.0];
        normalize_vector(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn test_add_scaled() {
        let mut acc = vec![1.0, 1.0];
        add_scaled(&mut acc, &[0.5, 2.0], -1.0);
        assert_eq!(acc, vec![0.5, -1.0]);
    }
}

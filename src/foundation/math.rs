use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Hash a list of words into one 64-bit seed.
pub(crate) fn mix_seed(words: &[u64]) -> u64 {
    let mut h = Fnv1a64::new_default();
    for &w in words {
        h.write_u64(w);
    }
    h.finish()
}

/// Unsigned angle between `a` and `b`, negated when `reference` points against `a x b`.
///
/// Degenerate (zero-length) inputs yield `0.0` instead of NaN.
pub fn signed_angle(a: Vec3, b: Vec3, reference: Vec3) -> f32 {
    let (Some(na), Some(nb)) = (a.try_normalize(), b.try_normalize()) else {
        return 0.0;
    };
    let angle = na.dot(nb).clamp(-1.0, 1.0).acos();
    if reference.dot(a.cross(b)) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// `v` wrapped into `[0, n)` with Euclidean semantics. `n` must be non-zero.
pub(crate) fn wrap_index(v: i64, n: usize) -> usize {
    v.rem_euclid(n as i64) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

//! Order-sensitive 64-bit fold used to key task vectors in hash tables.

pub const CRC64_START: u64 = 0xcbf29ce484222325;
const CRC64_MUL: u64 = 0x100000001b3;

/// Folds a value into a running checksum.
///
/// `u64`/`i64`/`f64` are folded in two 32-bit halves, low half first.
pub trait Crc64Update<T: ?Sized> {
    fn crc64_update(self, value: T) -> u64;
}

impl Crc64Update<u8> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: u8) -> u64 {
        (self ^ value as u64).wrapping_mul(CRC64_MUL)
    }
}

impl Crc64Update<u32> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: u32) -> u64 {
        (self ^ value as u64).wrapping_mul(CRC64_MUL)
    }
}

impl Crc64Update<i32> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: i32) -> u64 {
        self.crc64_update(value as u32)
    }
}

impl Crc64Update<u64> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: u64) -> u64 {
        ((self ^ (value as u32) as u64).wrapping_mul(CRC64_MUL) ^ (value >> 32)).wrapping_mul(CRC64_MUL)
    }
}

impl Crc64Update<i64> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: i64) -> u64 {
        self.crc64_update(value as u64)
    }
}

impl Crc64Update<f32> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: f32) -> u64 {
        self.crc64_update(value.to_bits())
    }
}

impl Crc64Update<f64> for u64 {
    #[inline(always)]
    fn crc64_update(self, value: f64) -> u64 {
        self.crc64_update(value.to_bits())
    }
}

impl Crc64Update<&str> for u64 {
    fn crc64_update(self, value: &str) -> u64 {
        value.chars().fold(self, |crc, c| crc.crc64_update(c as u32))
    }
}

impl Crc64Update<&[u32]> for u64 {
    fn crc64_update(self, value: &[u32]) -> u64 {
        value.iter().fold(self, |crc, &v| crc.crc64_update(v))
    }
}

impl Crc64Update<&[u64]> for u64 {
    fn crc64_update(self, value: &[u64]) -> u64 {
        value.iter().fold(self, |crc, &v| crc.crc64_update(v))
    }
}

/// Checksum of a whole task vector (room states plus the trailing variant slot).
#[inline]
pub fn crc64_of_tasks(task: &[u64]) -> u64 {
    CRC64_START.crc64_update(task)
}

//! CRC-32 over the reflected polynomial `0xEDB88320`.
//!
//! The caller supplies the seed and no final XOR is applied, so the result
//! of one call can seed the next to checksum data in pieces. Seeding with
//! `0xFFFF_FFFF` and inverting the result gives the common zlib CRC-32.

const POLYNOMIAL: u32 = 0xEDB8_8320;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Checksum `bytes` starting from `seed`.
pub fn compute_crc32(bytes: &[u8], seed: u32) -> u32 {
    bytes.iter().fold(seed, |crc, &b| {
        TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// Checksum the little-endian bytes of `words`.
pub fn compute_crc32_words(words: &[u32], seed: u32) -> u32 {
    words
        .iter()
        .fold(seed, |crc, w| compute_crc32(&w.to_le_bytes(), crc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_fixture() {
        let words = [0x1234_BEF2, 0xA342_EE00, 0, 0xFFFF_FFFF];
        assert_eq!(compute_crc32_words(&words, 0xFFFF_FFFF), 0xF293_9FF3);
    }

    #[test]
    fn matches_zlib_after_inversion() {
        assert_eq!(!compute_crc32(b"123456789", 0xFFFF_FFFF), 0xCBF4_3926);
    }

    #[test]
    fn chains_across_pieces() {
        let data = b"tessel arena blob";
        let whole = compute_crc32(data, 0xFFFF_FFFF);
        let (a, b) = data.split_at(5);
        assert_eq!(compute_crc32(b, compute_crc32(a, 0xFFFF_FFFF)), whole);
    }

    #[test]
    fn empty_input_returns_the_seed() {
        assert_eq!(compute_crc32(&[], 0x1234_5678), 0x1234_5678);
    }
}

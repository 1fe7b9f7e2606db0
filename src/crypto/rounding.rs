//! Zero-padding of variable-length fields to the digest block size.
//!
//! Padding alone does not separate domains: `b"ab"` and `b"ab\0"` pad to the
//! same block. Each field is digested on its own before the per-field
//! digests are concatenated, which is what keeps slots apart.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundingError {
    #[error("block size must be non-zero")]
    ZeroBlockSize,
}

/// Right-pads `bytes` with zeros up to the next multiple of `block_size`.
/// Inputs already aligned (including the empty string) come back unchanged.
pub fn round(bytes: &[u8], block_size: usize) -> Result<Vec<u8>, RoundingError> {
    if block_size == 0 {
        return Err(RoundingError::ZeroBlockSize);
    }
    let rem = bytes.len() % block_size;
    let mut out = bytes.to_vec();
    if rem != 0 {
        out.resize(bytes.len() + (block_size - rem), 0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_next_multiple() {
        let out = round(b"test-chain-1", 16).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..12], b"test-chain-1");
        assert!(out[12..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_aligned_input_unchanged() {
        let input = [7u8; 32];
        assert_eq!(round(&input, 16).unwrap(), input.to_vec());
        assert!(round(&[], 16).unwrap().is_empty());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert_eq!(round(b"x", 0), Err(RoundingError::ZeroBlockSize));
    }
}

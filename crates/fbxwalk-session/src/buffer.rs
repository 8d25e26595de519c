use crate::error::{Result, SessionError};

/// Empty buffer with room for exactly `len` elements, or an allocation error naming the buffer.
pub(crate) fn reserve<T>(buffer: &'static str, len: usize) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|source| SessionError::Allocation { buffer, len, source })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserves_requested_capacity() {
        let buffer: Vec<f32> = reserve("vertices", 12).unwrap();
        assert!(buffer.capacity() >= 12);
        assert!(buffer.is_empty());
    }

    #[test]
    fn impossible_sizes_fail() {
        let err = reserve::<u64>("faces", usize::MAX).unwrap_err();
        assert!(matches!(err, SessionError::Allocation { buffer: "faces", .. }));
    }
}

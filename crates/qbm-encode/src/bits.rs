//! Index-to-control-pattern conversion.

/// Big-endian bit pattern of `value` over `width` bits.
///
/// Entry 0 is the most significant bit, so the pattern lines up with a
/// register whose first wire is its most significant qubit. Bits above
/// `width` are dropped.
pub fn int_to_bits(value: usize, width: usize) -> Vec<bool> {
    (0..width)
        .map(|k| {
            let shift = u32::try_from(width - 1 - k).unwrap_or(u32::MAX);
            value.checked_shr(shift).unwrap_or(0) & 1 == 1
        })
        .collect()
}

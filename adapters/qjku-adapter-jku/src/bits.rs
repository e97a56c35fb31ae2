//! Bit-order and register-boundary helpers.
//!
//! The engine prints basis states with qubit 0 as the most significant bit;
//! results use qubit 0 as the least significant bit.

use crate::measurement::MeasurementMap;

/// Reverse the low `num_bits` bits of `value`.
pub fn reverse_bits(value: usize, num_bits: usize) -> usize {
    if num_bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS as usize - num_bits)
}

/// Translation table of size `2^num_qubits` with `table[n] = reverse_bits(n)`.
///
/// Entry `n` of a host-ordered array is entry `table[n]` of the engine's array.
pub fn bit_reversal_table(num_qubits: usize) -> Vec<usize> {
    (0..1usize << num_qubits)
        .map(|n| reverse_bits(n, num_qubits))
        .collect()
}

/// Reorder an engine-ordered array into host order.
pub fn reorder<T: Clone>(values: &[T], table: &[usize]) -> Vec<T> {
    table.iter().map(|&i| values[i].clone()).collect()
}

/// Classical bit string for one engine basis-state key.
///
/// Each measured qubit's character in `engine_key` is written into an all-zero
/// buffer of `num_clbits` at its destination bit, and the buffer is read back
/// most significant bit first. Returns `None` when there are no classical
/// bits. The caller must have checked that `engine_key` covers every mapped
/// qubit.
pub fn clbit_string(engine_key: &[u8], mapping: &MeasurementMap, num_clbits: usize) -> Option<String> {
    if num_clbits == 0 {
        return None;
    }
    let mut buffer = vec![b'0'; num_clbits];
    for (qubit, clbit) in mapping {
        if let (Some(slot), Some(&bit)) = (buffer.get_mut(clbit.index()), engine_key.get(qubit.index())) {
            *slot = bit;
        }
    }
    buffer.reverse();
    String::from_utf8(buffer).ok()
}

/// Insert a space at every register boundary.
///
/// `sizes` lists registers in declaration order; the first register occupies
/// the rightmost bits, so the last-declared register is printed first.
pub fn group_bits(bits: &str, sizes: &[usize]) -> String {
    if sizes.len() <= 1 {
        return bits.to_string();
    }
    let mut end = bits.len();
    let mut chunks = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let start = end.saturating_sub(size);
        chunks.push(&bits[start..end]);
        end = start;
    }
    chunks.reverse();
    chunks.join(" ")
}

/// Remove register separators.
pub fn ungroup_bits(grouped: &str) -> String {
    grouped.split(' ').collect()
}

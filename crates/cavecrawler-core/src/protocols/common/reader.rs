/// XOR of all bytes; the checksum used by the envelope and the ultra capsule.
pub(crate) fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Sign-extend the low `width` bits of `value`.
pub(crate) fn sign_extend(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

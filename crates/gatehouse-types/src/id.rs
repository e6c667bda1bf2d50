use rand::RngCore;

/// Lowercase hex string over `bytes` random bytes.
pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// 32 hex characters (16 random bytes).
pub fn new_trace_id() -> String {
    random_hex(16)
}

/// 16 hex characters (8 random bytes).
pub fn new_span_id() -> String {
    random_hex(8)
}

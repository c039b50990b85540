/// Compare two secrets without short-circuiting on the first mismatch.
///
/// Used for the admin API key so response timing does not leak how many
/// leading characters of a guess were right.
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len()
        && provided
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// An empty configured key disables the admin surface entirely.
pub fn verify_admin_key(provided: &str, expected: &str) -> bool {
    !expected.is_empty() && constant_time_eq(provided, expected)
}

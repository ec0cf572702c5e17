//! Removes stale handles from CODEOWNERS content.

/// Returns `content` with every `@handle` token removed.
///
/// Removal is byte-for-byte on the `@handle` token: lines are never
/// deleted, and other owners, the pattern and the surrounding whitespace
/// on the line are left as they were. A token only matches when it ends
/// where the parser would end a handle (whitespace, another `@` or the end
/// of input), so removing `@bob` leaves `@bobby` intact. Handles that do
/// not occur leave the content unchanged.
///
/// # Example
///
/// ```rust
/// use cleanowners_core::rewrite::remove_handles;
///
/// let updated = remove_handles(b"*.rs @alice @bob\n", &["alice"]);
/// assert_eq!(updated, b"*.rs  @bob\n");
/// ```
pub fn remove_handles<S: AsRef<str>>(content: &[u8], handles: &[S]) -> Vec<u8> {
    let mut updated = content.to_vec();
    for handle in handles {
        let token = format!("@{}", handle.as_ref());
        updated = remove_all(&updated, token.as_bytes());
    }
    updated
}

fn remove_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        let end = i + needle.len();
        if haystack[i..].starts_with(needle) && ends_handle(haystack.get(end).copied()) {
            i = end;
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn ends_handle(next: Option<u8>) -> bool {
    match next {
        None | Some(b'@') => true,
        Some(byte) => byte.is_ascii_whitespace(),
    }
}

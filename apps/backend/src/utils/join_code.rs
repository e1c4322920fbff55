//! Lobby id generation.
//!
//! Lobby ids are short codes players read to each other, drawn from
//! Crockford's Base32 alphabet.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Length of a generated lobby id.
pub const LOBBY_ID_LEN: usize = 8;

/// Generate a random lobby id using the thread-local CSPRNG.
///
/// # Example
/// ```
/// use achi_backend::utils::join_code::{generate_lobby_id, LOBBY_ID_LEN};
///
/// let id = generate_lobby_id();
/// assert_eq!(id.len(), LOBBY_ID_LEN);
/// ```
pub fn generate_lobby_id() -> String {
    let mut rng = rand::rng();
    (0..LOBBY_ID_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// True if `raw` has the shape of a generated lobby id.
pub fn is_lobby_id(raw: &str) -> bool {
    raw.len() == LOBBY_ID_LEN && raw.bytes().all(|b| CROCKFORD.contains(&b))
}

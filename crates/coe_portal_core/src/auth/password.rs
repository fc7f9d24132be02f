//! Initial password generation for admin-created accounts.

use rand::Rng;

const INITIAL_PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
const INITIAL_PASSWORD_LEN: usize = 12;

/// Generates a random 12-character initial password.
///
/// Accounts created with it are flagged `force_password_reset`.
pub fn generate_initial_password() -> String {
    let mut rng = rand::thread_rng();
    (0..INITIAL_PASSWORD_LEN)
        .map(|_| {
            INITIAL_PASSWORD_CHARSET[rng.gen_range(0..INITIAL_PASSWORD_CHARSET.len())] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{generate_initial_password, INITIAL_PASSWORD_CHARSET};

    #[test]
    fn password_has_fixed_length_and_charset() {
        for _ in 0..50 {
            let password = generate_initial_password();
            assert_eq!(password.len(), 12);
            assert!(password.bytes().all(|b| INITIAL_PASSWORD_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn passwords_differ_between_calls() {
        assert_ne!(generate_initial_password(), generate_initial_password());
    }
}

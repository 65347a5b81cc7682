//! Invoice verification codes.

use rand::Rng;

/// No 0/O or 1/I, so codes survive being read over the phone.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const GROUP_LEN: usize = 4;

/// Eight random characters formatted `XXXX-XXXX`.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    let mut group = || -> String {
        (0..GROUP_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    };
    let first = group();
    let second = group();
    format!("{first}-{second}")
}

/// Whether `code` has the shape produced by [`generate_verification_code`].
pub fn is_verification_code(code: &str) -> bool {
    let Some((first, second)) = code.split_once('-') else {
        return false;
    };
    [first, second].iter().all(|group| {
        group.len() == GROUP_LEN && group.bytes().all(|b| ALPHABET.contains(&b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_well_formed() {
        for _ in 0..200 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 9);
            assert!(is_verification_code(&code), "bad code {code}");
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert!(!is_verification_code("ABCDEFGH"));
        assert!(!is_verification_code("ABCD-EFG"));
        assert!(!is_verification_code("ABCD-EF0H"));
        assert!(!is_verification_code("abcd-efgh"));
        assert!(is_verification_code("ABCD-EFGH"));
    }
}

use rand::Rng;

/// Alphabet without 0/O/1/I/L so codes survive being read out loud.
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// Generate a human-shareable booking code, e.g. `LC-7KQ2MX`.
pub fn booking_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("LC-{}", suffix)
}

/// Generate a 6-digit numeric OTP code, zero-padded.
pub fn otp_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_shape() {
        let code = booking_code();
        assert!(code.starts_with("LC-"));
        assert_eq!(code.len(), 3 + CODE_LEN);
        for c in code[3..].chars() {
            assert!(ALPHABET.contains(&(c as u8)), "unexpected char {}", c);
        }
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..32 {
            let code = otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_are_not_constant() {
        let a = booking_code();
        let b = booking_code();
        let c = booking_code();
        assert!(a != b || b != c);
    }
}

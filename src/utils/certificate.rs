use chrono::Utc;
use rand::{thread_rng, Rng};

const SUFFIX_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 6;

/// Credential identifier: `CPTE-<epoch millis>-<6 random base36 uppercase chars>`.
pub fn generate_certificate_number() -> String {
    let mut rng = thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("CPTE-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_number_format() {
        let number = generate_certificate_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CPTE");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(!parts[1].is_empty());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn certificate_numbers_vary() {
        let a = generate_certificate_number();
        let b = generate_certificate_number();
        // Same millisecond is possible; the random suffix still differs.
        assert_ne!(a, b);
    }
}

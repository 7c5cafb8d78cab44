use crate::error::Result;
use crate::traits::StringGenerator;
use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Lowercase alphanumeric suffixes, valid in AWS resource names
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomStringGenerator;

impl StringGenerator for RandomStringGenerator {
    fn generate(&self, prefix: &str, length: usize) -> Result<String> {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Ok(format!("{}{}", prefix, suffix))
    }
}

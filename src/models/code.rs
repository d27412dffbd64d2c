use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

/// Alphabet for transaction codes: uppercase letters and digits.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Codes are 5 characters: short enough to type back from a phone.
pub const CODE_LEN: usize = 5;

/// Abstraction over transaction-code generation to support deterministic
/// tests.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniformly random codes. No uniqueness retry against existing rows;
/// collisions over a personal ledger are a known, accepted limitation.
#[derive(Debug, Clone, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}

/// A deterministic generator that returns a pre-seeded sequence of codes.
///
/// Panics if you request more codes than provided.
#[derive(Debug, Default)]
pub struct FixedCodeGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl FixedCodeGenerator {
    pub fn new(codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .expect("fixed code generator lock poisoned")
            .pop_front()
            .expect("fixed code generator exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_are_five_uppercase_alphanumerics() {
        let generator = RandomCodeGenerator;
        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn fixed_generator_replays_its_sequence() {
        let generator = FixedCodeGenerator::new(["AAAAA", "BBBBB"]);
        assert_eq!(generator.generate(), "AAAAA");
        assert_eq!(generator.generate(), "BBBBB");
    }
}

// src/core/prosody/syllables.rs
//
// Naive syllable counting: one syllable per run of consecutive vowels

/// Icelandic vowels, lowercase
pub const ICELANDIC_VOWELS: &str = "aáeéiíoóuúyýæö";

/// Vowel-run syllable counter for one alphabet
#[derive(Debug, Clone)]
pub struct SyllableCounter {
    vowels: Vec<char>,
}

impl Default for SyllableCounter {
    fn default() -> Self {
        Self::icelandic()
    }
}

impl SyllableCounter {
    pub fn icelandic() -> Self {
        Self::with_vowels(ICELANDIC_VOWELS)
    }

    /// Counter for a custom vowel set. Matching is case sensitive; transcripts
    /// are lowercased before counting.
    pub fn with_vowels(vowels: &str) -> Self {
        Self {
            vowels: vowels.chars().collect(),
        }
    }

    fn is_vowel(&self, c: char) -> bool {
        self.vowels.contains(&c)
    }

    /// Number of maximal vowel runs in `text`
    pub fn count(&self, text: &str) -> usize {
        let mut count = 0;
        let mut in_run = false;
        for c in text.chars() {
            let vowel = self.is_vowel(c);
            if vowel && !in_run {
                count += 1;
            }
            in_run = vowel;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_syllables() {
        let counter = SyllableCounter::icelandic();
        assert_eq!(counter.count("þetta hér á sko að hafa tólf atkvæði"), 12);
    }

    #[test]
    fn test_vowel_runs() {
        let counter = SyllableCounter::icelandic();
        assert_eq!(counter.count("auður"), 2);
        assert_eq!(counter.count("Auður"), 2);
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("þrjú þ"), 1);
        assert_eq!(counter.count("123 !?"), 0);
    }

    #[test]
    fn test_custom_vowels() {
        let counter = SyllableCounter::with_vowels("aeiou");
        assert_eq!(counter.count("banana"), 3);
        assert_eq!(counter.count("queue"), 1);
    }
}

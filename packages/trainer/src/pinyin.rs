//! 拼音处理
//!
//! Converts tone-number pinyin (`ni3 hao3`) to tone marks (`nǐ hǎo`) and
//! strips tones for loose matching.

use hanzi_srs_algo::{AnswerNormalizer, Attribute, PlainNormalizer};

/// Base vowel and its marked forms for tones 1-4
static TONE_MARKS: [(char, [char; 4]); 12] = [
    ('a', ['ā', 'á', 'ǎ', 'à']),
    ('e', ['ē', 'é', 'ě', 'è']),
    ('i', ['ī', 'í', 'ǐ', 'ì']),
    ('o', ['ō', 'ó', 'ǒ', 'ò']),
    ('u', ['ū', 'ú', 'ǔ', 'ù']),
    ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
    ('A', ['Ā', 'Á', 'Ǎ', 'À']),
    ('E', ['Ē', 'É', 'Ě', 'È']),
    ('I', ['Ī', 'Í', 'Ǐ', 'Ì']),
    ('O', ['Ō', 'Ó', 'Ǒ', 'Ò']),
    ('U', ['Ū', 'Ú', 'Ǔ', 'Ù']),
    ('Ü', ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ']),
];

fn is_vowel(c: char) -> bool {
    TONE_MARKS.iter().any(|(base, _)| *base == c)
}

fn marked(base: char, tone: u32) -> char {
    TONE_MARKS
        .iter()
        .find(|(b, _)| *b == base)
        .and_then(|(_, marks)| marks.get(tone.checked_sub(1)? as usize).copied())
        .unwrap_or(base)
}

fn unmarked(c: char) -> char {
    TONE_MARKS
        .iter()
        .find(|(_, marks)| marks.contains(&c))
        .map(|(base, _)| *base)
        .unwrap_or(c)
}

/// `v` and `u:` spellings of ü
fn normalize_umlaut(syllable: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(syllable.len());
    let mut chars = syllable.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            'v' => out.push('ü'),
            'V' => out.push('Ü'),
            'u' | 'U' if chars.peek() == Some(&':') => {
                chars.next();
                out.push(if c == 'u' { 'ü' } else { 'Ü' });
            }
            _ => out.push(c),
        }
    }
    out
}

fn mark_syllable(syllable: &str, tone: u32) -> String {
    let mut chars = normalize_umlaut(syllable);
    if !(1..=4).contains(&tone) {
        return chars.into_iter().collect();
    }

    let lower: Vec<char> = chars.iter().map(|c| c.to_lowercase().next().unwrap_or(*c)).collect();
    // a/e 优先, ou 标在 o 上, 其余标在最后一个元音
    let target = lower
        .iter()
        .position(|&c| c == 'a' || c == 'e')
        .or_else(|| lower.windows(2).position(|w| w[0] == 'o' && w[1] == 'u'))
        .or_else(|| lower.iter().rposition(|&c| is_vowel(c)));

    if let Some(idx) = target {
        chars[idx] = marked(chars[idx], tone);
    }
    chars.into_iter().collect()
}

/// Replaces trailing tone digits with tone marks, syllable by syllable
///
/// Digits 5 and 0 mark the neutral tone and are dropped. Digits that do not
/// follow a letter are kept, and `v`/`u:` become `ü`.
pub fn to_tone_marks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut syllable = String::new();

    for ch in input.chars() {
        match ch {
            '0'..='5' if !syllable.is_empty() => {
                let tone = ch.to_digit(10).unwrap_or(0);
                out.push_str(&mark_syllable(&syllable, tone));
                syllable.clear();
            }
            c if c.is_alphabetic() || c == ':' => syllable.push(c),
            other => {
                out.push_str(&mark_syllable(&syllable, 0));
                syllable.clear();
                out.push(other);
            }
        }
    }
    out.push_str(&mark_syllable(&syllable, 0));
    out
}

/// Removes tone marks and tone digits
pub fn strip_tones(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(unmarked)
        .collect()
}

/// Compares pinyin answers by their tone-marked form, ignoring case and spacing
///
/// The loose variant also drops tones, so `ma1` matches `ma3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PinyinNormalizer {
    ignore_tones: bool,
}

impl PinyinNormalizer {
    pub fn strict() -> Self {
        Self { ignore_tones: false }
    }

    pub fn loose() -> Self {
        Self { ignore_tones: true }
    }
}

impl AnswerNormalizer for PinyinNormalizer {
    fn normalize(&self, attribute: Attribute, text: &str) -> String {
        let plain = PlainNormalizer.normalize(attribute, text);
        if attribute != Attribute::Pinyin {
            return plain;
        }
        let marked = to_tone_marks(&plain);
        let folded = if self.ignore_tones {
            strip_tones(&marked)
        } else {
            marked
        };
        folded.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_marks() {
        assert_eq!(to_tone_marks("ni3 hao3"), "nǐ hǎo");
        assert_eq!(to_tone_marks("ma1 ma2 ma3 ma4 ma5"), "mā má mǎ mà ma");
    }

    #[test]
    fn test_mark_placement() {
        assert_eq!(to_tone_marks("xie4"), "xiè");
        assert_eq!(to_tone_marks("zhou1"), "zhōu");
        assert_eq!(to_tone_marks("gui4"), "guì");
        assert_eq!(to_tone_marks("liu2"), "liú");
        assert_eq!(to_tone_marks("huai4"), "huài");
    }

    #[test]
    fn test_umlaut_spellings() {
        assert_eq!(to_tone_marks("lv4"), "lǜ");
        assert_eq!(to_tone_marks("nu:3"), "nǚ");
        assert_eq!(to_tone_marks("lüe4"), "lüè");
    }

    #[test]
    fn test_joined_syllables_and_case() {
        assert_eq!(to_tone_marks("Zhong1guo2"), "Zhōngguó");
        assert_eq!(to_tone_marks("ER4"), "ÈR");
    }

    #[test]
    fn test_no_digits_passes_through() {
        assert_eq!(to_tone_marks("hello, world"), "hello, world");
        assert_eq!(to_tone_marks("ni3 (2024)"), "nǐ (2024)");
        assert_eq!(to_tone_marks(""), "");
    }

    #[test]
    fn test_strip_tones() {
        assert_eq!(strip_tones("nǐ hǎo"), "ni hao");
        assert_eq!(strip_tones("ni3 hao3"), "ni hao");
        assert_eq!(strip_tones("lǜ"), "lü");
    }

    #[test]
    fn test_normalizer_equates_spellings() {
        let n = PinyinNormalizer::strict();
        assert_eq!(
            n.normalize(Attribute::Pinyin, "Ni3 hao3"),
            n.normalize(Attribute::Pinyin, "nǐhǎo")
        );
        assert_ne!(
            n.normalize(Attribute::Pinyin, "ni3"),
            n.normalize(Attribute::Pinyin, "ni2")
        );
        assert_eq!(n.normalize(Attribute::Translation, "  To  Eat "), "to eat");
    }

    #[test]
    fn test_loose_normalizer_ignores_tones() {
        let n = PinyinNormalizer::loose();
        assert_eq!(n.normalize(Attribute::Pinyin, "ni3 hao3"), "nihao");
        assert_eq!(
            n.normalize(Attribute::Pinyin, "ma1"),
            n.normalize(Attribute::Pinyin, "mǎ")
        );
        // ü survives tone stripping
        assert_eq!(n.normalize(Attribute::Pinyin, "lv4"), "lü");
        assert_ne!(
            n.normalize(Attribute::Pinyin, "lu4"),
            n.normalize(Attribute::Pinyin, "lv4")
        );
    }
}

//! Script family selection and text joining

/// Spacing family of the active source language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageClass {
    /// Japanese, Chinese and Korean: no spaces between words
    Cjk,
    /// Latin and other space-separated scripts
    Western,
}

impl LanguageClass {
    /// Classify a language code such as `ja`, `zh-CN`, `ch_sim` or `korean`
    pub fn from_code(code: &str) -> Self {
        let lowered = code.trim().to_ascii_lowercase();
        let primary = lowered.split(['-', '_']).next().unwrap_or_default();

        match primary {
            "ja" | "jp" | "jpn" | "japan" | "japanese" | "zh" | "ch" | "chi" | "chinese"
            | "cmn" | "yue" | "ko" | "kor" | "korean" => LanguageClass::Cjk,
            _ => LanguageClass::Western,
        }
    }
}

/// Whether a character belongs to a CJK script or CJK punctuation block
pub fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF     // Hangul Jamo
        | 0x3000..=0x303F   // CJK punctuation
        | 0x3040..=0x30FF   // Hiragana, Katakana
        | 0x3130..=0x318F   // Hangul compatibility Jamo
        | 0x31F0..=0x31FF   // Katakana extensions
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7AF   // Hangul syllables
        | 0xF900..=0xFAFF   // CJK compatibility ideographs
        | 0xFF00..=0xFFEF   // Halfwidth and fullwidth forms
        | 0x20000..=0x2FA1F)
}

/// Separator to put between two adjacent pieces of text on the same line
///
/// Western text is space-joined unless both sides of the boundary are CJK
/// glyphs; CJK text is concatenated unless both sides are Latin letters or
/// digits. Whitespace already present at the boundary is never doubled.
pub fn separator(prev: &str, next: &str, class: LanguageClass) -> &'static str {
    let (Some(last), Some(first)) = (prev.chars().last(), next.chars().next()) else {
        return "";
    };

    if last.is_whitespace() || first.is_whitespace() {
        return "";
    }

    match class {
        LanguageClass::Western => {
            if is_cjk_char(last) && is_cjk_char(first) {
                ""
            } else {
                " "
            }
        }
        LanguageClass::Cjk => {
            if last.is_ascii_alphanumeric() && first.is_ascii_alphanumeric() {
                " "
            } else {
                ""
            }
        }
    }
}

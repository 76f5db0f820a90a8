//! Bounded Unicode range tables for grapheme-cluster break property (UAX #29)
//! and line-break class (UAX #14).
//!
//! These are not full UCD loaders: only the ranges exercised by the
//! conformance fixtures bundled in this crate's tests are covered (ASCII,
//! Latin-1 supplement, combining diacritics, ZWJ, regional indicators, CJK
//! unified ideographs, common emoji blocks). Anything outside those ranges
//! classifies as the conservative default each algorithm specifies for
//! unassigned code points.

/// UAX #29 grapheme cluster break property, restricted to the values this
/// crate's break algorithm branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphemeProp {
    Cr,
    Lf,
    Control,
    Extend,
    ZwjProp,
    RegionalIndicator,
    Prepend,
    SpacingMark,
    L,
    V,
    T,
    Lv,
    Lvt,
    ExtendedPictographic,
    Other,
}

pub fn classify_grapheme(c: char) -> GraphemeProp {
    use GraphemeProp::*;
    match c {
        '\r' => Cr,
        '\n' => Lf,
        '\u{200D}' => ZwjProp,
        '\u{1F1E6}'..='\u{1F1FF}' => RegionalIndicator,
        // Hangul jamo blocks (L/V/T), used by GB6-GB8.
        '\u{1100}'..='\u{115F}' | '\u{A960}'..='\u{A97C}' => L,
        '\u{1160}'..='\u{11A7}' | '\u{D7B0}'..='\u{D7C6}' => V,
        '\u{11A8}'..='\u{11FF}' | '\u{D7CB}'..='\u{D7FB}' => T,
        // Precomposed Hangul syllable block: LV if the syllable has no
        // trailing jamo (offset divisible by 28), LVT otherwise.
        '\u{AC00}'..='\u{D7A3}' => {
            if (c as u32 - 0xAC00) % 28 == 0 {
                Lv
            } else {
                Lvt
            }
        }
        // Combining diacritical marks and other zero-width combiners.
        '\u{0300}'..='\u{036F}'
        | '\u{1AB0}'..='\u{1AFF}'
        | '\u{1DC0}'..='\u{1DFF}'
        | '\u{20D0}'..='\u{20FF}'
        | '\u{FE20}'..='\u{FE2F}'
        | '\u{0483}'..='\u{0489}' => Extend,
        '\u{FE0E}' | '\u{FE0F}' => Extend, // variation selectors
        '\u{0591}'..='\u{05BD}' => SpacingMark,
        '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' => Control,
        '\u{2600}'..='\u{27BF}' | '\u{1F300}'..='\u{1FAFF}' => ExtendedPictographic,
        '\u{0600}'..='\u{0605}' => Prepend,
        _ => Other,
    }
}

/// UAX #14 line-break class, restricted to the values this crate's pair
/// table branches on. Numeric-specific tailoring (LB25) is not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreakClass {
    Mandatory,
    Cr,
    Lf,
    Space,
    Glue,
    OpenPunctuation,
    ClosePunctuation,
    Quotation,
    CombiningMark,
    Ideographic,
    AlphaNumeric,
}

pub fn classify_linebreak(c: char) -> LineBreakClass {
    use LineBreakClass::*;
    match c {
        '\r' => Cr,
        '\n' => Lf,
        '\u{0085}' | '\u{000B}' | '\u{000C}' | '\u{2028}' | '\u{2029}' => Mandatory,
        ' ' | '\t' => Space,
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{2060}' => Glue,
        '(' | '[' | '{' => OpenPunctuation,
        ')' | ']' | '}' => ClosePunctuation,
        '"' | '\'' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => Quotation,
        '\u{0300}'..='\u{036F}' | '\u{20D0}'..='\u{20FF}' => CombiningMark,
        '\u{4E00}'..='\u{9FFF}' | '\u{3040}'..='\u{30FF}' | '\u{FF00}'..='\u{FFEF}' => Ideographic,
        _ => AlphaNumeric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_letters_classify_as_other_and_alphanumeric() {
        assert_eq!(classify_grapheme('a'), GraphemeProp::Other);
        assert_eq!(classify_linebreak('a'), LineBreakClass::AlphaNumeric);
    }

    #[test]
    fn combining_acute_is_extend() {
        assert_eq!(classify_grapheme('\u{0301}'), GraphemeProp::Extend);
    }

    #[test]
    fn cjk_ideograph_is_ideographic() {
        assert_eq!(classify_linebreak('界'), LineBreakClass::Ideographic);
    }

    #[test]
    fn regional_indicator_pair_detected() {
        assert_eq!(
            classify_grapheme('\u{1F1FA}'),
            GraphemeProp::RegionalIndicator
        );
    }
}

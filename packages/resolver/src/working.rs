//! Mutable working copy of the two match keys during one resolve call.

use vn_admin_dictionary::{Entry, KeywordMatch, Scope};
use vn_admin_normalize::{AddressKeys, keys};

/// Placeholder for masked characters. Never part of a keyword.
const MASK: char = '#';

/// A character range, valid in both keys at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Converts a byte-offset match in `haystack` to character offsets.
    pub fn of(haystack: &str, found: &KeywordMatch<'_>) -> Self {
        let start = haystack[..found.start].chars().count();
        let end = start + haystack[found.start..found.end].chars().count();
        Self { start, end }
    }
}

/// Which of the two keys a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Loose,
    Accented,
}

impl KeyKind {
    pub const fn for_accented(accented: bool) -> Self {
        if accented { Self::Accented } else { Self::Loose }
    }
}

/// The loose and accented keys, consumed level by level.
#[derive(Debug, Clone)]
pub struct WorkingKeys {
    keys: AddressKeys,
}

impl WorkingKeys {
    pub fn new(display: &str) -> Self {
        Self { keys: keys(display) }
    }

    pub fn loose(&self) -> &str {
        &self.keys.loose
    }

    pub fn accented(&self) -> &str {
        &self.keys.accented
    }

    pub fn get(&self, kind: KeyKind) -> &str {
        match kind {
            KeyKind::Loose => self.loose(),
            KeyKind::Accented => self.accented(),
        }
    }

    /// Number of separators left in the key.
    pub fn separator_count(&self) -> usize {
        self.keys
            .loose
            .chars()
            .filter(|c| *c == vn_admin_normalize::SEPARATOR)
            .count()
    }

    /// Rightmost keyword of `scope` in the chosen key.
    pub fn find<'s>(
        &self,
        scope: &'s Scope,
        kind: KeyKind,
    ) -> Option<(Span, KeywordMatch<'s>, &'s Entry)> {
        let haystack = self.get(kind);
        let (found, entry) = scope.rightmost(haystack)?;
        Some((Span::of(haystack, &found), found, entry))
    }

    /// Loose key with the first of `keywords` found replaced by an inert
    /// placeholder of the same length.
    ///
    /// Only the keyword starting leftmost is masked, earlier list entries
    /// winning a tie. Every other keyword stays visible.
    pub fn masked_loose(&self, keywords: &[&str]) -> String {
        let loose = &self.keys.loose;
        let first = keywords
            .iter()
            .filter(|k| !k.is_empty())
            .filter_map(|k| loose.find(*k).map(|at| (at, *k)))
            .min_by_key(|(at, _)| *at);
        let Some((_, keyword)) = first else {
            return loose.clone();
        };
        let placeholder: String = std::iter::repeat_n(MASK, keyword.chars().count()).collect();
        loose.replace(keyword, &placeholder)
    }

    /// Removes a span from both keys.
    pub fn excise(&mut self, span: Span) {
        remove_chars(&mut self.keys.loose, span);
        remove_chars(&mut self.keys.accented, span);
    }
}

fn remove_chars(text: &mut String, span: Span) {
    let byte_at = |index: usize| {
        text.char_indices()
            .nth(index)
            .map_or(text.len(), |(byte, _)| byte)
    };
    let start = byte_at(span.start);
    let end = byte_at(span.end);
    text.replace_range(start..end, "");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excise_keeps_keys_aligned() {
        let mut keys = WorkingKeys::new("Phường Đội Cấn, Ba Đình, Hà Nội");
        assert_eq!(keys.loose(), "phuongdoican,badinh,hanoi");
        keys.excise(Span { start: 20, end: 25 });
        assert_eq!(keys.loose(), "phuongdoican,badinh,");
        assert_eq!(keys.accented(), "phườngđộicấn,bađình,");
        keys.excise(Span { start: 13, end: 19 });
        assert_eq!(keys.loose(), "phuongdoican,,");
        assert_eq!(keys.accented(), "phườngđộicấn,,");
    }

    #[test]
    fn span_converts_byte_offsets_of_accented_text() {
        let haystack = "sapả,lào";
        let found = KeywordMatch {
            key: "x",
            keyword: "lào",
            start: "sapả,".len(),
            end: haystack.len(),
        };
        assert_eq!(Span::of(haystack, &found), Span { start: 5, end: 8 });
    }

    #[test]
    fn mask_preserves_length() {
        let keys = WorkingKeys::new("Phường Thủy Xuân, Thành phố Huế");
        let masked = keys.masked_loose(&["phuongthuyxuan", ""]);
        assert_eq!(masked, "##############,thanhphohue");
        assert_eq!(masked.chars().count(), keys.loose().chars().count());
    }

    #[test]
    fn mask_leaves_overlapping_district_visible() {
        let keys = WorkingKeys::new("Phường Thuận Hòa, Quận Thuận Hóa, Thành phố Huế");
        let masked = keys.masked_loose(&["phuongthuybieu", "phuongthuanhoa", "thuanhoa"]);
        assert_eq!(masked, "##############,quanthuanhoa,thanhphohue");
    }

    #[test]
    fn mask_hides_leftmost_keyword_only() {
        let keys = WorkingKeys::new("Thuận Hòa, Phường Thủy Xuân, Huế");
        let masked = keys.masked_loose(&["phuongthuyxuan", "thuanhoa"]);
        assert_eq!(masked, "########,phuongthuyxuan,hue");
    }

    #[test]
    fn mask_without_match_is_identity() {
        let keys = WorkingKeys::new("Quận Phú Xuân, Huế");
        assert_eq!(keys.masked_loose(&["phuongthuyxuan"]), keys.loose());
        assert_eq!(keys.masked_loose(&[]), keys.loose());
    }

    #[test]
    fn counts_separators() {
        let keys = WorkingKeys::new("a, b, c, d");
        assert_eq!(keys.separator_count(), 3);
    }
}

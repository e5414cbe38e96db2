//! Street recovery from the unconsumed part of the address.
//!
//! The street is whatever precedes the finest matched unit in the loose
//! key. That loose text is mapped back onto the display text character by
//! character so the street keeps its original spelling.

use vn_admin_normalize::{SEPARATOR, loose_char, title_case, trim_punctuation};

/// Extracts the street from `display` given the remaining loose key.
///
/// With a `cut` (character offset of the finest matched keyword) the street
/// is the text before the cut, minus the trailing comma-separated part, which
/// belongs to the matched unit. Without one, it is the first
/// comma-separated part of what is left.
pub fn extract(display: &str, remaining_loose: &str, cut: Option<usize>) -> Option<String> {
    let target: String = match cut {
        Some(cut) => {
            let prefix: String = remaining_loose.chars().take(cut).collect();
            let parts: Vec<&str> = prefix.split(SEPARATOR).collect();
            let kept = if parts.len() > 1 {
                &parts[..parts.len() - 1]
            } else {
                &parts[..]
            };
            kept.concat()
        }
        None => remaining_loose
            .split(SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let full: String = display
        .chars()
        .filter_map(loose_char)
        .filter(|c| *c != SEPARATOR)
        .collect();
    let common: Vec<char> = full
        .chars()
        .zip(target.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a)
        .collect();

    let mut consumed = 0;
    let mut end = 0;
    for (byte, c) in display.char_indices() {
        match loose_char(c).filter(|k| *k != SEPARATOR) {
            None => {}
            Some(k) if common.get(consumed) == Some(&k) => consumed += 1,
            Some(_) => break,
        }
        end = byte + c.len_utf8();
    }

    let street = trim_punctuation(&display[..end]);
    if street.is_empty() {
        None
    } else {
        Some(title_case(street))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuts_before_matched_ward() {
        let street = extract(
            "52 Đường Số 4, Linh Chiểu, Quận 9",
            "52duongso4,linhchieu,",
            Some(11),
        );
        assert_eq!(street.as_deref(), Some("52 Đường Số 4"));
    }

    #[test]
    fn keeps_multi_part_street() {
        let street = extract(
            "Ngõ 5, phố Huế, Phường Tràng Tiền, Hoàn Kiếm",
            "ngo5,phohue,phuongtrangtien,,",
            Some(12),
        );
        assert_eq!(street.as_deref(), Some("Ngõ 5, Phố Huế"));
    }

    #[test]
    fn first_part_without_cut() {
        let street = extract("Xã An Vĩnh, Huyện Lý Sơn, Quảng Ngãi", "xaanvinh,,", None);
        assert_eq!(street.as_deref(), Some("Xã An Vĩnh"));
    }

    #[test]
    fn nothing_before_leading_ward() {
        let street = extract(
            "Phường Tràng Tiền, Quận Hoàn Kiếm, Hà Nội",
            "phuongtrangtien,,",
            Some(0),
        );
        assert_eq!(street, None);
    }

    #[test]
    fn title_cases_lowercase_input() {
        let street = extract("24 phố hàng bài,phuongcuanam,thanhphohanoi", "24phohangbai,phuongcuanam,", Some(13));
        assert_eq!(street.as_deref(), Some("24 Phố Hàng Bài"));
    }
}

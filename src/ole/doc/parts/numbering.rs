//! Number formats used by list labels and page numbers.

/// Format `value` according to a number format code (`nfc`).
///
/// Supported codes: 0 arabic, 1 upper roman, 2 lower roman, 3 upper letter,
/// 4 lower letter, 5 ordinal. Anything else falls back to arabic.
///
/// # Examples
///
/// ```
/// use wordbin::ole::doc::parts::numbering::format_number;
///
/// assert_eq!(format_number(14, 1), "XIV");
/// assert_eq!(format_number(28, 4), "bb");
/// assert_eq!(format_number(3, 5), "3rd");
/// ```
pub fn format_number(value: i32, nfc: u8) -> String {
    match nfc {
        1 => to_roman(value),
        2 => to_roman(value).to_lowercase(),
        3 => to_letter(value),
        4 => to_letter(value).to_lowercase(),
        5 => to_ordinal(value),
        _ => value.to_string(),
    }
}

fn to_roman(value: i32) -> String {
    const NUMERALS: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if value <= 0 {
        return value.to_string();
    }
    let mut rest = value;
    let mut out = String::new();
    for (amount, numeral) in NUMERALS {
        while rest >= amount {
            out.push_str(numeral);
            rest -= amount;
        }
    }
    out
}

/// A, B, ..., Z, AA, BB, ...
fn to_letter(value: i32) -> String {
    if value <= 0 {
        return value.to_string();
    }
    let index = (value - 1) as u32;
    let letter = char::from(b'A' + (index % 26) as u8);
    std::iter::repeat_n(letter, (index / 26) as usize + 1).collect()
}

fn to_ordinal(value: i32) -> String {
    let suffix = match (value % 100, value % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

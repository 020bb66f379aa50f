/// Money is kept as whole currency units (e.g. Rupiah); fractions are not modeled.
pub type Amount = i64;

/// Format an amount with comma thousands separators.
/// Example: 5000000 -> "5,000,000", -1234 -> "-1,234"
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format an amount as Rupiah, e.g. "Rp25,000".
pub fn format_rupiah(amount: Amount) -> String {
    format!("Rp{}", format_amount(amount))
}

/// Read the first run of ASCII digits in `text` as an amount.
///
/// Anything that is not a digit acts as a separator, so "50 rb dan 20rb"
/// yields 50. Returns 0 when the text holds no digit at all and saturates
/// at `Amount::MAX` instead of overflowing.
///
/// Only ASCII `0-9` are digits here. Other scripts' decimal digits, such as
/// Arabic-Indic "٣٤", are separators and never contribute to the amount.
pub fn first_amount(text: &str) -> Amount {
    let digits = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit());

    let mut value: Amount = 0;
    for digit in digits {
        let d = Amount::from(digit as u8 - b'0');
        value = match value.checked_mul(10).and_then(|v| v.checked_add(d)) {
            Some(v) => v,
            None => return Amount::MAX,
        };
    }
    value
}

/// Monetary amounts are whole rupiah stored as signed 64-bit integers.
/// The rupiah has no circulating subunit, so there is no scaling factor.
pub type Rupiah = i64;

/// Format an amount as a human-readable rupiah string with dot-separated
/// thousands groups. Example: 1500000 -> "Rp1.500.000", -2500 -> "-Rp2.500"
pub fn format_rupiah(amount: Rupiah) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}Rp{}", sign, grouped)
}

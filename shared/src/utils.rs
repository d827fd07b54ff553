// Number formatting shared by the engine and any UI binding.
// Display strings use `.` as decimal point and `,` as thousands separator.

pub mod number_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    pub const THOUSANDS_SEPARATOR: char = ',';

    /// Parses user text like "1,234.56". Blank input is zero.
    pub fn parse_formatted_number(s: &str) -> Result<f64> {
        let normalized: String = s.trim().chars().filter(|c| *c != THOUSANDS_SEPARATOR).collect();
        if normalized.is_empty() {
            return Ok(0.0);
        }
        // f64::from_str also accepts "inf", "NaN" and exponents; none of those are prices.
        if !normalized.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+')) {
            return Err(anyhow!("Failed to parse number '{}'", s));
        }
        let value = f64::from_str(&normalized).map_err(|e| anyhow!("Failed to parse number '{}': {}", s, e))?;
        // overlong digit strings overflow to infinity
        if !value.is_finite() {
            return Err(anyhow!("Number '{}' is out of range", s));
        }
        // normalizes -0.0
        Ok(value + 0.0)
    }

    /// Fixed-point with thousands grouping: `format_number(-1234.5, 2)` is "-1,234.50".
    pub fn format_number(value: f64, decimals: usize) -> String {
        let fixed = format!("{:.*}", decimals, value);
        let (sign, unsigned) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (unsigned, None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(THOUSANDS_SEPARATOR);
            }
            grouped.push(ch);
        }

        let rounds_to_zero = unsigned.chars().all(|c| c == '0' || c == '.');
        let sign = if rounds_to_zero { "" } else { sign };
        match frac_part {
            Some(frac) => format!("{}{}.{}", sign, grouped, frac),
            None => format!("{}{}", sign, grouped),
        }
    }

    /// Fixed-point without grouping, for machine-readable exports.
    pub fn format_plain(value: f64, decimals: usize) -> String {
        format_number(value, decimals).replace(THOUSANDS_SEPARATOR, "")
    }

}

/// Currency utility functions for Rial amounts.
///
/// All monetary values in the database are integer Rials (the gateway
/// deals in Rials as well), so there is no floating point anywhere in
/// the settlement path. Tomans only appear at the display edge.

/// Convert Tomans to Rials (multiply by 10)
pub fn toman_to_rial(toman: i64) -> i64 {
    toman * 10
}

/// Convert Rials to Tomans (divide by 10, truncating)
pub fn rial_to_toman(rial: i64) -> i64 {
    rial / 10
}

/// Format a Rial amount with thousands separators
pub fn format_rial(rial: i64) -> String {
    let negative = rial < 0;
    let digits = rial.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    if negative {
        format!("-{} IRR", grouped)
    } else {
        format!("{} IRR", grouped)
    }
}

/// Validate and parse an amount string to Rials
pub fn parse_amount_to_rial(amount_str: &str) -> Result<i64, String> {
    amount_str
        .trim()
        .parse::<i64>()
        .map_err(|_| "Invalid amount format".to_string())
        .and_then(|amount| {
            if amount <= 0 {
                Err("Amount must be positive".to_string())
            } else {
                Ok(amount)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toman_to_rial() {
        assert_eq!(toman_to_rial(100), 1000);
        assert_eq!(toman_to_rial(0), 0);
        assert_eq!(toman_to_rial(70_000), 700_000);
    }

    #[test]
    fn test_rial_to_toman() {
        assert_eq!(rial_to_toman(1000), 100);
        assert_eq!(rial_to_toman(15), 1);
    }

    #[test]
    fn test_format_rial() {
        assert_eq!(format_rial(1_000_000), "1,000,000 IRR");
        assert_eq!(format_rial(50), "50 IRR");
        assert_eq!(format_rial(-12345), "-12,345 IRR");
    }

    #[test]
    fn test_parse_amount_to_rial() {
        assert_eq!(parse_amount_to_rial("1000000"), Ok(1_000_000));
        assert_eq!(parse_amount_to_rial(" 500 "), Ok(500));
        assert_eq!(parse_amount_to_rial("0"), Err("Amount must be positive".to_string()));
        assert_eq!(parse_amount_to_rial("-100"), Err("Amount must be positive".to_string()));
        assert_eq!(parse_amount_to_rial("abc"), Err("Invalid amount format".to_string()));
    }
}

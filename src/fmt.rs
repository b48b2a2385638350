/// Format an amount with thousands separators in accounting style:
/// 1,234.56, with negatives parenthesized as (500.00), the same
/// convention bank statements use for debit columns.
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let grouped = group_thousands(val.abs());
    if negative {
        format!("({grouped})")
    } else {
        grouped
    }
}

fn group_thousands(abs: f64) -> String {
    let cents = format!("{abs:.2}");
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();
    format!("{with_commas}.{dec_part}")
}

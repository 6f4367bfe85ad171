/// Group digits in threes with `,`, as en-US locale formatting does.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The value shown to users: the formatted total, or `fallback` when it is zero.
pub fn display_total(total: u64, fallback: &str) -> String {
    if total > 0 {
        format_thousands(total)
    } else {
        fallback.to_string()
    }
}

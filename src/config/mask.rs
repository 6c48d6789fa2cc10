//! Secret masking for printed and logged configuration

/// Mask a token, secret or password
///
/// Values longer than 10 characters keep their first 6 and last 4,
/// 6 to 10 characters keep 3 and 2, 4 and 5 characters keep 1 and 2.
/// Anything shorter is fully masked.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let (head, tail) = match chars.len() {
        0 => return String::new(),
        n if n > 10 => (6, 4),
        n if n > 5 => (3, 2),
        n if n >= 4 => (1, 2),
        n => return "*".repeat(n),
    };

    let stars = chars.len() - head - tail;
    let mut masked: String = chars[..head].iter().collect();
    masked.push_str(&"*".repeat(stars));
    masked.extend(&chars[chars.len() - tail..]);
    masked
}

/// Mask the local part of an e-mail address, keeping its first 2 characters
pub fn mask_email(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) if local.chars().count() > 2 => {
            let head: String = local.chars().take(2).collect();
            let stars = "*".repeat(local.chars().count() - 2);
            format!("{}{}@{}", head, stars, domain)
        }
        Some(_) => address.to_string(),
        None => mask_secret(address),
    }
}

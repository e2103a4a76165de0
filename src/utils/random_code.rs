use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成指定长度的随机字母数字串
pub fn generate_random_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 生成满足密码策略的随机初始密码
pub fn generate_password(len: usize) -> String {
    const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
    const DIGITS: &[u8] = b"23456789";

    let len = len.max(8);
    let mut rng = rand::rng();
    let mut chars: Vec<char> = vec![
        UPPER[rng.random_range(0..UPPER.len())] as char,
        LOWER[rng.random_range(0..LOWER.len())] as char,
        DIGITS[rng.random_range(0..DIGITS.len())] as char,
    ];
    chars.extend(
        (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(len - 3)
            .map(char::from),
    );

    // 打乱顺序，避免固定前缀
    use rand::seq::SliceRandom;
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_code_length_and_charset() {
        let code = generate_random_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_random_code(32));
    }

    #[test]
    fn test_generated_password_passes_policy() {
        for _ in 0..20 {
            let pwd = generate_password(12);
            assert_eq!(pwd.len(), 12);
            assert!(validate_password(&pwd).is_valid, "{pwd}");
        }
    }
}

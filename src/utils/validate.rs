use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static REGISTRATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9./-]{1,32}$").expect("Invalid registration regex"));

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 姓名/名称：去除空白后 2..=120 个字符
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if !(2..=120).contains(&len) {
        return Err("Name must be between 2 and 120 characters");
    }
    Ok(())
}

/// 学号：字母、数字以及 `.`、`/`、`-`
pub fn validate_registration(registration: &str) -> Result<(), &'static str> {
    if !REGISTRATION_RE.is_match(registration) {
        return Err("Registration must be 1-32 letters, digits, '.', '/' or '-'");
    }
    Ok(())
}

/// 出生日期，格式 YYYY-MM-DD
pub fn validate_birth_date(date: &str) -> Result<(), &'static str> {
    let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| "Birth date must use the YYYY-MM-DD format")?;
    if parsed > chrono::Utc::now().date_naive() {
        return Err("Birth date cannot be in the future");
    }
    Ok(())
}

/// 校验 CNPJ（可带格式符号），包括两位校验码
pub fn validate_cnpj(cnpj: &str) -> Result<(), &'static str> {
    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();
    let allowed = cnpj.chars().all(|c| c.is_ascii_digit() || ".-/ ".contains(c));
    if !allowed || digits.len() != 14 {
        return Err("CNPJ must contain 14 digits");
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err("CNPJ is invalid");
    }

    let check_digit = |len: usize| -> u32 {
        let weights: &[u32] = if len == 12 {
            &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]
        } else {
            &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]
        };
        let sum: u32 = digits[..len].iter().zip(weights).map(|(d, w)| d * w).sum();
        match sum % 11 {
            0 | 1 => 0,
            r => 11 - r,
        }
    };

    if check_digit(12) != digits[12] || check_digit(13) != digits[13] {
        return Err("CNPJ check digits do not match");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 不在常见弱密码列表中
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = [
        "password1",
        "qwerty123",
        "admin123",
        "abcd1234",
        "senha123",
        "escola123",
        "mudar123",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("diretora@escola.com.br").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_name_length_counts_chars() {
        assert!(validate_name("Zé").is_ok());
        assert!(validate_name(" J ").is_err());
        assert!(validate_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn test_registration() {
        assert!(validate_registration("2025/0001-A").is_ok());
        assert!(validate_registration("").is_err());
        assert!(validate_registration("with space").is_err());
    }

    #[test]
    fn test_birth_date() {
        assert!(validate_birth_date("2012-03-09").is_ok());
        assert!(validate_birth_date("09/03/2012").is_err());
        assert!(validate_birth_date("2999-01-01").is_err());
    }

    #[test]
    fn test_cnpj() {
        assert!(validate_cnpj("11.222.333/0001-81").is_ok());
        assert!(validate_cnpj("11222333000181").is_ok());
        assert!(validate_cnpj("11.222.333/0001-82").is_err());
        assert!(validate_cnpj("00000000000000").is_err());
        assert!(validate_cnpj("1122233300018").is_err());
        assert!(validate_cnpj("11a22233300018").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("Aluno2025x").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_missing_classes() {
        let result = validate_password("abcdefgh");
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Senha123");
        assert!(!result.is_valid);
        assert_eq!(
            result.error_message(),
            "Password is too common, please choose a stronger password"
        );
    }
}

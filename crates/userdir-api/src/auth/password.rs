//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱, 검증 및 복잡도 정책.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 솔트는 호출마다 새로 생성되어 해시 문자열에 포함됩니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 해시와 입력된 비밀번호를 비교합니다.
/// 해시 형식이 깨져 있어도 에러를 내지 않고 `false`를 반환합니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::debug!("저장된 비밀번호 해시 형식이 유효하지 않음");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 해싱을 blocking 풀에서 수행.
///
/// Argon2는 CPU 바운드이므로 런타임 워커에서 직접 돌리면 같은 워커의
/// 다른 요청이 밀립니다.
pub async fn hash_password_blocking(password: String) -> userdir_core::AuthResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| userdir_core::AuthError::Internal(format!("해싱 작업 join 실패: {}", e)))?
        .map_err(|e| userdir_core::AuthError::Internal(e.to_string()))
}

/// 검증을 blocking 풀에서 수행.
pub async fn verify_password_blocking(
    password: String,
    hash: String,
) -> userdir_core::AuthResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| userdir_core::AuthError::Internal(format!("검증 작업 join 실패: {}", e)))
}

/// 비밀번호 복잡도 검증.
///
/// 최소 요구사항을 충족하는지 확인합니다.
///
/// # 요구사항
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 소문자 포함
/// - 최소 1개의 대문자 포함
pub fn check_complexity(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "TestPassword123!";
        let hash = hash_password(password).unwrap();

        // 해시 형식 확인 (argon2id)
        assert!(hash.starts_with("$argon2id$"));

        // 올바른 비밀번호 검증
        assert!(verify_password(password, &hash));

        // 잘못된 비밀번호 검증
        assert!(!verify_password("WrongPassword123!", &hash));
    }

    #[test]
    fn test_different_passwords_different_hashes() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        // 같은 비밀번호라도 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);

        // 하지만 둘 다 검증 가능
        assert!(verify_password("Password1", &hash1));
        assert!(verify_password("Password1", &hash2));
    }

    #[test]
    fn test_invalid_hash_format_is_false_not_error() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_complexity() {
        // 유효한 비밀번호
        assert!(check_complexity("Password1"));
        assert!(check_complexity("Complex!Pass99"));

        // 너무 짧음
        assert!(!check_complexity("Pass1"));

        // 숫자 없음
        assert!(!check_complexity("PasswordX"));

        // 대문자 없음
        assert!(!check_complexity("password1"));

        // 소문자 없음
        assert!(!check_complexity("PASSWORD1"));

        // 빈 문자열
        assert!(!check_complexity(""));
    }

    #[test]
    fn test_unicode_password_hashes() {
        // 유니코드 비밀번호도 해싱 가능 (복잡도와는 별개)
        let password = "한글패스워드123aA";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash));
    }

    proptest! {
        // 복잡도 판정은 정확히 (길이 ≥ 8 ∧ 숫자 ∧ 소문자 ∧ 대문자)와 일치해야 함
        #[test]
        fn prop_complexity_matches_rules(password in "\\PC{0,24}") {
            let expected = password.chars().count() >= 8
                && password.chars().any(|c| c.is_ascii_digit())
                && password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_uppercase());

            prop_assert_eq!(check_complexity(&password), expected);
        }
    }
}

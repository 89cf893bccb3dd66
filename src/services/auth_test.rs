use super::*;

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Alice@Example.COM "), Some("alice@example.com".into()));
}

#[test]
fn normalize_email_rejects_malformed_addresses() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("alice@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn generate_salt_is_hex_and_unique() {
    let a = generate_salt();
    let b = generate_salt();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[test]
fn hash_password_depends_on_both_inputs() {
    let salt = generate_salt();
    let hash = hash_password("hunter22hunter22", &salt);
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, hash_password("hunter22hunter22", &salt));
    assert_ne!(hash, hash_password("other-password!", &salt));
    assert_ne!(hash, hash_password("hunter22hunter22", &generate_salt()));
}

#[test]
fn name_from_email_falls_back_to_user() {
    assert_eq!(name_from_email("alice@example.com"), "alice");
    assert_eq!(name_from_email("@example.com"), "user");
}

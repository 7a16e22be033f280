// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Role, UserId, UserStatus, normalize_email, validate_display_name};

#[test]
fn test_role_parsing_is_case_insensitive() {
    assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(" client ".parse::<Role>().unwrap(), Role::Client);
    assert!(matches!(
        "owner".parse::<Role>(),
        Err(DomainError::InvalidRole(_))
    ));
}

#[test]
fn test_user_status_toggle() {
    assert_eq!(UserStatus::Active.toggled(), UserStatus::Disabled);
    assert_eq!(UserStatus::Disabled.toggled(), UserStatus::Active);
}

#[test]
fn test_email_is_normalized() {
    assert_eq!(
        normalize_email("  Ana@Example.COM ").unwrap(),
        "ana@example.com"
    );
    assert!(normalize_email("ana.example.com").is_err());
    assert!(normalize_email("@example.com").is_err());
    assert!(normalize_email("ana@localhost").is_err());
    assert!(normalize_email("ana@a@b.com").is_err());
}

#[test]
fn test_display_name_bounds() {
    assert_eq!(validate_display_name(" Ana ").unwrap(), "Ana");
    assert!(validate_display_name("   ").is_err());
    assert!(validate_display_name(&"x".repeat(121)).is_err());
}

#[test]
fn test_generated_ids_are_unique() {
    let a: UserId = UserId::generate();
    let b: UserId = UserId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

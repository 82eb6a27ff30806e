//! Tests for the domain user model.

use super::*;
use rstest::rstest;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[rstest]
#[case("test@EXAMPLE.com", "test@example.com")]
#[case("Test2@Example.com", "Test2@example.com")]
#[case("TEST3@EXAMPLE.COM", "TEST3@example.com")]
#[case("  padded@Example.ORG  ", "padded@example.org")]
#[case("first@second@EXAMPLE.com", "first@second@example.com")]
fn email_domain_is_lower_cased(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::MalformedEmail)]
#[case("@example.com", UserValidationError::MalformedEmail)]
#[case("user@", UserValidationError::MalformedEmail)]
#[case("user@exa mple.com", UserValidationError::MalformedEmail)]
fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = EmailAddress::new(raw).expect_err("invalid email must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn overlong_email_is_rejected() {
    let raw = format!("{}@example.com", "a".repeat(USER_FIELD_MAX));
    let err = EmailAddress::new(raw).expect_err("overlong email must fail");
    assert_eq!(
        err,
        UserValidationError::EmailTooLong {
            max: USER_FIELD_MAX
        }
    );
}

#[rstest]
fn email_deserialisation_normalises() {
    let email: EmailAddress =
        serde_json::from_str("\"Ada@EXAMPLE.com\"").expect("deserialise email");
    assert_eq!(email.as_ref(), "Ada@example.com");
}

#[rstest]
fn user_id_round_trips_canonical_form() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(id.to_string(), VALID_ID);
}

#[rstest]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[case("")]
fn user_id_rejects_invalid_input(#[case] raw: &str) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
fn user_name_may_be_empty_but_not_overlong() {
    let empty = UserName::new("").expect("empty names are allowed");
    assert!(empty.is_blank());

    let err = UserName::new("n".repeat(USER_FIELD_MAX + 1)).expect_err("overlong name");
    assert_eq!(
        err,
        UserValidationError::NameTooLong {
            max: USER_FIELD_MAX
        }
    );
}

#[rstest]
fn default_flags_describe_a_regular_user() {
    let flags = UserFlags::default();
    assert!(flags.is_active);
    assert!(!flags.is_staff);
    assert!(!flags.is_superuser);
}

#[rstest]
fn superuser_flags_grant_staff_and_superuser() {
    let user = User::new(
        UserId::random(),
        EmailAddress::new("root@example.com").expect("email"),
        UserName::default(),
        None,
        UserFlags::superuser(),
    );
    assert!(user.is_staff());
    assert!(user.is_superuser());
    assert!(user.password_hash().is_none());
}

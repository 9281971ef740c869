use super::*;
use crate::types::User;

fn signed_in(role: Option<&str>) -> Session {
    Session {
        token: Some("t1".into()),
        user: Some(User { id: "1".into(), name: None, email: None, role: role.map(str::to_owned), suspended: None }),
        role: role.map(str::to_owned),
        loading: false,
        ..Session::default()
    }
}

#[test]
fn pending_while_loading_even_with_token() {
    let mut session = signed_in(Some("admin"));
    session.loading = true;
    let decision = decide(&session, &RoleSet::default());
    assert_eq!(decision, GateDecision::Pending);
    assert_eq!(redirect_target(&decision), None);
}

#[test]
fn default_session_is_pending() {
    assert_eq!(decide(&Session::default(), &RoleSet::default()), GateDecision::Pending);
}

#[test]
fn anonymous_when_settled_without_token() {
    let session = Session { loading: false, ..Session::default() };
    let decision = decide(&session, &RoleSet::default());
    assert_eq!(decision, GateDecision::Anonymous);
    assert_eq!(redirect_target(&decision), Some("/login"));
}

#[test]
fn granted_for_elevated_roles() {
    for role in ["admin", "superadmin"] {
        let decision = decide(&signed_in(Some(role)), &RoleSet::default());
        assert_eq!(decision, GateDecision::Granted { role: role.to_owned() });
        assert_eq!(redirect_target(&decision), None);
    }
}

#[test]
fn unrecognized_role_is_invalid_not_anonymous() {
    let decision = decide(&signed_in(Some("customer")), &RoleSet::default());
    assert_eq!(decision, GateDecision::InvalidRole { role: Some("customer".into()) });
    assert_eq!(redirect_target(&decision), Some("/invalid-role"));
}

#[test]
fn missing_role_is_invalid() {
    assert_eq!(decide(&signed_in(None), &RoleSet::default()), GateDecision::InvalidRole { role: None });
}

#[test]
fn custom_role_set() {
    let roles = RoleSet::new(["editor"]);
    assert!(roles.contains("editor"));
    assert!(!roles.contains("admin"));
    assert_eq!(
        decide(&signed_in(Some("editor")), &roles),
        GateDecision::Granted { role: "editor".into() }
    );
    assert!(matches!(decide(&signed_in(Some("admin")), &roles), GateDecision::InvalidRole { .. }));
}

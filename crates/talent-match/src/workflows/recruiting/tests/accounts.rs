use super::common::*;
use crate::workflows::recruiting::domain::{Actor, Role, UserDraft, UserId};
use crate::workflows::recruiting::service::ServiceError;

fn draft(name: &str, email: &str, role: Role) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

#[test]
fn admin_lists_every_user_newest_first() {
    let (service, _) = accounts();

    let users = service.list_users(&admin()).expect("admin lists users");
    let ids: Vec<&str> = users.iter().map(|user| user.id.0.as_str()).collect();
    assert_eq!(ids, vec!["cand-1", "rec-1", "admin-1"]);
}

#[test]
fn other_roles_only_see_their_own_account() {
    let (service, _) = accounts();

    let listed = service.list_users(&recruiter()).expect("recruiter lists users");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, recruiter().id);

    assert!(service.get_user(&candidate(), &candidate().id).is_ok());
    assert!(matches!(
        service.get_user(&candidate(), &recruiter().id),
        Err(ServiceError::Forbidden(_))
    ));
}

#[test]
fn unknown_user_is_not_found() {
    let (service, _) = accounts();
    let missing = UserId("user-missing".to_string());

    assert!(matches!(
        service.get_user(&admin(), &missing),
        Err(ServiceError::NotFound { entity: "user", .. })
    ));
    assert!(matches!(
        service.update_user_role(&admin(), &missing, Role::Recruiter),
        Err(ServiceError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn only_admins_change_roles() {
    let (service, users) = accounts();

    let self_promotion = service.update_user_role(&candidate(), &candidate().id, Role::Admin);
    assert!(matches!(self_promotion, Err(ServiceError::Forbidden(_))));
    let by_recruiter = service.update_user_role(&recruiter(), &candidate().id, Role::Recruiter);
    assert!(matches!(by_recruiter, Err(ServiceError::Forbidden(_))));
    assert_eq!(users.stored(&candidate().id).role, Role::Candidate);

    let promoted = service
        .update_user_role(&admin(), &candidate().id, Role::Recruiter)
        .expect("admin changes role");
    assert_eq!(promoted.role, Role::Recruiter);
    assert_eq!(users.stored(&candidate().id).role, Role::Recruiter);

    // The acting identity is rebuilt from the stored record on the next request.
    let acting = Actor::from(&users.stored(&candidate().id));
    assert_eq!(acting.role, Role::Recruiter);
    assert_eq!(acting.name, candidate().name);
}

#[test]
fn registration_is_admin_only_and_normalizes_email() {
    let (service, _) = accounts();

    let refused = service.create_user(
        &recruiter(),
        draft("Nina Nouvelle", "nina@example.com", Role::Recruiter),
    );
    assert!(matches!(refused, Err(ServiceError::Forbidden(_))));

    let created = service
        .create_user(
            &admin(),
            draft(" Nina Nouvelle ", "  Nina@Example.COM ", Role::Recruiter),
        )
        .expect("admin registers user");
    assert_eq!(created.name, "Nina Nouvelle");
    assert_eq!(created.email, "nina@example.com");
    assert!(created.id.0.starts_with("user-"));
    assert_eq!(
        service.get_user(&admin(), &created.id).expect("stored"),
        created
    );
}

#[test]
fn registration_validates_and_rejects_duplicate_email() {
    let (service, _) = accounts();

    assert!(matches!(
        service.create_user(&admin(), draft(" ", "x@example.com", Role::Candidate)),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service.create_user(&admin(), draft("No Mail", "not-an-email", Role::Candidate)),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service.create_user(&admin(), draft("Alice Bis", "ALICE@example.com", Role::Candidate)),
        Err(ServiceError::Repository(_))
    ));
}

//! Group catalog, subscription menu and direct links.
mod common;

use broadcast_bot::bot::commands::start::{home_menu, subscribe_text};
use broadcast_bot::core::directory::{Directory, DirectoryError, Role, UserId};
use common::{ADMIN_SECRET, SUPERADMIN_SECRET, harness};
use teloxide::types::InlineKeyboardButtonKind;

fn button_labels(dir: &mut Directory, id: UserId) -> Vec<String> {
    let (_, keyboard) = home_menu(dir, id);
    keyboard
        .inline_keyboard
        .into_iter()
        .flatten()
        .filter(|b| matches!(b.kind, InlineKeyboardButtonKind::CallbackData(_)))
        .map(|b| b.text)
        .collect()
}

#[test]
fn first_contact_lands_in_news() {
    let mut h = harness();
    let (user, created) = h.dir.register_or_get(42);
    assert!(created);
    assert_eq!(user.role(), Role::User);
    assert!(user.is_subscribed("news"));

    let (_, created) = h.dir.register_or_get(42);
    assert!(!created);
    assert_eq!(h.dir.recipients("news"), vec![42]);
}

#[test]
fn private_group_is_hidden_but_reachable_by_link() {
    let mut h = harness();
    h.dir.promote_to_admin(1, ADMIN_SECRET).unwrap();
    h.dir.create_group("VIP", "vip_private").unwrap();
    h.dir.create_group("Events", "events").unwrap();

    let public: Vec<_> = h.dir.public_groups().iter().map(|g| g.id().to_string()).collect();
    assert_eq!(public, vec!["news", "events"]);

    let labels = button_labels(&mut h.dir, 7);
    assert_eq!(labels.len(), 2);
    assert!(labels.iter().all(|l| !l.contains("VIP")));

    let reply = subscribe_text(&mut h.dir, 7, "vip_private");
    assert!(reply.contains("<b>VIP</b>"));
    assert!(h.dir.user(7).unwrap().is_subscribed("vip_private"));

    // Still hidden from the menu even once subscribed.
    assert!(button_labels(&mut h.dir, 7).iter().all(|l| !l.contains("VIP")));
    assert_eq!(h.dir.recipients("vip_private"), vec![1, 7]);
}

#[test]
fn subscribing_twice_is_reported() {
    let mut h = harness();
    h.dir.create_group("Events", "events").unwrap();

    assert!(h.dir.subscribe(3, "events").is_ok());
    assert_eq!(
        h.dir.subscribe(3, "events").unwrap_err(),
        DirectoryError::AlreadySubscribed("events".into())
    );
    assert_eq!(
        h.dir.subscribe(3, "news").unwrap_err(),
        DirectoryError::AlreadySubscribed("news".into())
    );
    assert!(subscribe_text(&mut h.dir, 3, "events").contains("already subscribed"));
}

#[test]
fn unknown_group_changes_nothing() {
    let mut h = harness();
    h.dir.register_or_get(3);

    assert_eq!(
        h.dir.subscribe(3, "ghost").unwrap_err(),
        DirectoryError::NoSuchGroup("ghost".into())
    );
    assert_eq!(h.dir.group_names_of(3), vec!["News".to_string()]);
}

#[test]
fn group_ids_are_validated_and_unique() {
    let mut h = harness();
    assert!(matches!(
        h.dir.create_group("Bad", "has space"),
        Err(DirectoryError::InvalidGroupId(_))
    ));
    assert!(matches!(
        h.dir.create_group("Bad", ""),
        Err(DirectoryError::InvalidGroupId(_))
    ));
    assert!(matches!(
        h.dir.create_group("Again", "news"),
        Err(DirectoryError::GroupExists(_))
    ));
    assert_eq!(h.dir.all_groups().len(), 1);
}

#[test]
fn recipients_follow_target_or_news() {
    let mut h = harness();
    h.dir.create_group("Events", "events").unwrap();
    h.dir.subscribe(10, "events").unwrap();
    h.dir.register_or_get(11);

    // Everyone is in news, so a targeted broadcast still reaches 11.
    assert_eq!(h.dir.recipients("events"), vec![10, 11]);
    assert_eq!(h.dir.recipients("news"), vec![10, 11]);
}

#[test]
fn role_promotion_rules() {
    let mut h = harness();

    assert_eq!(
        h.dir.promote_to_admin(5, "nope"),
        Err(DirectoryError::WrongSecret)
    );
    assert_eq!(
        h.dir.promote_to_superadmin(5, SUPERADMIN_SECRET),
        Err(DirectoryError::NotAuthorized(Role::Admin))
    );

    assert_eq!(h.dir.promote_to_admin(5, ADMIN_SECRET), Ok(Role::Admin));
    assert_eq!(
        h.dir.promote_to_superadmin(5, SUPERADMIN_SECRET),
        Ok(Role::Superadmin)
    );
    // The admin password never demotes a superadmin.
    assert_eq!(h.dir.promote_to_admin(5, ADMIN_SECRET), Ok(Role::Superadmin));
    assert_eq!(h.dir.superadmins(), vec![5]);
}

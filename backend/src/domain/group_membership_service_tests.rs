//! Tests for the group membership service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockGroupRepository, MockTaxpayerRepository};
use crate::domain::service_test_support::{fixture_clock, fixture_timestamp, group, taxpayer};

fn service(
    groups: MockGroupRepository,
    taxpayers: MockTaxpayerRepository,
) -> GroupMembershipService<MockGroupRepository, MockTaxpayerRepository> {
    GroupMembershipService::new(Arc::new(groups), Arc::new(taxpayers), fixture_clock())
}

#[rstest]
#[tokio::test]
async fn create_group_derives_slug_and_timestamps() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_slug()
        .withf(|slug| slug == "grupo-norte")
        .times(1)
        .return_once(|_| Ok(None));
    groups
        .expect_create()
        .withf(|group| {
            group.name == "Grupo Norte" && group.slug == "grupo-norte" && group.member_ids.is_empty()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let created = service(groups, MockTaxpayerRepository::new())
        .create_group("  Grupo Norte ")
        .await
        .expect("group created");

    assert_eq!(created.slug, "grupo-norte");
    assert_eq!(created.created_at, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn create_group_rejects_existing_slug() {
    let existing = group("Grupo Norte");
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_slug()
        .return_once(move |_| Ok(Some(existing)));
    groups.expect_create().times(0);

    let err = service(groups, MockTaxpayerRepository::new())
        .create_group("  grupo   norte  ")
        .await
        .expect_err("duplicate slug");

    assert_eq!(err.code(), ErrorCode::Conflict);
    let details = err.details().expect("details");
    assert_eq!(details["code"], "duplicate_slug");
    assert_eq!(details["slug"], "grupo-norte");
}

#[rstest]
#[tokio::test]
async fn create_group_maps_insert_race_to_conflict() {
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_slug().return_once(|_| Ok(None));
    groups
        .expect_create()
        .return_once(|_| Err(GroupRepositoryError::duplicate_slug("grupo-norte")));

    let err = service(groups, MockTaxpayerRepository::new())
        .create_group("Grupo Norte")
        .await
        .expect_err("race lost");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case("")]
#[case("    ")]
#[tokio::test]
async fn create_group_rejects_blank_names(#[case] name: &str) {
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_slug().times(0);

    let err = service(groups, MockTaxpayerRepository::new())
        .create_group(name)
        .await
        .expect_err("blank name");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["code"], "empty_name");
}

#[rstest]
#[tokio::test]
async fn assign_client_requires_existing_client() {
    let mut taxpayers = MockTaxpayerRepository::new();
    taxpayers.expect_find_by_id().return_once(|_| Ok(None));
    let mut groups = MockGroupRepository::new();
    groups.expect_assign_client().times(0);

    let err = service(groups, taxpayers)
        .assign_client(&ClientId::random(), &GroupId::random())
        .await
        .expect_err("unknown client");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn assign_client_requires_existing_group() {
    let client = taxpayer("ABC010101AAA", None);
    let mut taxpayers = MockTaxpayerRepository::new();
    taxpayers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(client)));
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_id().return_once(|_| Ok(None));
    groups.expect_assign_client().times(0);

    let err = service(groups, taxpayers)
        .assign_client(&ClientId::random(), &GroupId::random())
        .await
        .expect_err("unknown group");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.details().expect("details")["code"], "group_not_found");
}

#[rstest]
#[tokio::test]
async fn assign_client_returns_updated_record() {
    let target = group("Grupo Sur");
    let group_id = target.id.clone();
    let before = taxpayer("ABC010101AAA", None);
    let client_id = before.id.clone();
    let after = Taxpayer {
        group_id: Some(group_id.clone()),
        ..before.clone()
    };

    let mut taxpayers = MockTaxpayerRepository::new();
    let mut reads = vec![after, before];
    taxpayers
        .expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(reads.pop()));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));
    groups
        .expect_assign_client()
        .with(eq(client_id.clone()), eq(group_id.clone()))
        .times(1)
        .return_once(|_, _| Ok(()));

    let updated = service(groups, taxpayers)
        .assign_client(&client_id, &group_id)
        .await
        .expect("assigned");

    assert_eq!(updated.group_id, Some(group_id));
}

#[rstest]
#[tokio::test]
async fn remove_non_member_is_a_noop_success() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_remove_client()
        .times(1)
        .return_once(|_, _| Ok(false));

    service(groups, MockTaxpayerRepository::new())
        .remove_client(&ClientId::random(), &GroupId::random())
        .await
        .expect("no-op");
}

#[rstest]
#[tokio::test]
async fn add_clients_collects_failures() {
    let target = group("Grupo Norte");
    let group_id = target.id.clone();
    let ok = ClientId::random();
    let missing = ClientId::random();
    let missing_for_mock = missing.clone();

    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));
    groups
        .expect_assign_client()
        .times(2)
        .returning(move |client_id, _| {
            if client_id == &missing_for_mock {
                Err(GroupRepositoryError::client_not_found(client_id.to_string()))
            } else {
                Ok(())
            }
        });

    let outcome = service(groups, MockTaxpayerRepository::new())
        .add_clients(&group_id, &[ok, missing.clone()])
        .await
        .expect("bulk add");

    assert_eq!(outcome.assigned, 1);
    assert_eq!(outcome.failed, vec![missing]);
}

#[rstest]
#[tokio::test]
async fn delete_group_with_client_users_is_conflict() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_delete()
        .return_once(|group_id| Err(GroupRepositoryError::group_has_users(group_id.to_string())));

    let err = service(groups, MockTaxpayerRepository::new())
        .delete_group(&GroupId::random())
        .await
        .expect_err("users still reference group");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.details().expect("details")["code"],
        "group_has_client_users"
    );
}

#[rstest]
#[tokio::test]
async fn filter_selects_member_query() {
    let target = group("Grupo Norte");
    let group_id = target.id.clone();
    let member = taxpayer("ABC010101AAA", Some(group_id.clone()));
    let stray = taxpayer("XYZ020202BBB", None);

    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));
    let mut taxpayers = MockTaxpayerRepository::new();
    taxpayers
        .expect_list_members()
        .with(eq(group_id.clone()))
        .return_once(move |_| Ok(vec![member]));
    taxpayers
        .expect_list_ungrouped()
        .return_once(move || Ok(vec![stray]));

    let directory = service(groups, taxpayers);
    let members = directory
        .clients_for_filter(&GroupFilter::Group { group_id })
        .await
        .expect("members");
    let ungrouped = directory
        .clients_for_filter(&GroupFilter::Ungrouped)
        .await
        .expect("ungrouped");

    assert_eq!(members[0].rfc.as_ref(), "ABC010101AAA");
    assert_eq!(ungrouped[0].rfc.as_ref(), "XYZ020202BBB");
}

#[rstest]
#[case(TaxpayerRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(TaxpayerRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn list_clients_maps_repository_errors(
    #[case] failure: TaxpayerRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut taxpayers = MockTaxpayerRepository::new();
    taxpayers.expect_list_all().return_once(move || Err(failure));

    let err = service(MockGroupRepository::new(), taxpayers)
        .list_clients()
        .await
        .expect_err("repository failure");

    assert_eq!(err.code(), expected);
}

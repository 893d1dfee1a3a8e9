//! Diesel repositories against embedded PostgreSQL.
//!
//! Covers the transactional writes: group reassignment keeping both sides of
//! the membership in step, group deletion, and upload logging with its client
//! update. Each test runs on a freshly migrated database.

use chrono::Utc;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;
use uuid::Uuid;

use pg_embedded_setup_unpriv::TestCluster;
use satisfacture::domain::ports::{
    GroupRepository, GroupRepositoryError, TaxpayerRepository, UploadLogRepository, UserRepository,
};
use satisfacture::domain::{
    ClientId, ClientUploadUpdate, Group, GroupId, NewUploadLogEntry, Rfc, Role, UserAccount, UserId,
    Username,
};
use satisfacture::outbound::persistence::{
    DbPool, DieselGroupRepository, DieselTaxpayerRepository, DieselUploadLogRepository,
    DieselUserRepository, PoolConfig, run_pending_migrations,
};

mod support;

use support::pg_embed::test_cluster;
use support::{format_postgres_error, handle_cluster_setup_failure, reset_database};

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    database_url: String,
    groups: DieselGroupRepository,
    clients: DieselTaxpayerRepository,
    uploads: DieselUploadLogRepository,
    users: DieselUserRepository,
}

impl TestContext {
    fn new_group(&self, name: &str) -> Group {
        let group = Group {
            id: GroupId::random(),
            name: name.to_owned(),
            slug: name.to_lowercase().replace(' ', "-"),
            member_ids: Vec::new(),
            created_at: Utc::now(),
        };
        self.runtime
            .block_on(self.groups.create(&group))
            .expect("create group");
        group
    }

    fn new_client(&self, rfc: &str, group: Option<&GroupId>) -> ClientId {
        let id = Uuid::new_v4();
        let group = group.map(|group| *group.as_uuid());
        let mut client = Client::connect(&self.database_url, NoTls).expect("connect");
        client
            .execute(
                "INSERT INTO clients (id, rfc, legal_name, group_id) VALUES ($1, $2, 'Original SA', $3)",
                &[&id, &rfc, &group],
            )
            .map_err(|err| format_postgres_error(&err))
            .expect("insert client");
        if let Some(group) = group {
            client
                .execute(
                    "UPDATE groups SET member_ids = array_append(member_ids, $1) WHERE id = $2",
                    &[&id, &group],
                )
                .expect("record membership");
        }
        ClientId::from_uuid(id)
    }

    fn members_of(&self, group: &GroupId) -> Vec<ClientId> {
        self.runtime
            .block_on(self.groups.find_by_id(group))
            .expect("find group")
            .expect("group exists")
            .member_ids
    }

    fn upload_count(&self, rfc: &str) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls).expect("connect");
        client
            .query_one("SELECT COUNT(*) FROM uploads WHERE rfc = $1", &[&rfc])
            .expect("count uploads")
            .get(0)
    }
}

fn setup_context() -> Result<TestContext, String> {
    const TEST_DB: &str = "satisfacture_repositories_test";

    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let connection = cluster.connection();
    reset_database(&connection.database_url("postgres"), TEST_DB)?;
    let database_url = connection.database_url(TEST_DB);
    runtime
        .block_on(run_pending_migrations(database_url.clone()))
        .map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url).with_max_size(4);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        database_url,
        groups: DieselGroupRepository::new(pool.clone()),
        clients: DieselTaxpayerRepository::new(pool.clone()),
        uploads: DieselUploadLogRepository::new(pool.clone()),
        users: DieselUserRepository::new(pool),
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn upload_entry(rfc: &str, group: Option<&GroupId>) -> NewUploadLogEntry {
    NewUploadLogEntry {
        rfc: Rfc::new(rfc).expect("rfc"),
        uploader_username: "cliente.norte".to_owned(),
        uploader_name: Some("Ana Pérez".to_owned()),
        group_id: group.cloned(),
        consent_registered: true,
        status_code: 200,
        api_payload: json!({ "ok": true }),
        created_at: Utc::now(),
    }
}

#[rstest]
fn reassignment_moves_the_client_between_member_lists(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let south = ctx.new_group("Grupo Sur");
    let client = ctx.new_client("ABC010101AAA", None);

    ctx.runtime
        .block_on(ctx.groups.assign_client(&client, &north.id))
        .expect("first assignment");
    ctx.runtime
        .block_on(ctx.groups.assign_client(&client, &south.id))
        .expect("reassignment");

    assert!(ctx.members_of(&north.id).is_empty());
    assert_eq!(ctx.members_of(&south.id), vec![client.clone()]);
    let stored = ctx
        .runtime
        .block_on(ctx.clients.find_by_id(&client))
        .expect("find client")
        .expect("client exists");
    assert_eq!(stored.group_id, Some(south.id));
}

#[rstest]
fn assigning_to_a_missing_group_changes_nothing(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let client = ctx.new_client("ABC010101AAA", Some(&north.id));

    let err = ctx
        .runtime
        .block_on(ctx.groups.assign_client(&client, &GroupId::random()))
        .expect_err("unknown group");

    assert!(matches!(err, GroupRepositoryError::GroupNotFound { .. }));
    assert_eq!(ctx.members_of(&north.id), vec![client]);
}

#[rstest]
fn delete_is_refused_while_client_users_reference_the_group(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let account = UserAccount {
        id: UserId::random(),
        username: Username::new("cliente.norte").expect("username"),
        role: Role::Client,
        active: true,
        group_id: Some(north.id.clone()),
        created_at: Utc::now(),
    };
    ctx.runtime
        .block_on(ctx.users.create(&account, "$argon2id$stub"))
        .expect("create user");

    let err = ctx
        .runtime
        .block_on(ctx.groups.delete(&north.id))
        .expect_err("users still reference the group");

    assert!(matches!(err, GroupRepositoryError::GroupHasUsers { .. }));
    let still_there = ctx
        .runtime
        .block_on(ctx.groups.find_by_id(&north.id))
        .expect("find group");
    assert!(still_there.is_some());
}

#[rstest]
fn delete_detaches_member_clients(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let first = ctx.new_client("ABC010101AAA", Some(&north.id));
    let second = ctx.new_client("XAXX010101000", Some(&north.id));

    ctx.runtime
        .block_on(ctx.groups.delete(&north.id))
        .expect("delete group");

    let ungrouped = ctx
        .runtime
        .block_on(ctx.clients.list_ungrouped())
        .expect("list ungrouped");
    let ids: Vec<ClientId> = ungrouped.into_iter().map(|client| client.id).collect();
    assert!(ids.contains(&first));
    assert!(ids.contains(&second));
    let gone = ctx
        .runtime
        .block_on(ctx.groups.find_by_id(&north.id))
        .expect("find group");
    assert!(gone.is_none());
}

#[rstest]
fn upload_logs_once_renames_and_adopts_the_uploader_group(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let client = ctx.new_client("ABC010101AAA", None);
    let update = ClientUploadUpdate {
        rfc: Rfc::new("ABC010101AAA").expect("rfc"),
        legal_name: Some("Comercial Norte SA".to_owned()),
        group_id: Some(north.id.clone()),
    };

    let recorded = ctx
        .runtime
        .block_on(
            ctx.uploads
                .record(&upload_entry("ABC010101AAA", Some(&north.id)), Some(&update)),
        )
        .expect("record upload");

    assert_eq!(ctx.upload_count("ABC010101AAA"), 1);
    assert_eq!(recorded.entry.status_code, 200);
    let stored = recorded.client.expect("client returned");
    assert_eq!(stored.legal_name.as_deref(), Some("Comercial Norte SA"));
    assert_eq!(stored.group_id, Some(north.id.clone()));
    assert_eq!(ctx.members_of(&north.id), vec![client]);
}

#[rstest]
fn upload_keeps_an_existing_group(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let north = ctx.new_group("Grupo Norte");
    let south = ctx.new_group("Grupo Sur");
    let client = ctx.new_client("ABC010101AAA", Some(&north.id));
    let update = ClientUploadUpdate {
        rfc: Rfc::new("ABC010101AAA").expect("rfc"),
        legal_name: None,
        group_id: Some(south.id.clone()),
    };

    let recorded = ctx
        .runtime
        .block_on(
            ctx.uploads
                .record(&upload_entry("ABC010101AAA", Some(&south.id)), Some(&update)),
        )
        .expect("record upload");

    let stored = recorded.client.expect("client returned");
    assert_eq!(stored.group_id, Some(north.id.clone()));
    assert_eq!(stored.legal_name.as_deref(), Some("Original SA"));
    assert_eq!(ctx.members_of(&north.id), vec![client]);
    assert!(ctx.members_of(&south.id).is_empty());
}

#[rstest]
fn upload_for_an_unregistered_rfc_only_logs(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let update = ClientUploadUpdate {
        rfc: Rfc::new("XAXX010101000").expect("rfc"),
        legal_name: Some("Nadie SA".to_owned()),
        group_id: None,
    };

    let recorded = ctx
        .runtime
        .block_on(
            ctx.uploads
                .record(&upload_entry("XAXX010101000", None), Some(&update)),
        )
        .expect("record upload");

    assert!(recorded.client.is_none());
    assert_eq!(ctx.upload_count("XAXX010101000"), 1);
}

#[rstest]
fn legacy_rfcs_are_still_listed(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let legacy = ctx.new_client("ABCD0101011", None);

    let listed = ctx
        .runtime
        .block_on(ctx.clients.list_all())
        .expect("list clients");

    let found = listed
        .iter()
        .find(|client| client.id == legacy)
        .expect("legacy client listed");
    assert_eq!(found.rfc.as_ref(), "ABCD0101011");
}

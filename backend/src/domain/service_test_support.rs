//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    ClientId, Group, GroupId, GroupName, Principal, Rfc, Role, Taxpayer, UserAccount, UserId,
    Username,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn rfc(raw: &str) -> Rfc {
    Rfc::new(raw).expect("valid rfc")
}

pub(crate) fn taxpayer(raw_rfc: &str, group_id: Option<GroupId>) -> Taxpayer {
    Taxpayer {
        id: ClientId::random(),
        rfc: rfc(raw_rfc),
        legal_name: None,
        group_id,
    }
}

pub(crate) fn group(name: &str) -> Group {
    let name = GroupName::new(name).expect("valid group name");
    Group {
        id: GroupId::random(),
        name: name.as_ref().to_owned(),
        slug: name.slug().to_owned(),
        member_ids: Vec::new(),
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn account(username: &str, role: Role, group_id: Option<GroupId>) -> UserAccount {
    UserAccount {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        role,
        active: true,
        group_id,
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn principal(role: Role) -> Principal {
    let group_id = match role {
        Role::Admin => None,
        Role::Client => Some(GroupId::random()),
    };
    Principal::from(&account("ana", role, group_id))
}

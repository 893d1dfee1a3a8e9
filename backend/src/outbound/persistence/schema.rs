//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When migrations
//! change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Client groups with their denormalised member list.
    groups (id) {
        id -> Uuid,
        name -> Varchar,
        /// Unique, derived from the name at creation.
        slug -> Varchar,
        /// Ids of clients whose `group_id` references this group.
        member_ids -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Taxpayers registered by RFC.
    clients (id) {
        id -> Uuid,
        rfc -> Varchar,
        legal_name -> Nullable<Text>,
        group_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Console accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        role -> Varchar,
        active -> Bool,
        /// Required for client-role accounts, absent for admins.
        group_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only certificate upload audit trail.
    uploads (id) {
        id -> Uuid,
        rfc -> Varchar,
        uploader_username -> Varchar,
        uploader_name -> Nullable<Text>,
        group_id -> Nullable<Uuid>,
        consent_registered -> Bool,
        status_code -> Int4,
        api_payload -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// CFDI converted to JSON by the ingestion pipeline.
    cfdi (id) {
        id -> Uuid,
        client_rfc -> Varchar,
        uuid -> Nullable<Text>,
        xml -> Jsonb,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// SAT metadata records written by the ingestion pipeline.
    metadata (id) {
        id -> Uuid,
        client_rfc -> Varchar,
        document -> Jsonb,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(clients -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(groups, clients, users, uploads, cfdi, metadata);

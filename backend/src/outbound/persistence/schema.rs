//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Users keyed by email.
    users (email) {
        email -> Text,
        /// Opaque hex access token.
        token -> Text,
        is_manager -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Approval requests.
    ///
    /// `request_type`, `urgency` and `status` hold the canonical wire
    /// spellings and are guarded by check constraints.
    requests (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        request_type -> Text,
        urgency -> Text,
        requester_email -> Text,
        approver_email -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, requests);

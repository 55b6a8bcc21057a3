//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts for every role. `email` is unique and stored lowercased.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// One of `user`, `technician`, `admin`.
        role -> Varchar,
        dni -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Int8,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Technician profile; one per technician account.
    technicians (id) {
        id -> Int8,
        user_id -> Int8,
        availability_date -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Service requests. A CHECK constraint ties a non-null `technician_id`
    /// to status `assigned` or `completed`.
    service_requests (id) {
        id -> Int8,
        requesting_user_id -> Int8,
        technician_id -> Nullable<Int8>,
        category_id -> Int8,
        claim_id -> Nullable<Int8>,
        /// `technical_service` or the legacy `claim`.
        kind -> Varchar,
        status -> Varchar,
        subject -> Varchar,
        description -> Text,
        wanted_date_start -> Date,
        wanted_date_end -> Date,
        time_shift -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    claims (id) {
        id -> Int8,
        requesting_user_id -> Int8,
        category_id -> Int8,
        status -> Varchar,
        subject -> Varchar,
        description -> Text,
        answer -> Nullable<Text>,
        answered_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// At most one rating per service request (unique index).
    ratings (id) {
        id -> Int8,
        technician_id -> Int8,
        user_id -> Int8,
        technician_request_id -> Nullable<Int8>,
        score -> Int4,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(technicians -> users (user_id));
diesel::joinable!(service_requests -> categories (category_id));
diesel::joinable!(claims -> categories (category_id));
diesel::joinable!(ratings -> technicians (technician_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    technicians,
    service_requests,
    claims,
    ratings,
);

diesel::table! {
    appointments (id) {
        id -> Uuid,
        client_name -> Text,
        phone -> Text,
        date -> Date,
        time -> Text,
        service -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    day_blocks (date) {
        date -> Date,
        reason -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

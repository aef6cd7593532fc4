table! {
    appointments (aid) {
        aid -> Unsigned<Bigint>,
        username -> Char,
        did -> Char,
        sid -> Unsigned<Bigint>,
        date -> Date,
        time -> Time,
        time_label -> Char,
        token -> Integer,
        status -> Char,
        created_at -> Datetime,
        notes -> Nullable<Varchar>,
        specialization -> Nullable<Varchar>,
    }
}

table! {
    penalties (username) {
        username -> Char,
        strikes -> Integer,
        blocked -> Bool,
        blocked_until -> Nullable<Date>,
        last_missed -> Nullable<Date>,
    }
}

table! {
    queue_states (did, day) {
        did -> Char,
        day -> Date,
        serving -> Integer,
    }
}

table! {
    sessions (token_hash) {
        token_hash -> Char,
        account -> Char,
        role -> Char,
        login_time -> Datetime,
    }
}

table! {
    slots (sid) {
        sid -> Unsigned<Bigint>,
        did -> Char,
        start_time -> Datetime,
        end_time -> Datetime,
        capacity -> Integer,
        appointed -> Integer,
    }
}

allow_tables_to_appear_in_same_query!(
    appointments,
    penalties,
    queue_states,
    sessions,
    slots,
);

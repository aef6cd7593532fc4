mod requests;
mod responses;

use crate::{
    database::{assert, get_db_conn, last_insert_id, store::DbStore},
    models::{appointments::NewAppointment, slots::SlotData},
    protocol::{AppointmentItem, SimpleResponse},
    queue::{
        feed::QueueFeed,
        penalty,
        store::PenaltyStore,
        token, transition, AppointmentStatus, LIVE_STATUSES,
    },
    session::{Role, Session},
    validate::Validate,
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use chrono::Utc;
use diesel::prelude::*;
use log::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(appoint)
        .service(cancel_appoint)
        .service(search_appoint)
        .service(token_progress)
        .service(view_dashboard);
}

crate::post_funcs! {
    (appoint, "/appoint", AppointRequest, AppointResponse),
    (cancel_appoint, "/cancel_appoint", CancelAppointRequest, SimpleResponse),
    (search_appoint, "/search_appoint", SearchAppointRequest, SearchAppointResponse),
    (token_progress, "/token_progress", TokenProgressRequest, TokenProgressResponse),
    (view_dashboard, "/view_dashboard", ViewDashboardRequest, ViewDashboardResponse),
}

async fn appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<AppointRequest>,
) -> anyhow::Result<AppointResponse> {
    use crate::schema::{appointments, slots};

    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Patient).await?;
    let cmd = info.validate()?;

    let username = session.account;
    let policy = state.config.penalty;
    let today = crate::utils::today();
    let conn = get_db_conn(&state.pool)?;
    let (aid, token) = web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let store = DbStore::new(&conn);

            // check penalty
            let account = store.get_account(&username)?;
            if !penalty::can_book(account.as_ref(), today, &policy) {
                bail!("Booking is blocked after repeated missed appointments");
            }

            // check slot, locking it so capacity and token reads below are serialized
            let slot = slots::table
                .find(cmd.sid)
                .for_update()
                .get_result::<SlotData>(&conn)
                .optional()
                .context("DB error")?;
            let slot = match slot {
                Some(slot) => slot,
                None => bail!("No such slot"),
            };
            let date = slot.start_time.date();

            // tokens are numbered per doctor and day, across all of that day's slots
            let (day_start, day_end) = crate::utils::day_bounds(date);
            slots::table
                .filter(slots::did.eq(&slot.did))
                .filter(slots::start_time.ge(day_start))
                .filter(slots::start_time.lt(day_end))
                .select(slots::sid)
                .for_update()
                .load::<u64>(&conn)
                .context("DB error")?;
            if date < today {
                bail!("Slot has already passed");
            }
            if slot.capacity <= slot.appointed {
                bail!("Slot is full");
            }

            // check appo
            let live: Vec<&str> = LIVE_STATUSES.iter().map(|s| s.as_str()).collect();
            let res = appointments::table
                .filter(appointments::username.eq(&username))
                .filter(appointments::sid.eq(cmd.sid))
                .filter(appointments::status.eq_any(live))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res > 0 {
                bail!("Appointment already exists");
            }

            // insert appo with the doctor's next token of the day
            let token = store.last_token(&slot.did, date)? + 1;
            let data = NewAppointment {
                username: username.clone(),
                did: slot.did.clone(),
                sid: slot.sid,
                date,
                time: slot.start_time.time(),
                time_label: crate::utils::get_time_str(&slot.start_time, &slot.end_time)
                    .to_string(),
                token,
                status: AppointmentStatus::Upcoming.as_str().to_string(),
                created_at: Utc::now().naive_utc(),
                notes: cmd.notes,
                specialization: cmd.specialization,
            };
            diesel::insert_into(appointments::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;
            let aid = diesel::select(last_insert_id)
                .get_result::<u64>(&conn)
                .context("DB error")?;

            // update slot
            diesel::update(slots::table.find(slot.sid))
                .set(slots::appointed.eq(slots::appointed + 1))
                .execute(&conn)
                .context("DB error")?;

            info!("{} booked slot {} as token {}", username, slot.sid, token);
            Ok((aid, token))
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    Ok(AppointResponse {
        success: true,
        err: "".to_string(),
        aid,
        token,
    })
}

async fn cancel_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<CancelAppointRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::slots;

    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Patient).await?;

    let username = session.account;
    let aid = info.aid;
    let today = crate::utils::today();
    let conn = get_db_conn(&state.pool)?;
    web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let store = DbStore::new(&conn);
            let mut appo = assert::assert_patient_appoint(&store, &username, aid)?;

            transition::cancel(&mut appo, today)?;
            store.set_status(aid, appo.status)?;

            // update slot
            diesel::update(slots::table.find(appo.sid))
                .set(slots::appointed.eq(slots::appointed - 1))
                .execute(&conn)
                .context("DB error")?;

            info!("{} cancelled appointment {}", username, aid);
            Ok(())
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    Ok(SimpleResponse::ok())
}

async fn search_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAppointRequest>,
) -> anyhow::Result<SearchAppointResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Patient).await?;

    let status = match info.status.as_deref() {
        None | Some("all") => None,
        Some(status) => Some(status.parse::<AppointmentStatus>()?),
    };
    let (first_index, limit) = crate::utils::page(info.first_index, info.limit);

    let username = session.account;
    let today = crate::utils::today();
    let conn = get_db_conn(&state.pool)?;
    let appos = web::block(move || {
        DbStore::new(&conn).query_by_patient(&username, status, today, first_index, limit)
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    let appos = appos
        .into_iter()
        .map(|appo| AppointmentItem::display(appo, today))
        .collect();

    Ok(SearchAppointResponse {
        success: true,
        err: "".to_string(),
        appointments: appos,
    })
}

async fn token_progress_impl(
    state: web::Data<AppState>,
    info: web::Json<TokenProgressRequest>,
) -> anyhow::Result<TokenProgressResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Patient).await?;

    let username = session.account;
    let aid = info.aid;
    let conn = get_db_conn(&state.pool)?;
    let (appo, queue_state) = web::block(move || -> anyhow::Result<_> {
        let store = DbStore::new(&conn);
        let appo = assert::assert_patient_appoint(&store, &username, aid)?;
        let queue_state = store.poll(&appo.did, appo.date)?;
        Ok((appo, queue_state))
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    let progress =
        token::token_progress(&appo, queue_state.as_ref(), state.config.avg_minutes_per_token)?;

    Ok(TokenProgressResponse {
        success: true,
        err: "".to_string(),
        aid: appo.aid,
        token: appo.token,
        current_serving: progress.current_serving,
        wait_label: progress.wait_label,
        is_your_turn: progress.is_your_turn,
    })
}

async fn view_dashboard_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewDashboardRequest>,
) -> anyhow::Result<ViewDashboardResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Patient).await?;

    let today = crate::utils::today();
    let mut response = ViewDashboardResponse {
        success: true,
        ..Default::default()
    };

    let username = session.account.clone();
    let pool = state.pool.clone();
    let appos = web::block(move || {
        let conn = get_db_conn(&pool)?;
        DbStore::new(&conn).query_upcoming_by_patient(&username, today)
    })
    .await
    .map_err(crate::utils::unwrap_blocking);
    match appos {
        Ok(appos) => {
            response.appointments = appos
                .into_iter()
                .map(|appo| AppointmentItem::display(appo, today))
                .collect();
        }
        Err(err) => {
            log::warn!("dashboard appointments for {}: {}", session.account, err);
            response.appointments_err = err.to_string();
        }
    }

    let username = session.account.clone();
    let pool = state.pool.clone();
    let account = web::block(move || -> anyhow::Result<_> {
        let conn = get_db_conn(&pool)?;
        Ok(DbStore::new(&conn).get_account(&username)?)
    })
    .await
    .map_err(crate::utils::unwrap_blocking);
    match account {
        Ok(account) => {
            let policy = state.config.penalty;
            let can_book = penalty::can_book(account.as_ref(), today, &policy);
            response.penalty = Some(match account {
                Some(account) => PenaltyItem {
                    strikes: account.display_strikes(),
                    blocked: account.blocked,
                    blocked_until: account
                        .blocked_until
                        .map(|date| crate::utils::format_date_str(&date)),
                    can_book,
                },
                None => PenaltyItem {
                    can_book,
                    ..Default::default()
                },
            });
        }
        Err(err) => {
            log::warn!("dashboard penalty for {}: {}", session.account, err);
            response.penalty_err = err.to_string();
        }
    }

    Ok(response)
}

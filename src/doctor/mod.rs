mod requests;
mod responses;

use crate::{
    database::{assert, get_db_conn, last_insert_id, store::DbStore},
    models::slots::NewSlot,
    protocol::{AppointmentItem, SimpleResponse},
    queue::{
        feed::{self, QueueFeed},
        transition, AppointmentStatus,
    },
    session::{Role, Session},
    validate::Validate,
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use diesel::prelude::*;
use log::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_time)
        .service(call_next)
        .service(update_appoint)
        .service(search_appoint);
}

crate::post_funcs! {
    (add_time, "/add_time", AddTimeRequest, AddTimeResponse),
    (call_next, "/call_next", CallNextRequest, CallNextResponse),
    (update_appoint, "/update_appoint", UpdateAppointRequest, SimpleResponse),
    (search_appoint, "/search_appoint", SearchAppointRequest, SearchAppointResponse),
}

async fn add_time_impl(
    state: web::Data<AppState>,
    info: web::Json<AddTimeRequest>,
) -> anyhow::Result<AddTimeResponse> {
    use crate::schema::slots;

    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Doctor).await?;
    let cmd = info.validate()?;
    if cmd.start_time.date() < crate::utils::today() {
        bail!("Cannot add a time in the past");
    }

    let did = session.account;
    let conn = get_db_conn(&state.pool)?;
    let sid = web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let res = slots::table
                .filter(slots::did.eq(&did))
                .filter(
                    slots::start_time
                        .between(&cmd.start_time, &cmd.end_time)
                        .or(slots::end_time.between(&cmd.start_time, &cmd.end_time)),
                )
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res > 0 {
                bail!("Time interval conflicts with existed times");
            }

            let data = NewSlot {
                did,
                start_time: cmd.start_time,
                end_time: cmd.end_time,
                capacity: cmd.capacity,
            };
            diesel::insert_into(slots::table)
                .values(data)
                .execute(&conn)
                .context("DB error")?;
            let sid = diesel::select(last_insert_id)
                .get_result::<u64>(&conn)
                .context("DB error")?;

            Ok(sid)
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    Ok(AddTimeResponse {
        success: true,
        err: "".to_string(),
        sid,
    })
}

async fn call_next_impl(
    state: web::Data<AppState>,
    info: web::Json<CallNextRequest>,
) -> anyhow::Result<CallNextResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Doctor).await?;

    let did = session.account;
    let today = crate::utils::today();
    let conn = get_db_conn(&state.pool)?;
    let (serving, aid) = web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let store = DbStore::new(&conn);
            let next = feed::advance(store.poll(&did, today)?, &did, today);
            store.save_queue_state(&next)?;

            let called = match store.find_by_token(&did, today, next.serving)? {
                Some(mut appo) if appo.status.can_transition_to(AppointmentStatus::Active) => {
                    transition::start(&mut appo, today)?;
                    store.set_status(appo.aid, appo.status)?;
                    Some(appo.aid)
                }
                _ => None,
            };

            info!("{} now serving token {}", did, next.serving);
            Ok((next.serving, called))
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    Ok(CallNextResponse {
        success: true,
        err: "".to_string(),
        serving,
        aid,
    })
}

async fn update_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<UpdateAppointRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Doctor).await?;
    let (aid, status) = info.validate()?;

    let did = session.account;
    let today = crate::utils::today();
    let conn = get_db_conn(&state.pool)?;
    web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let store = DbStore::new(&conn);
            let mut appo = assert::assert_doctor_appoint(&store, &did, aid)?;

            transition::apply(&mut appo, status, today)?;
            store.set_status(aid, appo.status)?;
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
    let session = Session::load(&state, info.login_token.clone(), Role::Doctor).await?;
    let day = crate::utils::parse_date_str_opt(info.date)?;

    let did = session.account;
    let conn = get_db_conn(&state.pool)?;
    let (appos, queue_state) = web::block(move || -> anyhow::Result<_> {
        let store = DbStore::new(&conn);
        let appos = store.query_by_doctor_day(&did, day)?;
        let queue_state = store.poll(&did, day)?;
        Ok((appos, queue_state))
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    let today = crate::utils::today();
    Ok(SearchAppointResponse {
        success: true,
        err: "".to_string(),
        serving: queue_state.map_or(0, |state| state.serving),
        appointments: appos
            .into_iter()
            .map(|appo| AppointmentItem::display(appo, today))
            .collect(),
    })
}

mod requests;
mod responses;

use crate::{
    database::{get_db_conn, store::DbStore},
    protocol::{AppointmentItem, SimpleResponse},
    queue::{
        penalty,
        store::{AppointmentStore, PenaltyStore},
        sweep::{self, SweepReport},
        PenalizedAccount,
    },
    session::{Role, Session},
    validate::Validate,
    AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::bail;
use diesel::prelude::*;
use log::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(run_sweep)
        .service(search_appoint)
        .service(search_penalty)
        .service(reset_strikes)
        .service(unblock);
}

crate::post_funcs! {
    (run_sweep, "/sweep", SweepRequest, SweepResponse),
    (search_appoint, "/search_appoint", SearchAppointRequest, SearchAppointResponse),
    (search_penalty, "/search_penalty", SearchPenaltyRequest, SearchPenaltyResponse),
    (reset_strikes, "/reset_strikes", PenaltyRequest, SimpleResponse),
    (unblock, "/unblock", PenaltyRequest, SimpleResponse),
}

/// Sweeps missed appointments in one transaction. Never fails: a store error
/// rolls the whole pass back and comes out as a warning.
async fn sweep_missed(state: &web::Data<AppState>) -> (SweepReport, Option<String>) {
    let pool = state.pool.clone();
    let policy = state.config.penalty;
    let today = crate::utils::today();

    let res = web::block(move || -> anyhow::Result<SweepReport> {
        let conn = get_db_conn(&pool)?;
        conn.transaction(|| -> anyhow::Result<_> {
            Ok(sweep::run_sweep(&DbStore::new(&conn), today, &policy)?)
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking);

    sweep::sweep_or_warn(move || res)
}

async fn run_sweep_impl(
    state: web::Data<AppState>,
    info: web::Json<SweepRequest>,
) -> anyhow::Result<SweepResponse> {
    let info = info.into_inner();
    Session::load(&state, info.login_token, Role::Admin).await?;

    let (report, warning) = sweep_missed(&state).await;
    Ok(SweepResponse {
        success: true,
        err: "".to_string(),
        missed: report.missed,
        blocked: report.blocked,
        warning,
    })
}

async fn search_appoint_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchAppointRequest>,
) -> anyhow::Result<SearchAppointResponse> {
    let info = info.into_inner();
    Session::load(&state, info.login_token, Role::Admin).await?;

    // fetch happens after the sweep, so a successful pass is already visible
    let (_, warning) = sweep_missed(&state).await;

    let (first_index, limit) = crate::utils::page(info.first_index, info.limit);
    let conn = get_db_conn(&state.pool)?;
    let appos = web::block(move || -> anyhow::Result<_> {
        Ok(DbStore::new(&conn).query_page(first_index, limit)?)
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    let today = crate::utils::today();
    let appos = appos
        .into_iter()
        .map(|appo| AppointmentItem::display(appo, today))
        .collect();

    Ok(SearchAppointResponse {
        success: true,
        err: "".to_string(),
        warning,
        appointments: appos,
    })
}

async fn search_penalty_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchPenaltyRequest>,
) -> anyhow::Result<SearchPenaltyResponse> {
    let info = info.into_inner();
    Session::load(&state, info.login_token, Role::Admin).await?;

    // strikes and blocks depend on the sweep, so run it before reading them
    let (_, warning) = sweep_missed(&state).await;

    let pattern = crate::utils::get_str_pattern_opt(info.username);
    let blocked_only = info.blocked_only;
    let (first_index, limit) = crate::utils::page(info.first_index, info.limit);
    let conn = get_db_conn(&state.pool)?;
    let accounts = web::block(move || {
        DbStore::new(&conn).search_accounts(pattern, blocked_only, first_index, limit)
    })
    .await
    .map_err(crate::utils::unwrap_blocking)?;

    let accounts = accounts
        .into_iter()
        .map(|account| SearchPenaltyItem {
            strikes: account.display_strikes(),
            username: account.username,
            blocked: account.blocked,
            blocked_until: account
                .blocked_until
                .map(|date| crate::utils::format_date_str(&date)),
            last_missed: account
                .last_missed
                .map(|date| crate::utils::format_date_str(&date)),
        })
        .collect();

    Ok(SearchPenaltyResponse {
        success: true,
        err: "".to_string(),
        warning,
        accounts,
    })
}

async fn update_account(
    state: &web::Data<AppState>,
    username: String,
    update: fn(PenalizedAccount) -> PenalizedAccount,
) -> anyhow::Result<()> {
    let conn = get_db_conn(&state.pool)?;
    web::block(move || {
        conn.transaction(|| -> anyhow::Result<_> {
            let store = DbStore::new(&conn);
            let account = match store.get_account(&username)? {
                Some(account) => account,
                None => bail!("No such penalized account"),
            };
            store.save_account(&update(account))?;
            Ok(())
        })
    })
    .await
    .map_err(crate::utils::unwrap_blocking)
}

async fn reset_strikes_impl(
    state: web::Data<AppState>,
    info: web::Json<PenaltyRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Admin).await?;
    let username = info.validate()?;

    update_account(&state, username.clone(), penalty::reset_strikes).await?;
    info!("{} reset strikes of {}", session.account, username);

    Ok(SimpleResponse::ok())
}

async fn unblock_impl(
    state: web::Data<AppState>,
    info: web::Json<PenaltyRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let session = Session::load(&state, info.login_token.clone(), Role::Admin).await?;
    let username = info.validate()?;

    update_account(&state, username.clone(), penalty::unblock).await?;
    info!("{} unblocked {}", session.account, username);

    Ok(SimpleResponse::ok())
}

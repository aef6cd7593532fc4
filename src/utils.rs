#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    state: web::Data<AppState>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](state, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            log::debug!("{} failed: {:#}", $url, err);
                            <$response>::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

use actix_web::error::BlockingError;
use anyhow::{anyhow, bail, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Recovers the job's own error from `web::block`.
pub fn unwrap_blocking(err: BlockingError<anyhow::Error>) -> anyhow::Error {
    match err {
        BlockingError::Error(err) => err,
        BlockingError::Canceled => anyhow!("Blocking task was cancelled"),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().naive_utc().date()
}

pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.as_ref(), "%Y-%m-%d").context("Wrong date format, expected YYYY-MM-DD")
}

pub fn parse_date_str_opt<S: AsRef<str>>(s: Option<S>) -> anyhow::Result<NaiveDate> {
    s.map_or(Ok(today()), parse_date_str)
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    format!("{}+00:00", time.format(TIME_FMT))
}

/// Half-open `[start, end)` range covering one calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (date.and_hms(0, 0, 0), date.succ().and_hms(0, 0, 0))
}

pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    format!("%{}%", s.as_ref())
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}

/// Clinic session window of a half-day label.
pub fn get_time_from_str(date: NaiveDate, time: &str) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    match time {
        crate::models::slots::TIME_AM => Ok((date.and_hms(9, 0, 0), date.and_hms(11, 0, 0))),
        crate::models::slots::TIME_PM => Ok((date.and_hms(15, 0, 0), date.and_hms(17, 0, 0))),
        _ => bail!("Wrong time format, expected 'AM' or 'PM'"),
    }
}

pub fn get_time_str(_start_time: &NaiveDateTime, end_time: &NaiveDateTime) -> &'static str {
    if end_time.time() >= NaiveTime::from_hms(12, 0, 0) {
        crate::models::slots::TIME_PM
    } else {
        crate::models::slots::TIME_AM
    }
}

/// Offset and limit for a paged query; both are pushed into SQL.
pub fn page(first_index: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    (first_index.unwrap_or(0).max(0), limit.unwrap_or(30).max(0))
}

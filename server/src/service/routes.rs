use crate::fixtures::FixtureSet;
use log::info;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use trafficcore::ChunkId;
use warp::{http::StatusCode, Filter, Rejection, Reply};

/// Fixtures are loaded once at startup and only read afterwards.
pub type SharedFixtures = Arc<FixtureSet>;

fn with_fixtures(
    fixtures: SharedFixtures,
) -> impl Filter<Extract = (SharedFixtures,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || fixtures.clone())
}

fn not_found(detail: String) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({ "detail": detail })),
        StatusCode::NOT_FOUND,
    )
}

fn list_chunks(fixtures: SharedFixtures) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&fixtures.chunk_ids()), StatusCode::OK)
}

fn list_violations(fixtures: SharedFixtures) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&fixtures.violations), StatusCode::OK)
}

fn violations_for_car(
    car_id: String,
    fixtures: SharedFixtures,
) -> warp::reply::WithStatus<warp::reply::Json> {
    let found = fixtures.violations_for_car(&car_id);
    if found.is_empty() {
        not_found(format!("No violations found for car {}", car_id))
    } else {
        warp::reply::with_status(warp::reply::json(&found), StatusCode::OK)
    }
}

fn get_record(
    chunk: ChunkId,
    fixtures: SharedFixtures,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match fixtures.record(chunk) {
        Some(record) => warp::reply::with_status(warp::reply::json(record), StatusCode::OK),
        None => not_found(format!("Chunk {} not found", chunk)),
    }
}

/// Read-only API plus static media under `media_dir`.
///
/// Fixed paths are matched before `/{chunk}`. Media files are tried before
/// the per-car lookup so that `/violations/car_{id}_violation_h264.mp4`
/// reaches the file rather than the car route.
pub fn build_routes(
    fixtures: SharedFixtures,
    media_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let chunks = warp::path!("chunks")
        .and(warp::get())
        .and(with_fixtures(fixtures.clone()))
        .map(list_chunks);

    let violations = warp::path!("violations")
        .and(warp::get())
        .and(with_fixtures(fixtures.clone()))
        .map(list_violations);

    let car_violations = warp::path!("violations" / String)
        .and(warp::get())
        .and(with_fixtures(fixtures.clone()))
        .map(violations_for_car);

    let record = warp::path!(ChunkId)
        .and(warp::get())
        .and(with_fixtures(fixtures))
        .map(get_record);

    info!("serving media from {}", media_dir.display());
    let media = warp::get().and(warp::fs::dir(media_dir));

    let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET"]);

    chunks
        .or(violations)
        .or(record)
        .or(media)
        .or(car_violations)
        .with(cors)
        .with(warp::log("trafficserver"))
}

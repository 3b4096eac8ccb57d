use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use log::{info, warn};
use serde::Deserialize;

use markov_core::io::list_files;
use markov_core::snapshot::load_corpus;
use markov_core::{Chain, ChainError};

mod config;

use config::ServerConfig;

/// Query parameters for the `/v1/respond` endpoint.
#[derive(Deserialize)]
struct RespondParams {
	input: Option<String>,
	min_len: Option<usize>,
	max_len: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
}

/// The live chain and the corpora it was built from.
#[derive(Default)]
struct SharedData {
	chain: Chain,
	corpora: Vec<String>,
}

/// Maps a generation failure to an HTTP status.
fn chain_error_response(err: ChainError) -> HttpResponse {
	match err {
		ChainError::EmptyModel => HttpResponse::Conflict().body(err.to_string()),
		ChainError::ConstraintUnsatisfiable { .. } => HttpResponse::UnprocessableEntity().body(err.to_string()),
	}
}

/// HTTP GET endpoint `/v1/respond`
///
/// Generates a response seeded from `input` when possible.
/// Missing lengths fall back to the configured defaults.
#[get("/v1/respond")]
async fn get_response(
	data: web::Data<Mutex<SharedData>>,
	config: web::Data<ServerConfig>,
	query: web::Query<RespondParams>,
) -> impl Responder {
	let input = query.input.as_deref().unwrap_or("");
	let min_len = query.min_len.unwrap_or(config.default_min_len);
	let max_len = query.max_len.unwrap_or(config.default_max_len);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	match shared_data.chain.respond(input, min_len, max_len) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => chain_error_response(e),
	}
}

/// HTTP PUT endpoint `/v1/update`
///
/// Trains the live chain on the request body, one line per training line.
/// Returns the number of non-blank lines processed.
#[put("/v1/update")]
async fn put_update(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let lines: Vec<&str> = body.lines().filter(|line| !line.trim().is_empty()).collect();
	shared_data.chain.update_all(&lines);

	HttpResponse::Ok().body(lines.len().to_string())
}

#[get("/v1/corpora")]
async fn get_corpora(config: web::Data<ServerConfig>) -> impl Responder {
	match list_files(&config.data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	HttpResponse::Ok().body(shared_data.corpora.join("\n"))
}

/// HTTP PUT endpoint `/v1/load_corpora?names=a,b`
///
/// Replaces the live chain with one trained on the named corpora.
/// The live chain is left untouched if any corpus fails to load.
#[put("/v1/load_corpora")]
async fn put_corpora(
	data: web::Data<Mutex<SharedData>>,
	config: web::Data<ServerConfig>,
	query: web::Query<CorpusQuery>,
) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let corpus_names: Vec<String> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.map(str::to_owned)
		.collect();

	let mut chain = Chain::new();
	for name in &corpus_names {
		let corpus_path = config.data_dir.join(format!("{}.txt", name));
		if let Err(e) = load_corpus(&mut chain, &corpus_path) {
			warn!("failed to load corpus {}: {}", name, e);
			return HttpResponse::InternalServerError().body(format!("Failed to load corpus {name}: {e}"));
		}
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	info!("loaded {} contexts from {:?}", chain.table().len(), corpus_names);
	shared_data.chain = chain;
	shared_data.corpora = corpus_names;

	HttpResponse::Ok().body("Corpora loaded successfully")
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	HttpResponse::Ok().body(format!("contexts: {}", shared_data.chain.table().len()))
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_response)
		.service(put_update)
		.service(get_corpora)
		.service(get_loaded_corpora)
		.service(put_corpora)
		.service(get_stats);
}

/// Main entry point for the server.
///
/// Reads `ServerConfig`, wraps an empty chain in a `Mutex` so that
/// training and generation are serialized, and starts the HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config = ServerConfig::load();
	let bind_address = (config.host.clone(), config.port);
	let cors_permissive = config.cors_permissive;
	info!("serving on {}:{} with corpora from {:?}", config.host, config.port, config.data_dir);

	let shared_data = web::Data::new(Mutex::new(SharedData::default()));
	let shared_config = web::Data::new(config);

	HttpServer::new(move || {
		let cors = if cors_permissive { Cors::permissive() } else { Cors::default() };
		App::new()
			.wrap(Logger::default())
			.wrap(cors)
			.app_data(shared_data.clone())
			.app_data(shared_config.clone())
			.configure(routes)
	})
		.bind(bind_address)?
		.run()
		.await
}

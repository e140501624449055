use log::info;
use std::env;

use beam_snake::bot::Bot;
use beam_snake::config::Config;
use beam_snake::debug_logger::DebugLogger;
use beam_snake::handler;

#[rocket::launch]
async fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Battlesnake Server...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    info!(
        "Search depth {}, beam width {}, opponent branching {}, deadline {}ms",
        config.search.depth,
        config.search.beam_width,
        config.search.opponent_branch_factor,
        config.timing.deadline_ms
    );

    let debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    handler::build(Bot::with_logger(config, debug_logger))
}

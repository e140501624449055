// HTTP handler bindings for Battlesnake API endpoints
//
// Thin wrappers that bind Rocket routes to the Bot's endpoint methods. Rocket's
// `Json` guard rejects bodies missing required fields before a handler runs;
// snapshots that parse but describe an impossible board are answered with 400.

use log::error;
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Rocket, State};
use serde_json::Value;

use crate::bot::Bot;
use crate::types::GameState;

/// GET / endpoint
/// Returns bot metadata and appearance configuration
#[get("/")]
pub fn index(bot: &State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &State<Bot>, start_req: Json<GameState>) -> Status {
    bot.start(
        &start_req.game,
        start_req.turn,
        &start_req.board,
        &start_req.you,
    );

    Status::Ok
}

/// POST /move endpoint
/// Called each turn to compute and return the next move
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(bot: &State<Bot>, move_req: Json<GameState>) -> Result<Json<Value>, Status> {
    match bot.get_move(&move_req).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Turn {}: rejected snapshot: {}", move_req.turn, e);
            Err(Status::BadRequest)
        }
    }
}

/// POST /end endpoint
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &State<Bot>, end_req: Json<GameState>) -> Status {
    bot.end(&end_req.game, end_req.turn, &end_req.board, &end_req.you);

    Status::Ok
}

/// Rocket instance serving `bot` on the four API routes
pub fn build(bot: Bot) -> Rocket<Build> {
    rocket::build()
        .manage(bot)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "battlesnake/beam-snake");
            })
        }))
        .mount("/", routes![index, start, get_move, end])
}

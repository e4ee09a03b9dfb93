mod delete_user;
mod get_me;

use actix_web::web;
use delete_user::delete_user_controller;
use get_me::get_me_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(get_me_controller));
    cfg.route("/user/{user_id}", web::delete().to(delete_user_controller));
}

mod create_booking;
mod delete_booking;
mod get_booking;
mod get_bookings;
mod send_urgent_message;
mod update_booking_status;

use actix_web::web;
use create_booking::create_booking_controller;
use delete_booking::delete_booking_controller;
use get_booking::get_booking_controller;
use get_bookings::get_bookings_controller;
use send_urgent_message::send_urgent_message_controller;
use update_booking_status::update_booking_status_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/booking", web::post().to(create_booking_controller));
    cfg.route("/booking", web::get().to(get_bookings_controller));

    cfg.route(
        "/booking/{booking_id}",
        web::get().to(get_booking_controller),
    );
    cfg.route(
        "/booking/{booking_id}",
        web::delete().to(delete_booking_controller),
    );
    cfg.route(
        "/booking/{booking_id}/status",
        web::put().to(update_booking_status_controller),
    );
    cfg.route(
        "/booking/{booking_id}/urgent-message",
        web::post().to(send_urgent_message_controller),
    );
}

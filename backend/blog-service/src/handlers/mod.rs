//! HTTP handlers and route configuration.

pub mod auth;
pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;

use actix_web::web;

use crate::middleware::JwtAuthMiddleware;

/// Mount all `/api/v1` routes.
///
/// The auth middleware wraps the whole tree: requests without credentials
/// pass through (read endpoints are public), requests with bad credentials
/// fail, and write handlers enforce authentication by extracting `UserId`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .wrap(JwtAuthMiddleware)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/refresh", web::post().to(auth::refresh))
                    .service(
                        web::resource("/me")
                            .route(web::get().to(auth::me))
                            .route(web::delete().to(auth::delete_account)),
                    ),
            )
            .service(
                web::scope("/groups")
                    .service(web::resource("").route(web::get().to(groups::list_groups)))
                    .service(
                        web::resource("/{group_id}").route(web::get().to(groups::get_group)),
                    ),
            )
            .service(
                web::scope("/follow")
                    .service(
                        web::resource("")
                            .route(web::get().to(follows::list_follows))
                            .route(web::post().to(follows::create_follow)),
                    )
                    .service(
                        web::resource("/{follow_id}")
                            .route(web::delete().to(follows::delete_follow)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .service(
                        web::scope("/{post_id}/comments")
                            .service(
                                web::resource("")
                                    .route(web::get().to(comments::list_comments))
                                    .route(web::post().to(comments::create_comment)),
                            )
                            .service(
                                web::resource("/{comment_id}")
                                    .route(web::get().to(comments::get_comment))
                                    .route(web::patch().to(comments::update_comment))
                                    .route(web::delete().to(comments::delete_comment)),
                            ),
                    )
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::patch().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    ),
            ),
    );
}

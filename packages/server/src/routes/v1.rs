use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/lessons", lesson_routes())
        .nest("/student", student_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn lesson_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::lesson::list_lessons,
            handlers::lesson::create_lesson
        ))
        .routes(routes!(
            handlers::lesson::get_lesson,
            handlers::lesson::update_lesson,
            handlers::lesson::delete_lesson
        ))
        .routes(routes!(
            handlers::lesson::list_lectures,
            handlers::lesson::replace_lectures
        ))
        .routes(routes!(
            handlers::lesson::get_initial_test,
            handlers::lesson::save_initial_test
        ))
        .routes(routes!(
            handlers::lesson::get_final_test,
            handlers::lesson::save_final_test
        ))
        .routes(routes!(
            handlers::lesson::list_situational,
            handlers::lesson::replace_situational
        ))
        .routes(routes!(handlers::lesson::delete_situational))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::student::list_lessons))
        .routes(routes!(
            handlers::student::get_progress,
            handlers::student::advance_step
        ))
        .routes(routes!(handlers::student::submit_test))
        .routes(routes!(handlers::student::answer_situational))
        .routes(routes!(handlers::student::restart_lesson))
        .routes(routes!(handlers::student::get_results))
        .routes(routes!(handlers::student::dashboard))
}

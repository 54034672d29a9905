use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/institutions", institution_routes())
        .nest("/exams", exam_routes())
        .nest("/questions", question_routes())
        .nest("/taxonomy", taxonomy_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn account_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::profile::get_profile,
        handlers::profile::update_profile
    ))
}

fn institution_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::institution::list_institutions,
            handlers::institution::create_institution
        ))
        .routes(routes!(
            handlers::institution::get_institution,
            handlers::institution::update_institution,
            handlers::institution::delete_institution
        ))
        .routes(routes!(handlers::institution::disable_institution))
        .routes(routes!(
            handlers::exam::list_exams,
            handlers::exam::create_exam
        ))
}

fn exam_routes() -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::exam::get_exam,
            handlers::exam::update_exam,
            handlers::exam::delete_exam
        ))
        .routes(routes!(handlers::exam::toggle_exam_lock))
        .routes(routes!(handlers::question::list_questions));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::question::create_question))
        .layer(handlers::question::question_body_limit());

    crud.merge(upload)
}

fn question_routes() -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new().routes(routes!(
        handlers::question::get_question,
        handlers::question::delete_question
    ));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::question::update_question))
        .layer(handlers::question::question_body_limit());

    crud.merge(upload)
}

fn taxonomy_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::taxonomy::list_categories))
        .routes(routes!(handlers::taxonomy::list_subcategories))
        .routes(routes!(handlers::taxonomy::list_subjects))
}

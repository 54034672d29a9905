use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::entity::{alternative, category, question, subcategory, subject};
use crate::error::{AppError, ErrorBody, FieldErrors};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::parse_json_part;
use crate::handlers::exam::find_exam;
use crate::models::question::*;
use crate::question_save::{
    DbQuestionRecords, NewImage, OriginalAlternative, QuestionDraft, QuestionFields, SaveTarget,
    remove_image, save_question,
};
use crate::state::AppState;
use crate::utils::filename::validate_flat_filename;

/// Body limit layer for question saves, which carry image uploads (64MB).
pub fn question_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024)
}

#[utoipa::path(
    get,
    path = "/{id}/questions",
    tag = "Questions",
    operation_id = "listExamQuestions",
    summary = "List the questions of an exam",
    description = "Questions ordered by number, each with its alternatives ordered by id.",
    params(("id" = i32, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Questions", body = Vec<QuestionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(exam_id))]
pub async fn list_questions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(exam_id): Path<i32>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    find_exam(&state.db, exam_id).await?;

    let questions = question::Entity::find()
        .filter(question::Column::Prova.eq(exam_id))
        .order_by_asc(question::Column::Numero)
        .order_by_asc(question::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
    let mut by_question: HashMap<i32, Vec<alternative::Model>> = HashMap::new();
    for alt in alternative::Entity::find()
        .filter(alternative::Column::Questao.is_in(ids))
        .order_by_asc(alternative::Column::Id)
        .all(&state.db)
        .await?
    {
        by_question.entry(alt.questao).or_default().push(alt);
    }

    let data = questions
        .into_iter()
        .map(|q| {
            let alternatives = by_question.remove(&q.id).unwrap_or_default();
            QuestionResponse::new(q, alternatives)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Get a question with its alternatives",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question", body = QuestionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionResponse>, AppError> {
    Ok(Json(load_question(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/questions",
    tag = "Questions",
    operation_id = "createQuestion",
    summary = "Create a question with its alternatives",
    description = "Multipart form: a `question` part with the JSON payload, `enunciado` file parts for new prompt images, and `alternativa:{id}` file parts for new images of the alternative with that form id. New alternatives use negative placeholder ids. Not transactional: on failure, steps already done stay applied.",
    params(("id" = i32, Path, description = "Exam ID")),
    request_body(content_type = "multipart/form-data", content = QuestionPayload, description = "Question payload and image files"),
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Exam not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image storage failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, multipart), fields(exam_id))]
pub async fn create_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(exam_id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let exam = find_exam(&state.db, exam_id).await?;
    let draft = read_save_form(multipart, state.config.storage.max_object_size).await?;

    reject_foreign_alternatives(&draft, &[])?;
    validate_taxonomy(&state.db, &draft.fields).await?;

    let target = SaveTarget {
        question_id: None,
        prova: exam.id,
        instituicao: exam.instituicao,
        stored_correct: None,
        stored_prompt_images: Vec::new(),
        original_alternatives: Vec::new(),
    };
    let records = DbQuestionRecords::new(&state.db);
    let outcome = save_question(&records, state.store.as_ref(), target, draft).await?;

    let response = load_question(&state.db, outcome.question_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Questions",
    operation_id = "saveQuestion",
    summary = "Save an edited question with its alternatives",
    description = "Same multipart layout as question creation. Alternatives missing from the form are deleted with their images, persisted ones are updated and placeholders are inserted. Not transactional: on failure, steps already done stay applied.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body(content_type = "multipart/form-data", content = QuestionPayload, description = "Question payload and image files"),
    responses(
        (status = 200, description = "Question saved", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image storage failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, multipart), fields(id))]
pub async fn update_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<QuestionResponse>, AppError> {
    let existing = find_question(&state.db, id).await?;
    let draft = read_save_form(multipart, state.config.storage.max_object_size).await?;

    let originals: Vec<OriginalAlternative> = alternative::Entity::find()
        .filter(alternative::Column::Questao.eq(id))
        .order_by_asc(alternative::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| OriginalAlternative {
            id: a.id,
            imagens: a.imagens.0,
        })
        .collect();

    reject_foreign_alternatives(&draft, &originals)?;
    validate_taxonomy(&state.db, &draft.fields).await?;

    let target = SaveTarget {
        question_id: Some(existing.id),
        prova: existing.prova,
        instituicao: existing.instituicao,
        stored_correct: existing.alternativa_correta,
        stored_prompt_images: existing.imagens_enunciado.0,
        original_alternatives: originals,
    };
    let records = DbQuestionRecords::new(&state.db);
    save_question(&records, state.store.as_ref(), target, draft).await?;

    Ok(Json(load_question(&state.db, id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Questions",
    operation_id = "deleteQuestion",
    summary = "Delete a question",
    description = "Deletes the alternatives and the question, then removes their images from storage. Image removal failures are logged and do not fail the request.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_question(&state.db, id).await?;
    let alternatives = alternative::Entity::find()
        .filter(alternative::Column::Questao.eq(id))
        .all(&state.db)
        .await?;

    let txn = state.db.begin().await?;
    alternative::Entity::delete_many()
        .filter(alternative::Column::Questao.eq(id))
        .exec(&txn)
        .await?;
    question::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let images = existing
        .imagens_enunciado
        .0
        .iter()
        .map(|url| (url, "the question prompt".to_string()))
        .chain(alternatives.iter().flat_map(|alt| {
            alt.imagens
                .0
                .iter()
                .map(move |url| (url, format!("alternative {}", alt.id)))
        }))
        .collect::<Vec<_>>();
    for (url, owner) in images {
        if let Err(e) = remove_image(state.store.as_ref(), url, &owner).await {
            warn!(error = %e, url = %url, "Failed to remove image of deleted question");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Read the `question` JSON part and image file parts of a save request.
async fn read_save_form(
    mut multipart: Multipart,
    max_image_size: u64,
) -> Result<QuestionDraft, AppError> {
    let mut payload: Option<QuestionPayload> = None;
    let mut uploads = QuestionUploads::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == QUESTION_PART {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read '{name}' part: {e}")))?;
            payload = Some(parse_json_part(QUESTION_PART, &text)?);
            continue;
        }

        let alternative_id = if name == PROMPT_IMAGE_PART {
            None
        } else if let Some(id) = alternative_part_id(&name) {
            Some(id?)
        } else {
            return Err(AppError::Validation(format!(
                "Unexpected multipart part '{name}'"
            )));
        };

        let image = read_image_field(field, max_image_size).await?;
        match alternative_id {
            None => uploads.prompt.push(image),
            Some(id) => uploads.alternatives.entry(id).or_default().push(image),
        }
    }

    let payload = payload.ok_or_else(|| {
        AppError::Validation(format!("Missing '{QUESTION_PART}' part"))
    })?;
    payload.into_draft(uploads)
}

async fn read_image_field(mut field: Field<'_>, max_size: u64) -> Result<NewImage, AppError> {
    let raw_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("Image parts must have a filename".into()))?;
    let filename = validate_flat_filename(&raw_name)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let is_image = mime_guess::from_path(&filename)
        .first()
        .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
    if !is_image {
        return Err(AppError::Validation(format!(
            "'{filename}' is not an image file"
        )));
    }

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "'{filename}' exceeds maximum size of {max_size} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(NewImage { filename, data })
}

/// Positive ids must name alternatives the question already has.
fn reject_foreign_alternatives(
    draft: &QuestionDraft,
    originals: &[OriginalAlternative],
) -> Result<(), AppError> {
    let known: HashSet<i32> = originals.iter().map(|a| a.id).collect();
    if let Some(alt) = draft
        .alternatives
        .iter()
        .find(|a| a.form_id > 0 && !known.contains(&a.form_id))
    {
        let mut fields = FieldErrors::new();
        fields.insert(
            "alternativas".into(),
            format!("Alternative {} does not belong to this question", alt.form_id),
        );
        return Err(AppError::InvalidFields(fields));
    }
    Ok(())
}

/// Taxonomy references must exist and form a chain: the subcategory belongs
/// to the category and the subject to the subcategory.
async fn validate_taxonomy<C: ConnectionTrait>(
    db: &C,
    fields: &QuestionFields,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    if let Some(id) = fields.categoria
        && category::Entity::find_by_id(id).one(db).await?.is_none()
    {
        errors.insert("categoria".into(), format!("Category {id} does not exist"));
    }

    if let Some(id) = fields.subcategoria {
        match subcategory::Entity::find_by_id(id).one(db).await? {
            None => {
                errors.insert(
                    "subcategoria".into(),
                    format!("Subcategory {id} does not exist"),
                );
            }
            Some(sub) if Some(sub.categoria) != fields.categoria => {
                errors.insert(
                    "subcategoria".into(),
                    "Subcategory does not belong to the selected category".into(),
                );
            }
            Some(_) => {}
        }
    }

    if let Some(id) = fields.assunto {
        match subject::Entity::find_by_id(id).one(db).await? {
            None => {
                errors.insert("assunto".into(), format!("Subject {id} does not exist"));
            }
            Some(subj) if Some(subj.subcategoria) != fields.subcategoria => {
                errors.insert(
                    "assunto".into(),
                    "Subject does not belong to the selected subcategory".into(),
                );
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

async fn load_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<QuestionResponse, AppError> {
    let model = find_question(db, id).await?;
    let alternatives = alternative::Entity::find()
        .filter(alternative::Column::Questao.eq(id))
        .order_by_asc(alternative::Column::Id)
        .all(db)
        .await?;
    Ok(QuestionResponse::new(model, alternatives))
}

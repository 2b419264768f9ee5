use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::TestType;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    lecture, lesson, lesson_test, situational_question, situational_result, student_progress,
    test_result,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, LESSON_MANAGE};
use crate::extractors::json::AppJson;
use crate::models::lesson::*;
use crate::models::shared::{non_blank, to_json_column};
use crate::state::AppState;
use crate::utils::lesson::{
    find_lesson, find_situational_question, find_test_by_type, lesson_inventories,
    lesson_test_ids, test_questions,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Lessons",
    operation_id = "listLessons",
    summary = "List all lessons",
    description = "Returns every lesson, newest first, with content counts and the published flag. Requires `lesson:manage` permission.",
    responses(
        (status = 200, description = "List of lessons", body = Vec<LessonSummary>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_lessons(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<LessonSummary>>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;

    let lessons = lesson::Entity::find()
        .order_by_desc(lesson::Column::CreatedAt)
        .order_by_desc(lesson::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = lessons.iter().map(|l| l.id).collect();
    let inventories = lesson_inventories(&state.db, &ids).await?;

    let data = lessons
        .into_iter()
        .map(|l| {
            let inventory = inventories.get(&l.id).copied().unwrap_or_default();
            LessonSummary::new(l, inventory)
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Lessons",
    operation_id = "createLesson",
    summary = "Create a new lesson",
    description = "Creates an empty lesson owned by the caller. Requires `lesson:manage` permission.",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    validate_create_lesson(&payload)?;

    let now = chrono::Utc::now();
    let new_lesson = lesson::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_lesson.insert(&state.db).await?;
    info!(lesson_id = model.id, "Lesson created");

    Ok((StatusCode::CREATED, Json(LessonResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "getLesson",
    summary = "Get a lesson by ID",
    description = "Returns the lesson with content counts. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson", body = LessonSummary),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LessonSummary>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;

    let lesson = find_lesson(&state.db, id).await?;
    let inventory = lesson_inventories(&state.db, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    Ok(Json(LessonSummary::new(lesson, inventory)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "updateLesson",
    summary = "Update a lesson",
    description = "Updates the title and/or description. Omitted fields are left unchanged. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateLessonRequest>,
) -> Result<Json<LessonResponse>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    validate_update_lesson(&payload)?;

    if payload == UpdateLessonRequest::default() {
        let existing = find_lesson(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_lesson(&txn, id).await?;
    let mut active: lesson::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(ref description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "deleteLesson",
    summary = "Delete a lesson by ID",
    description = "Permanently deletes a lesson with its lectures, tests and situational questions, and every student's results and progress for it. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;

    let txn = state.db.begin().await?;
    find_lesson(&txn, id).await?;

    test_result::Entity::delete_many()
        .filter(test_result::Column::TestId.in_subquery(lesson_test_ids(id)))
        .exec(&txn)
        .await?;
    situational_result::Entity::delete_many()
        .filter(situational_result::Column::LessonId.eq(id))
        .exec(&txn)
        .await?;
    student_progress::Entity::delete_many()
        .filter(student_progress::Column::LessonId.eq(id))
        .exec(&txn)
        .await?;
    lesson_test::Entity::delete_many()
        .filter(lesson_test::Column::LessonId.eq(id))
        .exec(&txn)
        .await?;
    situational_question::Entity::delete_many()
        .filter(situational_question::Column::LessonId.eq(id))
        .exec(&txn)
        .await?;
    lecture::Entity::delete_many()
        .filter(lecture::Column::LessonId.eq(id))
        .exec(&txn)
        .await?;
    lesson::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!("Lesson deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/lectures",
    tag = "Lectures",
    operation_id = "listLectures",
    summary = "List the lectures of a lesson",
    description = "Returns the lectures in display order. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lectures", body = Vec<LectureResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_lectures(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<LectureResponse>>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    find_lesson(&state.db, id).await?;

    let lectures = lecture::Entity::find()
        .filter(lecture::Column::LessonId.eq(id))
        .order_by_asc(lecture::Column::Position)
        .order_by_asc(lecture::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(lectures.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}/lectures",
    tag = "Lectures",
    operation_id = "replaceLectures",
    summary = "Replace the lectures of a lesson",
    description = "Saves the full ordered lecture list in one transaction. Entries carrying the ID of an existing lecture update it, entries without one are created, and lectures missing from the list are deleted. Positions follow array order. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = ReplaceLecturesRequest,
    responses(
        (status = 200, description = "Saved lectures", body = Vec<LectureResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.lectures.len()))]
pub async fn replace_lectures(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReplaceLecturesRequest>,
) -> Result<Json<Vec<LectureResponse>>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    validate_replace_lectures(&payload)?;

    let txn = state.db.begin().await?;
    find_lesson(&txn, id).await?;

    let mut existing: HashMap<i32, lecture::Model> = lecture::Entity::find()
        .filter(lecture::Column::LessonId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

    let kept: HashSet<i32> = payload
        .lectures
        .iter()
        .filter_map(|l| l.id)
        .filter(|lecture_id| existing.contains_key(lecture_id))
        .collect();
    let removed: Vec<i32> = existing
        .keys()
        .copied()
        .filter(|lecture_id| !kept.contains(lecture_id))
        .collect();
    if !removed.is_empty() {
        lecture::Entity::delete_many()
            .filter(lecture::Column::Id.is_in(removed))
            .exec(&txn)
            .await?;
    }

    let now = chrono::Utc::now();
    let mut saved = Vec::with_capacity(payload.lectures.len());
    for (position, input) in payload.lectures.into_iter().enumerate() {
        let current = input.id.and_then(|lecture_id| existing.remove(&lecture_id));
        let model = match current {
            Some(current) => {
                let mut active: lecture::ActiveModel = current.into();
                active.title = Set(input.title.trim().to_string());
                active.description = Set(input.description);
                active.video_url = Set(non_blank(input.video_url));
                active.file_path = Set(non_blank(input.file_path));
                active.position = Set(position as i32);
                active.update(&txn).await?
            }
            None => {
                lecture::ActiveModel {
                    lesson_id: Set(id),
                    title: Set(input.title.trim().to_string()),
                    description: Set(input.description),
                    video_url: Set(non_blank(input.video_url)),
                    file_path: Set(non_blank(input.file_path)),
                    position: Set(position as i32),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };
        saved.push(LectureResponse::from(model));
    }

    txn.commit().await?;
    Ok(Json(saved))
}

#[utoipa::path(
    get,
    path = "/{id}/tests/initial",
    tag = "Tests",
    operation_id = "getInitialTest",
    summary = "Get the initial test of a lesson",
    description = "Returns the initial test with its answer key. `id` is null when none has been saved. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Initial test", body = TestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_initial_test(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TestResponse>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    get_test(&state.db, id, TestType::Initial).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/{id}/tests/initial",
    tag = "Tests",
    operation_id = "saveInitialTest",
    summary = "Create or replace the initial test of a lesson",
    description = "Stores the question list. Every question needs non-empty text, exactly four non-empty options and a correct answer in 0-3. Saving keeps the test ID, so earlier results are re-graded against the new key. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = UpsertTestRequest,
    responses(
        (status = 200, description = "Saved test", body = TestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(questions = payload.questions.len()))]
pub async fn save_initial_test(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertTestRequest>,
) -> Result<Json<TestResponse>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    save_test(&state, id, TestType::Initial, payload).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/{id}/tests/final",
    tag = "Tests",
    operation_id = "getFinalTest",
    summary = "Get the final test of a lesson",
    description = "Returns the final test with its answer key. `id` is null when none has been saved. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Final test", body = TestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_final_test(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TestResponse>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    get_test(&state.db, id, TestType::Final).await.map(Json)
}

#[utoipa::path(
    put,
    path = "/{id}/tests/final",
    tag = "Tests",
    operation_id = "saveFinalTest",
    summary = "Create or replace the final test of a lesson",
    description = "Stores the question list with the same rules as the initial test. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = UpsertTestRequest,
    responses(
        (status = 200, description = "Saved test", body = TestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(questions = payload.questions.len()))]
pub async fn save_final_test(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertTestRequest>,
) -> Result<Json<TestResponse>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    save_test(&state, id, TestType::Final, payload).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/{id}/situational",
    tag = "Situational",
    operation_id = "listSituationalQuestions",
    summary = "List the situational questions of a lesson",
    description = "Returns the questions in display order, each with its weighted answers. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Situational questions", body = Vec<SituationalQuestionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_situational(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SituationalQuestionResponse>>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    find_lesson(&state.db, id).await?;

    let questions = situational_question::Entity::find()
        .filter(situational_question::Column::LessonId.eq(id))
        .order_by_asc(situational_question::Column::Position)
        .order_by_asc(situational_question::Column::Id)
        .all(&state.db)
        .await?;

    let data = questions
        .into_iter()
        .map(SituationalQuestionResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(data))
}

#[utoipa::path(
    put,
    path = "/{id}/situational",
    tag = "Situational",
    operation_id = "replaceSituationalQuestions",
    summary = "Replace the situational questions of a lesson",
    description = "Saves the full ordered question list in one transaction. Prompts need at least 10 characters; each question has 2-6 answers with text of at least 5 characters, a conclusion of at least 10 characters and a weight of 0-5. Questions missing from the list are deleted along with their recorded answers. Requires `lesson:manage` permission.",
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = ReplaceSituationalRequest,
    responses(
        (status = 200, description = "Saved questions", body = Vec<SituationalQuestionResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.questions.len()))]
pub async fn replace_situational(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReplaceSituationalRequest>,
) -> Result<Json<Vec<SituationalQuestionResponse>>, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;
    validate_replace_situational(&payload)?;

    let txn = state.db.begin().await?;
    find_lesson(&txn, id).await?;

    let mut existing: HashMap<i32, situational_question::Model> =
        situational_question::Entity::find()
            .filter(situational_question::Column::LessonId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

    let kept: HashSet<i32> = payload
        .questions
        .iter()
        .filter_map(|q| q.id)
        .filter(|question_id| existing.contains_key(question_id))
        .collect();
    let removed: Vec<i32> = existing
        .keys()
        .copied()
        .filter(|question_id| !kept.contains(question_id))
        .collect();
    if !removed.is_empty() {
        situational_result::Entity::delete_many()
            .filter(situational_result::Column::SituationalQuestionId.is_in(removed.clone()))
            .exec(&txn)
            .await?;
        situational_question::Entity::delete_many()
            .filter(situational_question::Column::Id.is_in(removed))
            .exec(&txn)
            .await?;
    }

    let now = chrono::Utc::now();
    let mut saved = Vec::with_capacity(payload.questions.len());
    for (position, input) in payload.questions.into_iter().enumerate() {
        let answers: Vec<_> = input.answers.iter().map(|a| a.trimmed()).collect();
        let answers_json = to_json_column(&answers)?;
        let current = input.id.and_then(|question_id| existing.remove(&question_id));
        let model = match current {
            Some(current) => {
                let mut active: situational_question::ActiveModel = current.into();
                active.question = Set(input.question.trim().to_string());
                active.answers = Set(answers_json);
                active.position = Set(position as i32);
                active.update(&txn).await?
            }
            None => {
                situational_question::ActiveModel {
                    lesson_id: Set(id),
                    question: Set(input.question.trim().to_string()),
                    answers: Set(answers_json),
                    position: Set(position as i32),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };
        saved.push(SituationalQuestionResponse::try_from(model)?);
    }

    txn.commit().await?;
    Ok(Json(saved))
}

#[utoipa::path(
    delete,
    path = "/{id}/situational/{question_id}",
    tag = "Situational",
    operation_id = "deleteSituationalQuestion",
    summary = "Delete one situational question",
    description = "Deletes the question and every recorded answer to it. Requires `lesson:manage` permission.",
    params(
        ("id" = i32, Path, description = "Lesson ID"),
        ("question_id" = i32, Path, description = "Situational question ID"),
    ),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found in this lesson (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_situational(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, question_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(LESSON_MANAGE)?;

    let txn = state.db.begin().await?;
    find_situational_question(&txn, id, question_id).await?;

    situational_result::Entity::delete_many()
        .filter(situational_result::Column::SituationalQuestionId.eq(question_id))
        .exec(&txn)
        .await?;
    situational_question::Entity::delete_by_id(question_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_test<C: ConnectionTrait>(
    db: &C,
    lesson_id: i32,
    test_type: TestType,
) -> Result<TestResponse, AppError> {
    find_lesson(db, lesson_id).await?;
    match find_test_by_type(db, lesson_id, test_type).await? {
        Some(test) => test_response(test),
        None => Ok(TestResponse::empty(lesson_id, test_type)),
    }
}

async fn save_test(
    state: &AppState,
    lesson_id: i32,
    test_type: TestType,
    payload: UpsertTestRequest,
) -> Result<TestResponse, AppError> {
    validate_upsert_test(&payload)?;
    let questions: Vec<_> = payload.questions.iter().map(|q| q.trimmed()).collect();
    let questions_json = to_json_column(&questions)?;

    let txn = state.db.begin().await?;
    find_lesson(&txn, lesson_id).await?;

    let now = chrono::Utc::now();
    let model = match find_test_by_type(&txn, lesson_id, test_type).await? {
        Some(existing) => {
            let mut active: lesson_test::ActiveModel = existing.into();
            active.questions = Set(questions_json);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            lesson_test::ActiveModel {
                lesson_id: Set(lesson_id),
                test_type: Set(test_type),
                questions: Set(questions_json),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;
    info!(test_id = model.id, %test_type, "Test saved");
    test_response(model)
}

fn test_response(model: lesson_test::Model) -> Result<TestResponse, AppError> {
    Ok(TestResponse {
        questions: test_questions(&model)?,
        id: Some(model.id),
        lesson_id: model.lesson_id,
        test_type: model.test_type,
        updated_at: Some(model.updated_at),
    })
}

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::TestType;
use common::content::{LessonInventory, SituationalAnswer};
use common::progress::{
    Advance, ProgressState, apply_test_submission, ensure_advance_unlocked, ensure_test_unlocked,
    plan_advance, validate_advance_step,
};
use common::results::{
    ScoreComparison, average_score, correct_in, question_breakdown, situational_summary,
};
use common::scoring::{score_multiple_choice, situational_score, validate_weight};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, info, instrument};

use crate::entity::{
    lesson, lesson_test, situational_question, situational_result, student_progress, test_result,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, LESSON_STUDY};
use crate::extractors::json::AppJson;
use crate::models::shared::{SuccessResponse, from_json_column, to_json_column};
use crate::models::student::*;
use crate::state::AppState;
use crate::utils::lesson::{
    find_lesson, find_lesson_test, find_progress, find_situational_question, find_test_by_type,
    latest_result, lesson_inventories, lesson_test_ids, test_questions,
};

/// Most recently completed lessons shown on the dashboard.
const RECENT_LESSONS: usize = 5;

#[utoipa::path(
    get,
    path = "/lessons",
    tag = "Student",
    operation_id = "listStudentLessons",
    summary = "List published lessons",
    description = "Returns the lessons that have every part of the 4-step sequence, newest first, with the caller's current step. Requires `lesson:study` permission.",
    responses(
        (status = 200, description = "Published lessons", body = Vec<StudentLessonItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_lessons(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentLessonItem>>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let lessons = lesson::Entity::find()
        .order_by_desc(lesson::Column::CreatedAt)
        .order_by_desc(lesson::Column::Id)
        .all(&state.db)
        .await?;
    let ids: Vec<i32> = lessons.iter().map(|l| l.id).collect();
    let inventories = lesson_inventories(&state.db, &ids).await?;

    let progress: HashMap<i32, student_progress::Model> = student_progress::Entity::find()
        .filter(student_progress::Column::UserId.eq(auth_user.user_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.lesson_id, p))
        .collect();

    let data = lessons
        .into_iter()
        .filter_map(|l| {
            let inventory: LessonInventory = inventories.get(&l.id).copied().unwrap_or_default();
            if !inventory.is_published() {
                return None;
            }
            let snapshot = snapshot_of(progress.get(&l.id));
            Some(StudentLessonItem {
                id: l.id,
                title: l.title,
                description: l.description,
                lecture_count: inventory.lecture_count,
                situational_count: inventory.situational_count,
                current_step: snapshot.current_step,
                completed_at: snapshot.completed_at,
            })
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/lessons/{lesson_id}/progress",
    tag = "Student",
    operation_id = "getProgress",
    summary = "Get the caller's progress in a lesson",
    description = "Returns the stored step and completion time together with the state of each of the four steps. A lesson that was never started reports step 0 with only the initial test open. Requires `lesson:study` permission.",
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Progress", body = ProgressResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<ProgressResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let row = find_progress(&state.db, auth_user.user_id, lesson_id).await?;
    Ok(Json(snapshot_of(row.as_ref()).into()))
}

#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/progress",
    tag = "Student",
    operation_id = "advanceStep",
    summary = "Advance to a later step",
    description = "Moves the caller to step 2, 3 or 4. Progress never moves backwards: a request for a step at or before the current one succeeds with `advanced: false`. With `progress.enforce_step_order` enabled, advancing past a step that is still locked fails with STEP_LOCKED. Requires `lesson:study` permission.",
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    request_body = AdvanceStepRequest,
    responses(
        (status = 200, description = "Step recorded", body = AdvanceStepResponse),
        (status = 400, description = "Step outside 2-4 (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Step is locked (STEP_LOCKED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, step = payload.step))]
pub async fn advance_step(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
    AppJson(payload): AppJson<AdvanceStepRequest>,
) -> Result<Json<AdvanceStepResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;
    let step = validate_advance_step(payload.step)?;

    let txn = state.db.begin().await?;
    find_lesson(&txn, lesson_id).await?;

    let existing = find_progress(&txn, auth_user.user_id, lesson_id).await?;
    if state.config.progress.enforce_step_order {
        ensure_advance_unlocked(&snapshot_of(existing.as_ref()), step)?;
    }

    let current_step = match plan_advance(existing.as_ref().map(|p| p.current_step), step) {
        Advance::AlreadyReached(current) => {
            debug!(current, "Step already reached");
            return Ok(Json(AdvanceStepResponse {
                success: true,
                advanced: false,
                current_step: current,
            }));
        }
        Advance::Apply(target) => target,
    };

    let now = chrono::Utc::now();
    let row = student_progress::ActiveModel {
        user_id: Set(auth_user.user_id),
        lesson_id: Set(lesson_id),
        current_step: Set(current_step),
        completed_at: Set(None),
        started_at: Set(now),
        updated_at: Set(now),
    };
    student_progress::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                student_progress::Column::UserId,
                student_progress::Column::LessonId,
            ])
            .update_columns([
                student_progress::Column::CurrentStep,
                student_progress::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    info!(current_step, "Advanced lesson step");

    Ok(Json(AdvanceStepResponse {
        success: true,
        advanced: true,
        current_step,
    }))
}

#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/tests/{test_id}/submit",
    tag = "Student",
    operation_id = "submitTest",
    summary = "Submit answers to a lesson test",
    description = "Grades the answers against the test's key and stores the result. Submitting the initial test moves the caller to step 2; submitting the final test moves them to step 4 and completes the lesson. The result and the progress change are written in one transaction. Requires `lesson:study` permission.",
    params(
        ("lesson_id" = i32, Path, description = "Lesson ID"),
        ("test_id" = i32, Path, description = "Test ID"),
    ),
    request_body = SubmitTestRequest,
    responses(
        (status = 201, description = "Result recorded", body = SubmitTestResponse),
        (status = 400, description = "Answer count does not match question count (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Test not found in this lesson (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Step is locked (STEP_LOCKED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_test(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((lesson_id, test_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let test = find_lesson_test(&state.db, lesson_id, test_id).await?;
    let key: Vec<i32> = test_questions(&test)?
        .iter()
        .map(|q| q.correct_answer)
        .collect();
    let graded = score_multiple_choice(&payload.answers, &key)?;
    let answers_json = to_json_column(&payload.answers)?;

    let txn = state.db.begin().await?;

    let existing = find_progress(&txn, auth_user.user_id, lesson_id).await?;
    if state.config.progress.enforce_step_order {
        ensure_test_unlocked(&snapshot_of(existing.as_ref()), test.test_type)?;
    }

    let now = chrono::Utc::now();
    let result = test_result::ActiveModel {
        user_id: Set(auth_user.user_id),
        test_id: Set(test.id),
        answers: Set(answers_json),
        score: Set(graded.score),
        completed_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let next = apply_test_submission(
        existing.as_ref().map(|p| ProgressState {
            current_step: p.current_step,
            completed_at: p.completed_at,
        }),
        test.test_type,
        state.config.progress.resubmission,
        now,
    );
    let row = student_progress::ActiveModel {
        user_id: Set(auth_user.user_id),
        lesson_id: Set(lesson_id),
        current_step: Set(next.current_step),
        completed_at: Set(next.completed_at),
        started_at: Set(now),
        updated_at: Set(now),
    };
    student_progress::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                student_progress::Column::UserId,
                student_progress::Column::LessonId,
            ])
            .update_columns([
                student_progress::Column::CurrentStep,
                student_progress::Column::CompletedAt,
                student_progress::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    info!(
        result_id = result.id,
        test_type = %test.test_type,
        score = graded.score,
        current_step = next.current_step,
        "Test submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitTestResponse {
            result_id: result.id,
            score: graded.score,
            correct_count: graded.correct_count,
            total_questions: graded.total_questions,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/situational/{question_id}/answer",
    tag = "Student",
    operation_id = "answerSituational",
    summary = "Answer a situational question",
    description = "Records the caller's choice; the score is the weight the admin gave that answer. Answering again replaces the earlier choice. A `score` sent by the client must be 0-5 and equal the stored weight. Does not change lesson progress. Requires `lesson:study` permission.",
    params(
        ("lesson_id" = i32, Path, description = "Lesson ID"),
        ("question_id" = i32, Path, description = "Situational question ID"),
    ),
    request_body = SituationalAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SituationalAnswerResponse),
        (status = 400, description = "Unknown answer or score mismatch (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found in this lesson (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, selected = payload.selected_index))]
pub async fn answer_situational(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((lesson_id, question_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<SituationalAnswerRequest>,
) -> Result<Json<SituationalAnswerResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let question = find_situational_question(&state.db, lesson_id, question_id).await?;
    let answers: Vec<SituationalAnswer> = from_json_column(&question.answers)?;
    let weight = situational_score(&answers, payload.selected_index)?;
    if let Some(claimed) = payload.score {
        validate_weight(claimed)?;
        if claimed != weight {
            return Err(AppError::Validation(
                "Score does not match the selected answer".into(),
            ));
        }
    }

    let row = situational_result::ActiveModel {
        user_id: Set(auth_user.user_id),
        lesson_id: Set(lesson_id),
        situational_question_id: Set(question_id),
        selected_index: Set(payload.selected_index),
        score: Set(weight),
        answered_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    situational_result::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                situational_result::Column::UserId,
                situational_result::Column::SituationalQuestionId,
            ])
            .update_columns([
                situational_result::Column::SelectedIndex,
                situational_result::Column::Score,
                situational_result::Column::AnsweredAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;

    Ok(Json(SituationalAnswerResponse {
        success: true,
        score: weight,
    }))
}

#[utoipa::path(
    delete,
    path = "/lessons/{lesson_id}/restart",
    tag = "Student",
    operation_id = "restartLesson",
    summary = "Restart a lesson",
    description = "Deletes the caller's test results, situational answers and progress for the lesson in one transaction. Succeeds even when there is nothing to delete. Requires `lesson:study` permission.",
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson restarted", body = SuccessResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn restart_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let txn = state.db.begin().await?;

    let results = test_result::Entity::delete_many()
        .filter(test_result::Column::UserId.eq(auth_user.user_id))
        .filter(test_result::Column::TestId.in_subquery(lesson_test_ids(lesson_id)))
        .exec(&txn)
        .await?;
    let answers = situational_result::Entity::delete_many()
        .filter(situational_result::Column::UserId.eq(auth_user.user_id))
        .filter(situational_result::Column::LessonId.eq(lesson_id))
        .exec(&txn)
        .await?;
    student_progress::Entity::delete_by_id((auth_user.user_id, lesson_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(
        test_results = results.rows_affected,
        situational_results = answers.rows_affected,
        "Lesson restarted"
    );

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/lessons/{lesson_id}/results",
    tag = "Student",
    operation_id = "getLessonResults",
    summary = "Get the caller's results for a lesson",
    description = "Returns the latest initial and final test attempts with a per-question breakdown, every situational question with the caller's choice, the situational total and the initial/final comparison. The breakdown and `correct_count` use the current answer key; `score` is the value stored at submission. Requires `lesson:study` permission.",
    params(("lesson_id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson results", body = LessonResultsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<LessonResultsResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let lesson = find_lesson(&state.db, lesson_id).await?;
    let progress = find_progress(&state.db, auth_user.user_id, lesson_id).await?;

    let initial_test =
        test_detail(&state.db, auth_user.user_id, lesson_id, TestType::Initial).await?;
    let final_test = test_detail(&state.db, auth_user.user_id, lesson_id, TestType::Final).await?;

    let questions = situational_question::Entity::find()
        .filter(situational_question::Column::LessonId.eq(lesson_id))
        .order_by_asc(situational_question::Column::Position)
        .order_by_asc(situational_question::Column::Id)
        .all(&state.db)
        .await?;
    let chosen: HashMap<i32, situational_result::Model> = situational_result::Entity::find()
        .filter(situational_result::Column::UserId.eq(auth_user.user_id))
        .filter(situational_result::Column::LessonId.eq(lesson_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|r| (r.situational_question_id, r))
        .collect();

    let mut situational = Vec::with_capacity(questions.len());
    for q in questions {
        let answers: Vec<SituationalAnswer> = from_json_column(&q.answers)?;
        let choice = chosen.get(&q.id);
        let conclusion = choice
            .and_then(|c| usize::try_from(c.selected_index).ok())
            .and_then(|i| answers.get(i))
            .map(|a| a.conclusion.clone());
        situational.push(SituationalResultItem {
            question_id: q.id,
            position: q.position,
            question: q.question,
            answers,
            selected_index: choice.map(|c| c.selected_index),
            score: choice.map(|c| c.score),
            conclusion,
        });
    }
    let scores: Vec<Option<i32>> = situational.iter().map(|s| s.score).collect();

    let comparison = ScoreComparison::new(
        initial_test.as_ref().map(|t| t.score),
        final_test.as_ref().map(|t| t.score),
    );

    Ok(Json(LessonResultsResponse {
        lesson: LessonRef {
            id: lesson.id,
            title: lesson.title,
        },
        progress: snapshot_of(progress.as_ref()).into(),
        initial_test,
        final_test,
        situational_summary: situational_summary(&scores),
        situational,
        comparison,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Student",
    operation_id = "getDashboard",
    summary = "Get the caller's dashboard",
    description = "Returns completed and in-progress lesson counts, the average of all test scores, the five most recently completed lessons with their latest initial and final scores, and the unfinished lesson the caller is furthest along in. Requires `lesson:study` permission.",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    auth_user.require_permission(LESSON_STUDY)?;

    let progress = student_progress::Entity::find()
        .filter(student_progress::Column::UserId.eq(auth_user.user_id))
        .all(&state.db)
        .await?;

    let lesson_ids: Vec<i32> = progress.iter().map(|p| p.lesson_id).collect();
    let titles: HashMap<i32, String> = if lesson_ids.is_empty() {
        HashMap::new()
    } else {
        lesson::Entity::find()
            .filter(lesson::Column::Id.is_in(lesson_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|l| (l.id, l.title))
            .collect()
    };

    let results = test_result::Entity::find()
        .filter(test_result::Column::UserId.eq(auth_user.user_id))
        .order_by_asc(test_result::Column::CompletedAt)
        .order_by_asc(test_result::Column::Id)
        .all(&state.db)
        .await?;
    let all_scores: Vec<f64> = results.iter().map(|r| r.score).collect();

    let test_ids: Vec<i32> = results.iter().map(|r| r.test_id).collect();
    let tests: HashMap<i32, (i32, TestType)> = if test_ids.is_empty() {
        HashMap::new()
    } else {
        lesson_test::Entity::find()
            .filter(lesson_test::Column::Id.is_in(test_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|t| (t.id, (t.lesson_id, t.test_type)))
            .collect()
    };

    // Ascending order, so later attempts overwrite earlier ones.
    let mut latest: HashMap<(i32, TestType), f64> = HashMap::new();
    for r in &results {
        if let Some(&key) = tests.get(&r.test_id) {
            latest.insert(key, r.score);
        }
    }

    let mut completed: Vec<&student_progress::Model> =
        progress.iter().filter(|p| p.completed_at.is_some()).collect();
    completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    let in_progress: Vec<&student_progress::Model> = progress
        .iter()
        .filter(|p| p.completed_at.is_none() && p.current_step > 0)
        .collect();

    let title_of = |lesson_id: i32| titles.get(&lesson_id).cloned().unwrap_or_default();

    let recent_lessons = completed
        .iter()
        .take(RECENT_LESSONS)
        .map(|p| RecentLesson {
            lesson_id: p.lesson_id,
            title: title_of(p.lesson_id),
            completed_at: p.completed_at,
            initial_score: latest.get(&(p.lesson_id, TestType::Initial)).copied(),
            final_score: latest.get(&(p.lesson_id, TestType::Final)).copied(),
        })
        .collect();

    let next_lesson = in_progress
        .iter()
        .max_by(|a, b| {
            a.current_step
                .cmp(&b.current_step)
                .then(a.updated_at.cmp(&b.updated_at))
        })
        .map(|p| NextLesson {
            lesson_id: p.lesson_id,
            title: title_of(p.lesson_id),
            current_step: p.current_step,
        });

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            completed_count: completed.len() as u64,
            in_progress_count: in_progress.len() as u64,
            average_score: average_score(&all_scores),
            lessons_attempted: progress.len() as u64,
        },
        recent_lessons,
        next_lesson,
    }))
}

/// Latest attempt at the lesson's test of `test_type`, re-graded against the current key.
async fn test_detail<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    lesson_id: i32,
    test_type: TestType,
) -> Result<Option<TestResultDetail>, AppError> {
    let Some(test) = find_test_by_type(db, lesson_id, test_type).await? else {
        return Ok(None);
    };
    let Some(result) = latest_result(db, user_id, test.id).await? else {
        return Ok(None);
    };

    let questions = test_questions(&test)?;
    let submitted: Vec<i32> = from_json_column(&result.answers)?;
    let breakdown = question_breakdown(&questions, &submitted);

    Ok(Some(TestResultDetail {
        result_id: result.id,
        test_id: test.id,
        score: result.score,
        correct_count: correct_in(&breakdown),
        total_questions: questions.len(),
        completed_at: result.completed_at,
        questions: breakdown,
    }))
}

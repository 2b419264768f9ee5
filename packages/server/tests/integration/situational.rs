use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn score_is_the_weight_of_the_chosen_answer() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    let res = app
        .post_with_token(
            &routes::answer(lesson.id, lesson.situational[0]),
            &json!({"selected_index": 1}),
            &student,
        )
        .await;

    assert_eq!(res.status, 200, "answer failed: {}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["score"], 2);
}

#[tokio::test]
async fn answering_again_replaces_the_earlier_choice() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;
    let question = lesson.situational[0];

    for selected in [2, 0] {
        let res = app
            .post_with_token(
                &routes::answer(lesson.id, question),
                &json!({"selected_index": selected}),
                &student,
            )
            .await;
        assert_eq!(res.status, 200, "answer failed: {}", res.text);
    }

    let results = app.get_with_token(&routes::results(lesson.id), &student).await;
    let first = &results.body["situational"][0];
    assert_eq!(first["question_id"], question);
    assert_eq!(first["selected_index"], 0);
    assert_eq!(first["score"], 5);
    assert_eq!(results.body["situational_summary"]["answered"], 1);
    assert_eq!(results.body["situational_summary"]["total_score"], 5);
}

#[tokio::test]
async fn matching_client_score_is_accepted() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    let res = app
        .post_with_token(
            &routes::answer(lesson.id, lesson.situational[1]),
            &json!({"selected_index": 1, "score": 4}),
            &student,
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["score"], 4);
}

#[tokio::test]
async fn client_score_that_differs_from_weight_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    let res = app
        .post_with_token(
            &routes::answer(lesson.id, lesson.situational[0]),
            &json!({"selected_index": 0, "score": 3}),
            &student,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn client_score_above_five_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    let res = app
        .post_with_token(
            &routes::answer(lesson.id, lesson.situational[0]),
            &json!({"selected_index": 0, "score": 7}),
            &student,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn unknown_answer_index_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    let res = app
        .post_with_token(
            &routes::answer(lesson.id, lesson.situational[1]),
            &json!({"selected_index": 2}),
            &student,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn question_from_another_lesson_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let first = app.create_published_lesson(&admin, "Intro to HTML").await;
    let second = app.create_published_lesson(&admin, "Intro to CSS").await;

    let res = app
        .post_with_token(
            &routes::answer(second.id, first.situational[0]),
            &json!({"selected_index": 0}),
            &student,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn answering_does_not_change_progress() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

    app.post_with_token(
        &routes::answer(lesson.id, lesson.situational[0]),
        &json!({"selected_index": 0}),
        &student,
    )
    .await;

    let progress = app.get_with_token(&routes::progress(lesson.id), &student).await;
    assert_eq!(progress.body["current_step"], 0);
}

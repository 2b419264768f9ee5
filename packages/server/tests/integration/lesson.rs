use serde_json::json;

use crate::common::{TestApp, questions, routes, situational_question};

mod authoring {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_and_fetch_a_lesson() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let id = app.create_lesson(&admin, "Intro to HTML").await;
        let res = app.get_with_token(&routes::lesson(id), &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Intro to HTML");
        assert_eq!(res.body["description"], "Basics of HTML markup.");
    }

    #[tokio::test]
    async fn student_cannot_author_lessons() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(
                routes::LESSONS,
                &json!({"title": "Sneaky", "description": "Not allowed."}),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app
            .post_with_token(
                routes::LESSONS,
                &json!({"title": "   ", "description": "Something."}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let res = app
            .patch_with_token(&routes::lesson(id), &json!({"title": "HTML 101"}), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "HTML 101");
        assert_eq!(res.body["description"], "Basics of HTML markup.");
    }

    #[tokio::test]
    async fn missing_lesson_returns_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app.get_with_token(&routes::lesson(9999), &admin).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn lesson_is_published_once_all_parts_exist() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let list = app.get_with_token(routes::LESSONS, &admin).await;
        assert_eq!(list.body[0]["is_published"], false);

        app.save_test(&routes::initial_test(id), &[0, 1], &admin).await;
        app.save_lectures(id, &["Tags"], &admin).await;
        app.save_situational(id, &[&[5, 0]], &admin).await;
        let partial = app.get_with_token(routes::LESSONS, &admin).await;
        assert_eq!(partial.body[0]["is_published"], false);
        assert_eq!(partial.body[0]["lecture_count"], 1);

        app.save_test(&routes::final_test(id), &[3], &admin).await;
        let full = app.get_with_token(routes::LESSONS, &admin).await;
        assert_eq!(full.body[0]["is_published"], true);
        assert_eq!(full.body[0]["has_final_test"], true);
    }

    #[tokio::test]
    async fn deleting_a_lesson_removes_student_data() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        let submit = app
            .post_with_token(
                &routes::submit(lesson.id, lesson.initial_test),
                &json!({"answers": [0, 1, 3]}),
                &student,
            )
            .await;
        assert_eq!(submit.status, 201, "submit failed: {}", submit.text);

        let res = app.delete_with_token(&routes::lesson(lesson.id), &admin).await;
        assert_eq!(res.status, 204);

        let progress = app.get_with_token(&routes::progress(lesson.id), &student).await;
        assert_eq!(progress.status, 200);
        assert_eq!(progress.body["current_step"], 0);

        let dashboard = app.get_with_token(routes::DASHBOARD, &student).await;
        assert_eq!(dashboard.body["stats"]["lessons_attempted"], 0);
        assert_eq!(dashboard.body["stats"]["average_score"], json!(null));
    }
}

mod tests_and_content {
    use super::*;

    #[tokio::test]
    async fn missing_test_reads_as_empty() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let res = app.get_with_token(&routes::final_test(id), &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], json!(null));
        assert_eq!(res.body["test_type"], "FINAL");
        assert_eq!(res.body["questions"], json!([]));
    }

    #[tokio::test]
    async fn saving_a_test_again_keeps_its_id() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let first = app.save_test(&routes::initial_test(id), &[0, 1], &admin).await;
        let second = app
            .save_test(&routes::initial_test(id), &[2, 2, 2], &admin)
            .await;

        assert_eq!(first, second);
        let res = app.get_with_token(&routes::initial_test(id), &admin).await;
        assert_eq!(res.body["questions"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn question_with_three_options_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let res = app
            .put_with_token(
                &routes::initial_test(id),
                &json!({"questions": [{
                    "question": "Pick one",
                    "options": ["a", "b", "c"],
                    "correct_answer": 0,
                }]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn correct_answer_outside_options_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let res = app
            .put_with_token(
                &routes::final_test(id),
                &json!({"questions": questions(&[4])}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn situational_weight_above_five_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let res = app
            .put_with_token(
                &routes::situational(id),
                &json!({"questions": [situational_question(1, &[6, 1])]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn replacing_lectures_keeps_ids_and_follows_array_order() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;

        let saved = app.save_lectures(id, &["Tags", "Attributes"], &admin).await;
        let tags_id = saved[0]["id"].clone();

        let res = app
            .put_with_token(
                &routes::lectures(id),
                &json!({"lectures": [
                    {"title": "Forms", "description": "Inputs and labels."},
                    {"id": tags_id, "title": "Tags, revisited", "description": "Again."},
                ]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "replace failed: {}", res.text);
        let lectures = app.get_with_token(&routes::lectures(id), &admin).await;
        let list = lectures.body.as_array().expect("lectures should be an array");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["title"], "Forms");
        assert_eq!(list[1]["id"], tags_id);
        assert_eq!(list[1]["title"], "Tags, revisited");
    }

    #[tokio::test]
    async fn deleting_a_situational_question_removes_it() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app.create_lesson(&admin, "Intro to HTML").await;
        let ids = app.save_situational(id, &[&[5, 0], &[3, 1]], &admin).await;

        let res = app
            .delete_with_token(&routes::situational_question(id, ids[0]), &admin)
            .await;
        assert_eq!(res.status, 204);

        let list = app.get_with_token(&routes::situational(id), &admin).await;
        let remaining: Vec<i64> = list
            .body
            .as_array()
            .expect("situational list should be an array")
            .iter()
            .filter_map(|q| q["id"].as_i64())
            .collect();
        assert_eq!(remaining, vec![ids[1] as i64]);
    }
}

mod student_catalog {
    use super::*;

    #[tokio::test]
    async fn students_only_see_published_lessons() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let published = app.create_published_lesson(&admin, "Intro to HTML").await;
        app.create_lesson(&admin, "Draft lesson").await;

        let res = app.get_with_token(routes::STUDENT_LESSONS, &student).await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().expect("lessons should be an array");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], published.id);
        assert_eq!(list[0]["current_step"], 0);
        assert_eq!(list[0]["lecture_count"], 2);
    }
}

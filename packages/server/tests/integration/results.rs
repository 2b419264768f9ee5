use serde_json::json;

use crate::common::{TestApp, questions, routes};

mod lesson_results {
    use super::*;

    #[tokio::test]
    async fn results_combine_tests_situational_and_comparison() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        app.post_with_token(
            &routes::submit(lesson.id, lesson.initial_test),
            &json!({"answers": [0, 1, 2]}),
            &student,
        )
        .await;
        app.post_with_token(
            &routes::answer(lesson.id, lesson.situational[1]),
            &json!({"selected_index": 1}),
            &student,
        )
        .await;
        app.post_with_token(
            &routes::submit(lesson.id, lesson.final_test),
            &json!({"answers": [2, 2]}),
            &student,
        )
        .await;

        let res = app.get_with_token(&routes::results(lesson.id), &student).await;

        assert_eq!(res.status, 200, "results failed: {}", res.text);
        assert_eq!(res.body["lesson"]["title"], "Intro to HTML");
        assert_eq!(res.body["progress"]["current_step"], 4);

        let initial = &res.body["initial_test"];
        assert_eq!(initial["correct_count"], 2);
        assert_eq!(initial["total_questions"], 3);
        assert_eq!(initial["questions"][2]["user_answer"], 2);
        assert_eq!(initial["questions"][2]["is_correct"], false);

        assert_eq!(res.body["final_test"]["score"], json!(100.0));

        let situational = res.body["situational"]
            .as_array()
            .expect("situational should be an array");
        assert_eq!(situational.len(), 2);
        assert_eq!(situational[0]["selected_index"], json!(null));
        assert_eq!(situational[1]["score"], 4);
        assert_eq!(
            situational[1]["conclusion"],
            "Conclusion for option 2 of question 2"
        );
        assert_eq!(res.body["situational_summary"]["total_score"], 4);
        assert_eq!(res.body["situational_summary"]["max_score"], 10);

        assert_eq!(res.body["comparison"]["initial_score"], json!(66.7));
        assert_eq!(res.body["comparison"]["final_score"], json!(100.0));
        assert_eq!(res.body["comparison"]["improvement"], json!(33.3));
    }

    #[tokio::test]
    async fn editing_the_key_regrades_breakdown_but_not_score() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        app.post_with_token(
            &routes::submit(lesson.id, lesson.initial_test),
            &json!({"answers": [0, 1, 2]}),
            &student,
        )
        .await;

        let saved = app
            .put_with_token(
                &routes::initial_test(lesson.id),
                &json!({"questions": questions(&[0, 1, 2])}),
                &admin,
            )
            .await;
        assert_eq!(saved.status, 200);
        assert_eq!(saved.body["id"], lesson.initial_test);

        let res = app.get_with_token(&routes::results(lesson.id), &student).await;
        let initial = &res.body["initial_test"];
        assert_eq!(initial["correct_count"], 3);
        assert_eq!(initial["questions"][2]["is_correct"], true);
        let score = initial["score"].as_f64().expect("score should be a number");
        assert!((score - 66.67).abs() < 0.01, "score was {score}");
    }

    #[tokio::test]
    async fn latest_attempt_is_reported() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        for answers in [json!([0, 0, 0]), json!([0, 1, 3])] {
            app.post_with_token(
                &routes::submit(lesson.id, lesson.initial_test),
                &json!({ "answers": answers }),
                &student,
            )
            .await;
        }

        let res = app.get_with_token(&routes::results(lesson.id), &student).await;
        assert_eq!(res.body["initial_test"]["score"], json!(100.0));
        assert_eq!(res.body["final_test"], json!(null));
        assert_eq!(res.body["comparison"]["improvement"], json!(null));
    }

    #[tokio::test]
    async fn results_for_missing_lesson_are_not_found() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app.get_with_token(&routes::results(9999), &student).await;

        assert_eq!(res.status, 404);
    }
}

mod restart {
    use super::*;

    #[tokio::test]
    async fn restart_clears_results_answers_and_progress() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        app.post_with_token(
            &routes::submit(lesson.id, lesson.initial_test),
            &json!({"answers": [0, 1, 3]}),
            &student,
        )
        .await;
        app.post_with_token(
            &routes::answer(lesson.id, lesson.situational[0]),
            &json!({"selected_index": 0}),
            &student,
        )
        .await;

        let res = app.delete_with_token(&routes::restart(lesson.id), &student).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);

        let progress = app.get_with_token(&routes::progress(lesson.id), &student).await;
        assert_eq!(progress.body["current_step"], 0);
        assert_eq!(
            progress.body["steps"][0]["state"], "current",
            "restarted lesson should open the initial test"
        );

        let results = app.get_with_token(&routes::results(lesson.id), &student).await;
        assert_eq!(results.body["initial_test"], json!(null));
        assert_eq!(results.body["situational_summary"]["answered"], 0);
    }

    #[tokio::test]
    async fn restart_leaves_other_students_untouched() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let lesson = app.create_published_lesson(&admin, "Intro to HTML").await;

        for token in [&alice, &bob] {
            app.post_with_token(
                &routes::submit(lesson.id, lesson.initial_test),
                &json!({"answers": [0, 1, 3]}),
                token,
            )
            .await;
        }

        app.delete_with_token(&routes::restart(lesson.id), &alice).await;

        let bob_progress = app.get_with_token(&routes::progress(lesson.id), &bob).await;
        assert_eq!(bob_progress.body["current_step"], 2);
        let bob_results = app.get_with_token(&routes::results(lesson.id), &bob).await;
        assert_eq!(bob_results.body["initial_test"]["score"], json!(100.0));
    }

    #[tokio::test]
    async fn restarting_an_untouched_lesson_succeeds() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app.delete_with_token(&routes::restart(9999), &student).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn empty_dashboard_for_new_student() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app.get_with_token(routes::DASHBOARD, &student).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["stats"]["completed_count"], 0);
        assert_eq!(res.body["stats"]["in_progress_count"], 0);
        assert_eq!(res.body["stats"]["average_score"], json!(null));
        assert_eq!(res.body["recent_lessons"], json!([]));
        assert_eq!(res.body["next_lesson"], json!(null));
    }

    #[tokio::test]
    async fn dashboard_summarises_completed_and_in_progress_lessons() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let done = app.create_published_lesson(&admin, "Intro to HTML").await;
        let started = app.create_published_lesson(&admin, "Intro to CSS").await;

        app.post_with_token(
            &routes::submit(done.id, done.initial_test),
            &json!({"answers": [0, 0, 0]}),
            &student,
        )
        .await;
        app.post_with_token(
            &routes::submit(done.id, done.final_test),
            &json!({"answers": [2, 2]}),
            &student,
        )
        .await;
        app.post_with_token(
            &routes::submit(started.id, started.initial_test),
            &json!({"answers": [0, 1, 3]}),
            &student,
        )
        .await;

        let res = app.get_with_token(routes::DASHBOARD, &student).await;

        assert_eq!(res.status, 200, "dashboard failed: {}", res.text);
        assert_eq!(res.body["stats"]["completed_count"], 1);
        assert_eq!(res.body["stats"]["in_progress_count"], 1);
        assert_eq!(res.body["stats"]["lessons_attempted"], 2);
        // (33.3.. + 100 + 100) / 3
        assert_eq!(res.body["stats"]["average_score"], json!(77.8));

        let recent = &res.body["recent_lessons"][0];
        assert_eq!(recent["lesson_id"], done.id);
        assert_eq!(recent["final_score"], json!(100.0));
        let initial = recent["initial_score"].as_f64().expect("initial score");
        assert!((initial - 33.33).abs() < 0.01);

        assert_eq!(res.body["next_lesson"]["lesson_id"], started.id);
        assert_eq!(res.body["next_lesson"]["current_step"], 2);
    }
}

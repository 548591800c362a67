// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recommendation batch and save-changes reconciliation tests.
//!
//! With no API key configured generation serves the built-in list of five
//! goals, which is exactly what the flow needs for round-trip coverage.

use axum::http::StatusCode;
use serde_json::json;
use wellness_tracker::models::{Difficulty, GoalCategory, GoalDraft};

mod common;

async fn seed_profile(state: &wellness_tracker::AppState, user_id: &str) {
    state
        .db
        .set_health_profile(wellness_tracker::models::HealthProfile {
            user_id: user_id.to_string(),
            age: 36,
            height_cm: 168.0,
            weight_kg: 61.5,
            gender: wellness_tracker::models::Gender::Other,
            fitness_level: wellness_tracker::models::FitnessLevel::Intermediate,
            existing_conditions: String::new(),
            allergies: String::new(),
            medications: String::new(),
            preferred_language: "en".to_string(),
        })
        .await
        .unwrap();
}

fn draft(goal: &str, difficulty: Difficulty) -> GoalDraft {
    GoalDraft {
        goal: goal.to_string(),
        category: GoalCategory::General,
        difficulty,
    }
}

#[tokio::test]
async fn test_generation_requires_health_profile() {
    let (app, state) = common::create_test_app();
    let (token, _) = common::seed_authenticated_user(&state, "ada@example.com").await;

    let (status, body) =
        common::post_json(&app, "/api/recommendations/generate", Some(&token), json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_generation_round_trip_and_replacement() {
    let (app, state) = common::create_test_app();
    let (token, user_id) = common::seed_authenticated_user(&state, "ada@example.com").await;
    seed_profile(&state, &user_id).await;

    let (status, body) =
        common::post_json(&app, "/api/recommendations/generate", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 5);
    assert!(recs.iter().all(|r| r["is_completed"] == false));

    let mut ids: Vec<&str> = recs.iter().map(|r| r["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    // GET returns the same batch.
    let (_, body) = common::get_json(&app, "/api/recommendations", Some(&token)).await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);

    // Regenerating replaces the batch wholesale: the prior five are gone.
    let (_, body) =
        common::post_json(&app, "/api/recommendations/generate", Some(&token), json!({})).await;
    let new_ids: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(new_ids.len(), 5);
    assert!(new_ids.iter().all(|id| !ids.contains(id)));
}

#[tokio::test]
async fn test_save_changes_credits_transitions_only() {
    let (app, state) = common::create_test_app();
    let (token, user_id) = common::seed_authenticated_user(&state, "ada@example.com").await;

    // Persisted baseline: A incomplete (Easy, 10), B complete (Medium, 25).
    let batch = state
        .db
        .replace_recommendations(
            &user_id,
            vec![draft("A", Difficulty::Easy), draft("B", Difficulty::Medium)],
        )
        .await
        .unwrap();
    let mut b_done = batch[1].clone();
    b_done.is_completed = true;
    state
        .db
        .update_recommendation_statuses(&[b_done])
        .await
        .unwrap();

    // Edited batch flips A to complete and B to incomplete.
    let edited = json!({
        "recommendations": [
            {
                "id": batch[0].id,
                "user_id": user_id,
                "goal": "A",
                "category": "General",
                "difficulty": "Easy",
                "is_completed": true,
            },
            {
                "id": batch[1].id,
                "user_id": user_id,
                "goal": "B",
                "category": "General",
                "difficulty": "Medium",
                "is_completed": false,
            },
        ]
    });

    let (status, body) = common::put_json(&app, "/api/recommendations", Some(&token), edited).await;

    // Exactly +10: A's transition earns, B's uncheck neither earns nor
    // refunds.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_earned"], 10);
    assert_eq!(body["points_total"], 10);

    let stored = state.db.get_recommendations(&user_id).await.unwrap();
    let a = stored.iter().find(|r| r.id == batch[0].id).unwrap();
    let b = stored.iter().find(|r| r.id == batch[1].id).unwrap();
    assert!(a.is_completed);
    assert!(!b.is_completed);
}

#[tokio::test]
async fn test_save_without_transitions_credits_nothing() {
    let (app, state) = common::create_test_app();
    let (token, user_id) = common::seed_authenticated_user(&state, "ada@example.com").await;

    let batch = state
        .db
        .replace_recommendations(&user_id, vec![draft("A", Difficulty::Hard)])
        .await
        .unwrap();

    let edited = json!({
        "recommendations": [{
            "id": batch[0].id,
            "user_id": user_id,
            "goal": "A",
            "category": "General",
            "difficulty": "Hard",
            "is_completed": false,
        }]
    });

    let (status, body) = common::put_json(&app, "/api/recommendations", Some(&token), edited).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_earned"], 0);
    assert_eq!(body["points_total"], 0);
}

#[tokio::test]
async fn test_save_diffs_against_persisted_baseline_not_client_state() {
    let (app, state) = common::create_test_app();
    let (token, user_id) = common::seed_authenticated_user(&state, "ada@example.com").await;

    let batch = state
        .db
        .replace_recommendations(&user_id, vec![draft("A", Difficulty::Hard)])
        .await
        .unwrap();

    // The goal gets completed "elsewhere" after the client loaded its copy.
    let mut done = batch[0].clone();
    done.is_completed = true;
    state
        .db
        .update_recommendation_statuses(&[done])
        .await
        .unwrap();
    state.db.update_points(&user_id, 50).await.unwrap();

    // The stale client saves the same completion again: no double credit.
    let edited = json!({
        "recommendations": [{
            "id": batch[0].id,
            "user_id": user_id,
            "goal": "A",
            "category": "General",
            "difficulty": "Hard",
            "is_completed": true,
        }]
    });

    let (status, body) = common::put_json(&app, "/api/recommendations", Some(&token), edited).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_earned"], 0);
    assert_eq!(body["points_total"], 50);
}

#[tokio::test]
async fn test_save_ignores_records_owned_by_others() {
    let (app, state) = common::create_test_app();
    let (token, _) = common::seed_authenticated_user(&state, "ada@example.com").await;
    let (_, other_id) = common::seed_authenticated_user(&state, "grace@example.com").await;

    let other_batch = state
        .db
        .replace_recommendations(&other_id, vec![draft("theirs", Difficulty::Hard)])
        .await
        .unwrap();

    // Ada tries to complete Grace's goal.
    let edited = json!({
        "recommendations": [{
            "id": other_batch[0].id,
            "user_id": other_id,
            "goal": "theirs",
            "category": "General",
            "difficulty": "Hard",
            "is_completed": true,
        }]
    });

    let (status, body) = common::put_json(&app, "/api/recommendations", Some(&token), edited).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_earned"], 0);

    // Grace's record is untouched.
    let stored = state.db.get_recommendations(&other_id).await.unwrap();
    assert!(!stored[0].is_completed);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health-goal generation via the Gemini API.
//!
//! Produces five goal drafts from a health profile using structured JSON
//! output. Any failure (missing API key, network error, malformed payload)
//! falls back to a fixed built-in goal list so the progress flow never
//! dead-ends on the collaborator.

use anyhow::Context;
use serde::Deserialize;

use crate::models::{Difficulty, GoalCategory, GoalDraft, HealthProfile};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GOALS_PER_BATCH: usize = 5;

/// Goal-generation client.
pub struct GoalService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoalService {
    /// Create the service. With no API key configured every generation
    /// returns the built-in list.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Generate up to five goal drafts for a profile.
    ///
    /// Never fails: collaborator errors degrade to the built-in list.
    pub async fn generate(&self, profile: &HealthProfile) -> Vec<GoalDraft> {
        match self.generate_remote(profile).await {
            Ok(goals) if !goals.is_empty() => goals,
            Ok(_) => {
                tracing::warn!("Goal generation returned no goals, using built-in list");
                fallback_goals()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Goal generation failed, using built-in list");
                fallback_goals()
            }
        }
    }

    async fn generate_remote(&self, profile: &HealthProfile) -> anyhow::Result<Vec<GoalDraft>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("GEMINI_API_KEY not configured")?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(profile) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "goal": { "type": "STRING" },
                            "category": {
                                "type": "STRING",
                                "enum": ["Diet", "Exercise", "Mental Health", "General"]
                            },
                            "difficulty": {
                                "type": "STRING",
                                "enum": ["Easy", "Medium", "Hard"]
                            }
                        },
                        "required": ["goal", "category", "difficulty"]
                    }
                }
            }
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, GEMINI_MODEL
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("goal API returned {}", response.status());
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .context("goal API response contained no text part")?;

        let goals: Vec<GoalDraft> =
            serde_json::from_str(text.trim()).context("goal API returned malformed JSON")?;

        Ok(goals.into_iter().take(GOALS_PER_BATCH).collect())
    }
}

/// Prompt for the structured-output generation call.
fn build_prompt(profile: &HealthProfile) -> String {
    let conditions = if profile.existing_conditions.is_empty() {
        "None"
    } else {
        &profile.existing_conditions
    };

    format!(
        "Based on the following user health profile, generate 5 actionable health goals. \
         For each goal, provide a short description, a category ('Diet', 'Exercise', \
         'Mental Health', or 'General'), and a difficulty level ('Easy', 'Medium', 'Hard').\n\
         User Profile:\n\
         - Age: {}\n\
         - Gender: {}\n\
         - Fitness Level: {}\n\
         - Existing Conditions: {}\n\
         - Goals: Improve general wellness, manage weight.\n\n\
         Return the response as a JSON array of objects.",
        profile.age, profile.gender, profile.fitness_level, conditions
    )
}

/// The built-in goal list used when generation is unavailable.
pub fn fallback_goals() -> Vec<GoalDraft> {
    vec![
        GoalDraft {
            goal: "Drink 8 glasses of water daily.".to_string(),
            category: GoalCategory::Diet,
            difficulty: Difficulty::Easy,
        },
        GoalDraft {
            goal: "Go for a 30-minute brisk walk.".to_string(),
            category: GoalCategory::Exercise,
            difficulty: Difficulty::Medium,
        },
        GoalDraft {
            goal: "Practice 10 minutes of mindfulness or meditation.".to_string(),
            category: GoalCategory::MentalHealth,
            difficulty: Difficulty::Easy,
        },
        GoalDraft {
            goal: "Incorporate a serving of leafy greens into one meal.".to_string(),
            category: GoalCategory::Diet,
            difficulty: Difficulty::Easy,
        },
        GoalDraft {
            goal: "Do a 20-minute bodyweight strength training routine.".to_string(),
            category: GoalCategory::Exercise,
            difficulty: Difficulty::Hard,
        },
    ]
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FitnessLevel, Gender};

    fn test_profile() -> HealthProfile {
        HealthProfile {
            user_id: "user-1".to_string(),
            age: 34,
            height_cm: 175.0,
            weight_kg: 72.5,
            gender: Gender::Female,
            fitness_level: FitnessLevel::Intermediate,
            existing_conditions: String::new(),
            allergies: String::new(),
            medications: String::new(),
            preferred_language: "en".to_string(),
        }
    }

    #[test]
    fn test_fallback_list_has_five_goals() {
        let goals = fallback_goals();
        assert_eq!(goals.len(), 5);
        assert!(goals.iter().all(|g| !g.goal.is_empty()));
    }

    #[test]
    fn test_prompt_includes_profile_fields() {
        let prompt = build_prompt(&test_profile());

        assert!(prompt.contains("Age: 34"));
        assert!(prompt.contains("Gender: Female"));
        assert!(prompt.contains("Fitness Level: Intermediate"));
        assert!(prompt.contains("Existing Conditions: None"));
    }

    #[tokio::test]
    async fn test_generate_without_key_uses_fallback() {
        let service = GoalService::new(None);

        let goals = service.generate(&test_profile()).await;

        assert_eq!(goals.len(), 5);
        assert_eq!(goals[0].goal, fallback_goals()[0].goal);
    }

    #[test]
    fn test_goal_drafts_parse_from_wire_format() {
        // Category names use the wire spelling with a space.
        let json = r#"[{"goal": "Stretch", "category": "Mental Health", "difficulty": "Easy"}]"#;
        let goals: Vec<GoalDraft> = serde_json::from_str(json).unwrap();

        assert_eq!(goals[0].category, GoalCategory::MentalHealth);
        assert_eq!(goals[0].difficulty, Difficulty::Easy);
    }
}

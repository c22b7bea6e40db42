//! Badge catalog and post-attempt evaluation.

use color_eyre::Result;

use crate::db::Store;
use crate::models::{BadgeCondition, BadgeDefinition, QuizResult};

pub const BADGE_DEFINITIONS: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "FIRST_STEP",
        name: "Premier Pas",
        description: "Terminer son premier quiz",
        icon: "🦶",
        condition: BadgeCondition::Count(1),
    },
    BadgeDefinition {
        id: "REGULAR",
        name: "Habitué",
        description: "Jouer 10 fois",
        icon: "🎗️",
        condition: BadgeCondition::Count(10),
    },
    BadgeDefinition {
        id: "VETERAN",
        name: "Vétéran",
        description: "Jouer 50 fois",
        icon: "🛡️",
        condition: BadgeCondition::Count(50),
    },
    BadgeDefinition {
        id: "PERFECTIONIST",
        name: "Sans Faute",
        description: "Obtenir 100% de bonnes réponses",
        icon: "💎",
        condition: BadgeCondition::Perfect,
    },
    BadgeDefinition {
        id: "SCHOLAR",
        name: "Savant",
        description: "Cumuler 500 points au total",
        icon: "📜",
        condition: BadgeCondition::TotalScore(500),
    },
    BadgeDefinition {
        id: "MASTER",
        name: "Maître",
        description: "Cumuler 1000 points au total",
        icon: "👑",
        condition: BadgeCondition::TotalScore(1000),
    },
];

pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
    BADGE_DEFINITIONS.iter().find(|d| d.id == id)
}

/// Runs after a result has been durably recorded. Recomputes cumulative stats
/// from the full history (including the just-saved result), then awards every
/// qualifying badge the user does not yet hold; one result can unlock several
/// in the same pass. Returns the newly awarded badge ids.
///
/// The store-level award is idempotent, so a partial failure here is safe:
/// the next attempt simply evaluates again.
pub async fn check_badges(
    store: &Store,
    username: &str,
    current: &QuizResult,
) -> Result<Vec<&'static str>> {
    let all_results = store.get_results().await?;
    let user_results: Vec<&QuizResult> = all_results
        .iter()
        .filter(|r| r.username == username)
        .collect();

    let games_played = user_results.len() as u32;
    let total_score: u32 = user_results.iter().map(|r| r.score).sum();
    // Perfect refers to the current attempt only, not the history.
    let is_perfect = current.score == current.max_score();

    let earned: std::collections::HashSet<String> = store
        .get_user_badges(username)
        .await?
        .into_iter()
        .map(|b| b.badge_id)
        .collect();

    let mut newly_awarded = Vec::new();
    for def in BADGE_DEFINITIONS {
        if earned.contains(def.id) {
            continue;
        }

        let qualifies = match def.condition {
            BadgeCondition::Count(threshold) => games_played >= threshold,
            BadgeCondition::TotalScore(threshold) => total_score >= threshold,
            BadgeCondition::Perfect => is_perfect,
        };

        if qualifies {
            store.award_badge(username, def.id).await?;
            newly_awarded.push(def.id);
        }
    }

    Ok(newly_awarded)
}

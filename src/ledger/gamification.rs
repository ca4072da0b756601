//! Sustainability score and badges derived from ledger totals

use chrono::{DateTime, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use super::models::{AggregateStats, Role, StoredMessage};

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Measure {
    CarbonSavedKg,
    EcoPrompts,
    Streak,
    Score,
    Regions,
    Prompts,
}

struct BadgeDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    rarity: Rarity,
    measure: Measure,
    target: u64,
}

const BADGES: &[BadgeDef] = &[
    BadgeDef { id: "carbon_hero_1", name: "Seedling Saver", description: "Save 10kg CO₂", icon: "🌱", rarity: Rarity::Common, measure: Measure::CarbonSavedKg, target: 10 },
    BadgeDef { id: "carbon_hero_2", name: "Forest Guardian", description: "Save 100kg CO₂", icon: "🌲", rarity: Rarity::Rare, measure: Measure::CarbonSavedKg, target: 100 },
    BadgeDef { id: "carbon_hero_3", name: "Carbon Titan", description: "Save 500kg CO₂", icon: "🏔️", rarity: Rarity::Epic, measure: Measure::CarbonSavedKg, target: 500 },
    BadgeDef { id: "carbon_hero_4", name: "Planet Keeper", description: "Save 1,000kg CO₂", icon: "🌍", rarity: Rarity::Legendary, measure: Measure::CarbonSavedKg, target: 1000 },
    BadgeDef { id: "eco_warrior_1", name: "Green Apprentice", description: "Use eco mode 50 times", icon: "🧙", rarity: Rarity::Common, measure: Measure::EcoPrompts, target: 50 },
    BadgeDef { id: "eco_warrior_2", name: "Eco Mage", description: "Use eco mode 100 times", icon: "🧙‍♂️", rarity: Rarity::Rare, measure: Measure::EcoPrompts, target: 100 },
    BadgeDef { id: "eco_warrior_3", name: "Eco Archmage", description: "Use eco mode 500 times", icon: "⚡", rarity: Rarity::Epic, measure: Measure::EcoPrompts, target: 500 },
    BadgeDef { id: "streak_1", name: "Consistent Caster", description: "7-day streak", icon: "🔥", rarity: Rarity::Common, measure: Measure::Streak, target: 7 },
    BadgeDef { id: "streak_2", name: "Relentless Wizard", description: "30-day streak", icon: "💫", rarity: Rarity::Rare, measure: Measure::Streak, target: 30 },
    BadgeDef { id: "streak_3", name: "Eternal Flame", description: "100-day streak", icon: "☀️", rarity: Rarity::Legendary, measure: Measure::Streak, target: 100 },
    BadgeDef { id: "efficiency_1", name: "Precision Caster", description: "Achieve 90+ sustainability score", icon: "🎯", rarity: Rarity::Epic, measure: Measure::Score, target: 90 },
    BadgeDef { id: "explorer_1", name: "Realm Explorer", description: "Use 5+ data center regions", icon: "🗺️", rarity: Rarity::Rare, measure: Measure::Regions, target: 5 },
    BadgeDef { id: "volume_1", name: "Prolific Scribe", description: "Send 1,000 prompts", icon: "✍️", rarity: Rarity::Rare, measure: Measure::Prompts, target: 1000 },
];

/// Inputs for badge progress
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserProgress {
    pub carbon_saved_kg: f64,
    pub prompts_count: u64,
    pub eco_mode_percent: f64,
    pub streak_days: u64,
    pub regions_used: u64,
}

impl UserProgress {
    pub fn sustainability_score(&self) -> u32 {
        sustainability_score(self.carbon_saved_kg, self.prompts_count, self.eco_mode_percent)
    }

    fn current(&self, measure: Measure) -> u64 {
        match measure {
            Measure::CarbonSavedKg => self.carbon_saved_kg.max(0.0).floor() as u64,
            Measure::EcoPrompts => {
                (self.prompts_count as f64 * self.eco_mode_percent / 100.0).round() as u64
            }
            Measure::Streak => self.streak_days,
            Measure::Score => self.sustainability_score() as u64,
            Measure::Regions => self.regions_used,
            Measure::Prompts => self.prompts_count,
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Progress {
    pub current: u64,
    pub target: u64,
    pub percent: u32,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub unlocked: bool,
    pub progress: Progress,
}

/// Score out of 100: carbon saved (40), eco mode share (40), volume (20)
pub fn sustainability_score(carbon_saved_kg: f64, prompts_count: u64, eco_mode_percent: f64) -> u32 {
    if prompts_count == 0 {
        return 0;
    }
    let carbon = (carbon_saved_kg / 500.0).clamp(0.0, 1.0) * 40.0;
    let eco = (eco_mode_percent.clamp(0.0, 100.0) / 100.0) * 40.0;
    let volume = (prompts_count as f64 / 1000.0).min(1.0) * 20.0;
    (carbon + eco + volume).round() as u32
}

fn progress_for(def: &BadgeDef, progress: &UserProgress) -> Progress {
    let current = progress.current(def.measure).min(def.target);
    Progress {
        current,
        target: def.target,
        percent: (current as f64 / def.target as f64 * 100.0).round() as u32,
    }
}

pub fn badges_for(progress: &UserProgress) -> Vec<Badge> {
    BADGES
        .iter()
        .map(|def| {
            let p = progress_for(def, progress);
            Badge {
                id: def.id,
                name: def.name,
                description: def.description,
                icon: def.icon,
                rarity: def.rarity,
                unlocked: p.current >= def.target,
                progress: p,
            }
        })
        .collect()
}

pub fn achievement_progress(badge_id: &str, progress: &UserProgress) -> Option<Progress> {
    BADGES
        .iter()
        .find(|def| def.id == badge_id)
        .map(|def| progress_for(def, progress))
}

/// Consecutive days with activity, counting back from the most recent one
fn streak_days(messages: &[StoredMessage]) -> u64 {
    let days: Vec<NaiveDate> = messages
        .iter()
        .filter_map(|m| DateTime::parse_from_rfc3339(&m.created_at).ok())
        .map(|t| t.date_naive())
        .unique()
        .sorted()
        .rev()
        .collect();

    let mut streak = 0;
    let mut expected = match days.first() {
        Some(day) => *day,
        None => return 0,
    };
    for day in days {
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

impl UserProgress {
    /// Progress inputs derived from the ledger. Eco mode share is not
    /// recorded per message so the caller supplies it.
    pub fn from_ledger(
        stats: &AggregateStats,
        messages: &[StoredMessage],
        eco_mode_percent: f64,
    ) -> Self {
        let regions_used = messages
            .iter()
            .filter(|m| m.role == Role::Assistant && m.carbon.is_billed())
            .map(|m| m.carbon.region.as_str())
            .filter(|r| !r.is_empty())
            .unique()
            .count() as u64;

        Self {
            carbon_saved_kg: stats.total_carbon_saved_g / 1000.0,
            prompts_count: stats.total_prompts,
            eco_mode_percent,
            streak_days: streak_days(messages),
            regions_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_scores_zero_without_prompts() {
        assert_eq!(sustainability_score(900.0, 0, 100.0), 0);
    }

    #[test]
    fn it_weights_score_components() {
        // 127.5/500*40 = 10.2, 78% eco = 31.2, 342/1000*20 = 6.84
        assert_eq!(sustainability_score(127.5, 342, 78.0), 48);
        assert_eq!(sustainability_score(5000.0, 5000, 100.0), 100);
    }

    #[test]
    fn it_unlocks_badges_by_target() {
        let progress = UserProgress {
            carbon_saved_kg: 127.5,
            prompts_count: 342,
            eco_mode_percent: 78.0,
            streak_days: 12,
            regions_used: 3,
        };
        let badges = badges_for(&progress);
        assert_eq!(badges.len(), 13);

        let unlocked: Vec<&str> = badges.iter().filter(|b| b.unlocked).map(|b| b.id).collect();
        assert_eq!(
            unlocked,
            vec![
                "carbon_hero_1",
                "carbon_hero_2",
                "eco_warrior_1",
                "eco_warrior_2",
                "streak_1"
            ]
        );

        let explorer = badges.iter().find(|b| b.id == "explorer_1").unwrap();
        assert_eq!(explorer.progress.current, 3);
        assert_eq!(explorer.progress.percent, 60);
    }

    #[test]
    fn it_can_unlock_every_badge_from_the_ledger() {
        let progress = UserProgress {
            carbon_saved_kg: 1000.0,
            prompts_count: 1000,
            eco_mode_percent: 100.0,
            streak_days: 100,
            regions_used: 5,
        };
        let locked: Vec<&str> = badges_for(&progress)
            .iter()
            .filter(|b| !b.unlocked)
            .map(|b| b.id)
            .collect();
        assert!(locked.is_empty(), "never unlocked: {:?}", locked);
    }

    #[test]
    fn it_caps_progress_at_the_target() {
        let progress = UserProgress {
            prompts_count: 5000,
            ..Default::default()
        };
        let p = achievement_progress("volume_1", &progress).unwrap();
        assert_eq!(p.current, 1000);
        assert_eq!(p.percent, 100);
        assert!(achievement_progress("no_such_badge", &progress).is_none());
    }

    #[test]
    fn it_derives_progress_from_the_ledger() {
        use crate::ledger::models::CarbonMeta;

        let at = |day: &str, role: Role, region: &str| StoredMessage {
            id: format!("{}-{}", day, region),
            chat_id: "c".to_string(),
            role,
            content: "x".to_string(),
            created_at: format!("{}T10:00:00+00:00", day),
            carbon: CarbonMeta {
                cost_g: if role == Role::Assistant { 0.1 } else { 0.0 },
                baseline_g: if role == Role::Assistant { 0.5 } else { 0.0 },
                saved_g: if role == Role::Assistant { 0.4 } else { 0.0 },
                region: region.to_string(),
                ..Default::default()
            },
        };
        let messages = vec![
            at("2026-03-01", Role::User, ""),
            at("2026-03-03", Role::User, ""),
            at("2026-03-03", Role::Assistant, "us-west1"),
            at("2026-03-04", Role::Assistant, "europe-west1"),
            at("2026-03-05", Role::Assistant, "us-west1"),
        ];
        let stats = AggregateStats {
            total_prompts: 2,
            total_carbon_saved_g: 1200.0,
            ..Default::default()
        };

        let progress = UserProgress::from_ledger(&stats, &messages, 50.0);
        assert_eq!(progress.streak_days, 3);
        assert_eq!(progress.regions_used, 2);
        assert_eq!(progress.carbon_saved_kg, 1.2);
        assert_eq!(progress.prompts_count, 2);
    }
}

//! Seed roster
//!
//! The five agents every session starts with.

use super::{Agent, AgentStatus, Stats};
use crate::realm::RealmId;

struct Seed {
    id: &'static str,
    name: &'static str,
    avatar_seed: &'static str,
    realm: RealmId,
    stats: [i32; 4],
    status: AgentStatus,
    description: &'static str,
    historical_context: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "wang_xizhi",
        name: "Wang Xizhi",
        avatar_seed: "wang",
        realm: RealmId::Lanting,
        stats: [60, 95, 10, 50],
        status: AgentStatus::Pondering,
        description: "The Sage of Calligraphy.",
        historical_context: "Eastern Jin Dynasty",
    },
    Seed {
        id: "einstein",
        name: "Albert Einstein",
        avatar_seed: "albert",
        realm: RealmId::Solvay,
        stats: [70, 40, 98, 65],
        status: AgentStatus::Debating,
        description: "Theoretical Physicist.",
        historical_context: "Modern Era",
    },
    Seed {
        id: "zhu_xi",
        name: "Zhu Xi",
        avatar_seed: "zhu",
        realm: RealmId::GooseLake,
        stats: [90, 50, 30, 95],
        status: AgentStatus::Debating,
        description: "Master of Principle (Li).",
        historical_context: "Song Dynasty",
    },
    Seed {
        id: "lu_jiuyuan",
        name: "Lu Jiuyuan",
        avatar_seed: "lu",
        realm: RealmId::GooseLake,
        stats: [92, 60, 20, 85],
        status: AgentStatus::Idle,
        description: "Master of Mind (Xin).",
        historical_context: "Song Dynasty",
    },
    Seed {
        id: "ai_poet",
        name: "Unit-734 (Poet)",
        avatar_seed: "robot",
        realm: RealmId::Dongshan,
        stats: [45, 80, 75, 40],
        status: AgentStatus::Pondering,
        description: "A futuristic AI exploring human emotion through verse.",
        historical_context: "Year 2088",
    },
];

/// Build the initial roster in display order
pub fn initial_agents() -> Vec<Agent> {
    SEEDS
        .iter()
        .map(|seed| {
            let [philosophy, art, science, ethics] = seed.stats;
            Agent {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                avatar: format!("https://picsum.photos/seed/{}/100/100", seed.avatar_seed),
                current_realm: seed.realm,
                stats: Stats::new(philosophy, art, science, ethics),
                status: seed.status,
                description: seed.description.to_string(),
                historical_context: seed.historical_context.to_string(),
            }
        })
        .collect()
}

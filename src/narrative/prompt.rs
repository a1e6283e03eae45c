//! Prompt builders

use crate::agent::Agent;
use crate::realm::RealmId;

pub fn experiment_prompt(agent: &Agent, scenario: &str, realm: RealmId) -> String {
    let s = &agent.stats;
    format!(
        r#"Roleplay Simulation:
Agent: {name} ({context})
Current Realm: {realm} - {realm_name}: {realm_description}
Current Stats: Philosophy({phi}), Art({art}), Science({sci}), Ethics({eth}).

Experiment Scenario: "{scenario}"

Task:
1. Describe how this agent reacts to the scenario within the context of the current realm. Be creative and philosophical. (Max 100 words).
2. Suggest how their stats might change (increase/decrease) based on this reaction.

Output Format (JSON ONLY):
{{
  "narrative": "...",
  "statChanges": {{
    "philosophy": number,
    "art": number,
    "science": number,
    "ethics": number
  }}
}}"#,
        name = agent.name,
        context = agent.historical_context,
        realm = realm,
        realm_name = realm.config().name,
        realm_description = realm.config().description,
        phi = s.philosophy(),
        art = s.art(),
        sci = s.science(),
        eth = s.ethics(),
        scenario = scenario,
    )
}

pub fn traversal_prompt(agent: &Agent, from: RealmId, to: RealmId) -> String {
    format!(
        "Narrate a short mystical or sci-fi transition (1 sentence) for {} traveling from the realm of {} to {}.\n\
         Highlight the clash or fusion of values.",
        agent.name, from, to
    )
}

//! Realm overview

use colored::*;
use eyre::Result;
use serde::Serialize;

use super::render;
use crate::arena::Arena;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::realm::RealmId;

#[derive(Serialize)]
struct RealmView {
    id: RealmId,
    name: &'static str,
    description: &'static str,
    theme: &'static str,
    icon: &'static str,
    activity: i32,
    occupants: Vec<String>,
}

fn views(arena: &Arena) -> Vec<RealmView> {
    RealmId::ALL
        .iter()
        .map(|&id| {
            let config = id.config();
            RealmView {
                id,
                name: config.name,
                description: config.description,
                theme: config.theme,
                icon: config.icon,
                activity: arena.activity().level(id),
                occupants: arena.agents_in(id).map(|a| a.id.clone()).collect(),
            }
        })
        .collect()
}

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let arena = Arena::seeded(config.selection.reselect_policy);
    let realms = views(&arena);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&realms)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&realms)?),
        OutputFormat::Text => {
            println!("{}", "Realms:".bold());
            println!();
            for view in &realms {
                let realm = view.id;
                println!("  {} {}", render::realm_label(realm).bold(), view.theme.dimmed());
                render::print_wrapped(view.description, 4);
                println!(
                    "    Activity {} {:>3}",
                    render::gauge(view.activity).color(realm.config().accent),
                    view.activity
                );
                if view.occupants.is_empty() {
                    println!("    {}", "(empty)".dimmed());
                } else {
                    for agent in arena.agents_in(realm) {
                        println!("    {} {}", "•".cyan(), agent.name);
                    }
                }
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_cover_every_realm() {
        let arena = Arena::default();
        let realms = views(&arena);
        assert_eq!(realms.len(), 4);
        assert_eq!(realms[1].id, RealmId::Solvay);
        assert_eq!(realms[1].activity, 62);
        assert_eq!(realms[1].occupants, vec!["einstein"]);
        assert_eq!(realms[3].occupants, vec!["ai_poet"]);
    }

    #[test]
    fn test_views_follow_arena() {
        let arena = Arena::default();
        let occupied: usize = views(&arena).iter().map(|r| r.occupants.len()).sum();
        assert_eq!(occupied, arena.agents().count());
    }
}

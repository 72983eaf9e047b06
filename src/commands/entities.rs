// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};

use super::{Desk, opt_str, req_str};
use crate::ledger::Collection;
use crate::models::{ADJUSTMENT, Entity, EntityKind};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle<K: EntityKind>(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()>
where
    Entity<K>: Collection,
{
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = req_str(sub, "name")?;
            if name.is_empty() || name == ADJUSTMENT {
                bail!("'{}' is not a usable {} name", name, K::LABEL);
            }
            if by_name::<K>(desk, name).is_some() {
                bail!("{} '{}' already exists", K::LABEL, name);
            }
            let e = Entity::<K>::new(name, opt_str(sub, "description").unwrap_or_default());
            desk.ledger
                .create(desk.store.as_ref(), e)
                .with_context(|| format!("Store {}", K::LABEL))?;
            println!("Added {} '{}'", K::LABEL, name);
        }
        Some(("list", sub)) => {
            let show_all = sub.get_flag("all");
            let mut data: Vec<&Entity<K>> = desk
                .ledger
                .all::<Entity<K>>()
                .iter()
                .filter(|e| show_all || e.is_active)
                .collect();
            data.sort_by(|a, b| a.name.cmp(&b.name));
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|e| {
                        vec![
                            e.name.clone(),
                            e.description.clone(),
                            if e.is_active { "yes" } else { "no" }.to_string(),
                            e.created_at.format("%Y-%m-%d").to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Description", "Active", "Created"], rows)
                );
            }
        }
        Some(("activate", sub)) => set_active::<K>(desk, req_str(sub, "name")?, true)?,
        Some(("deactivate", sub)) => set_active::<K>(desk, req_str(sub, "name")?, false)?,
        Some(("rm", sub)) => {
            let name = req_str(sub, "name")?;
            let id = by_name::<K>(desk, name)
                .map(|e| e.id.clone())
                .with_context(|| format!("{} '{}' not found", K::LABEL, name))?;
            desk.ledger
                .remove::<Entity<K>>(desk.store.as_ref(), &id)
                .with_context(|| format!("Delete {} {}", K::LABEL, name))?;
            println!("Removed {} '{}'", K::LABEL, name);
        }
        _ => {}
    }
    Ok(())
}

fn by_name<'a, K: EntityKind>(desk: &'a Desk, name: &str) -> Option<&'a Entity<K>>
where
    Entity<K>: Collection,
{
    desk.ledger
        .all::<Entity<K>>()
        .iter()
        .find(|e| e.name == name)
}

fn set_active<K: EntityKind>(desk: &mut Desk, name: &str, active: bool) -> Result<()>
where
    Entity<K>: Collection,
{
    let session = desk.session()?.clone();
    let mut e = by_name::<K>(desk, name)
        .cloned()
        .with_context(|| format!("{} '{}' not found", K::LABEL, name))?;
    e.is_active = active;
    desk.ledger
        .update(desk.store.as_ref(), &session, e)
        .with_context(|| format!("Update {} {}", K::LABEL, name))?;
    println!(
        "{} {} '{}'",
        if active { "Activated" } else { "Deactivated" },
        K::LABEL,
        name
    );
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::Desk;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    let report = desk.load()?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report.outcomes)? {
        let rows = report
            .outcomes
            .iter()
            .map(|o| {
                vec![
                    o.table.to_string(),
                    o.rows.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
                    o.error.clone().unwrap_or_else(|| "ok".into()),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Collection", "Rows", "Status"], rows));
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

use super::{Desk, check_bank, opt_str, req_str};
use crate::models::{Account, AttachedFile, BeneficiaryEntry, RiskLevel, new_id};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(desk: &mut Desk, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(desk, sub)?,
        Some(("list", sub)) => list(desk, sub)?,
        Some(("edit", sub)) => edit(desk, sub)?,
        Some(("attach", sub)) => attach(desk, sub)?,
        Some(("rm", sub)) => {
            let id = req_str(sub, "id")?;
            desk.ledger
                .remove::<BeneficiaryEntry>(desk.store.as_ref(), id)
                .with_context(|| format!("Delete beneficiary {}", id))?;
            println!("Removed beneficiary {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()> {
    let created_by = desk.session()?.stamp().to_string();
    let assigned_bank = opt_str(sub, "bank").unwrap_or_default().to_string();
    if !assigned_bank.is_empty() {
        check_bank(&desk.ledger, &Account::Real(assigned_bank.clone()))?;
    }
    let b = BeneficiaryEntry {
        id: new_id(),
        name: req_str(sub, "name")?.to_string(),
        contact_no: opt_str(sub, "contact").unwrap_or_default().to_string(),
        government_id: opt_str(sub, "gov-id").unwrap_or_default().to_string(),
        risk_level: opt_str(sub, "risk").unwrap_or("low").parse::<RiskLevel>()?,
        assigned_bank,
        files: Vec::new(),
        created_at: Utc::now(),
        created_by,
        edited_by: None,
        updated_at: None,
    };
    let summary = format!("Added beneficiary '{}' ({}, id {})", b.name, b.risk_level, b.id);
    desk.ledger
        .create(desk.store.as_ref(), b)
        .context("Store beneficiary")?;
    println!("{}", summary);
    Ok(())
}

#[derive(Serialize)]
struct BeneficiaryRow {
    id: String,
    name: String,
    contact_no: String,
    risk_level: String,
    assigned_bank: String,
    files: usize,
    created_by: String,
}

fn list(desk: &Desk, sub: &clap::ArgMatches) -> Result<()> {
    let risk = opt_str(sub, "risk").map(str::parse::<RiskLevel>).transpose()?;
    let data: Vec<BeneficiaryRow> = desk
        .ledger
        .all::<BeneficiaryEntry>()
        .iter()
        .filter(|b| risk.is_none_or(|r| b.risk_level == r))
        .map(|b| BeneficiaryRow {
            id: b.id.clone(),
            name: b.name.clone(),
            contact_no: b.contact_no.clone(),
            risk_level: b.risk_level.to_string(),
            assigned_bank: b.assigned_bank.clone(),
            files: b.files.len(),
            created_by: b.created_by.clone(),
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.name,
                    r.contact_no,
                    r.risk_level,
                    r.assigned_bank,
                    r.files.to_string(),
                    r.created_by,
                    r.id,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Contact", "Risk", "Bank", "Files", "Created by", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

fn find(desk: &Desk, id: &str) -> Result<BeneficiaryEntry> {
    desk.ledger
        .find::<BeneficiaryEntry>(id)
        .cloned()
        .with_context(|| format!("Beneficiary '{}' not found", id))
}

fn edit(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()> {
    let session = desk.session()?.clone();
    let mut b = find(desk, req_str(sub, "id")?)?;
    if let Some(v) = opt_str(sub, "name") {
        b.name = v.to_string();
    }
    if let Some(v) = opt_str(sub, "contact") {
        b.contact_no = v.to_string();
    }
    if let Some(v) = opt_str(sub, "gov-id") {
        b.government_id = v.to_string();
    }
    if let Some(v) = opt_str(sub, "risk") {
        b.risk_level = v.parse()?;
    }
    if let Some(v) = opt_str(sub, "bank") {
        if !v.is_empty() {
            check_bank(&desk.ledger, &Account::Real(v.to_string()))?;
        }
        b.assigned_bank = v.to_string();
    }
    let saved = desk
        .ledger
        .update(desk.store.as_ref(), &session, b)
        .context("Update beneficiary")?;
    println!("Updated beneficiary '{}' ({})", saved.name, saved.risk_level);
    Ok(())
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

fn attach(desk: &mut Desk, sub: &clap::ArgMatches) -> Result<()> {
    let session = desk.session()?.clone();
    let mut b = find(desk, req_str(sub, "id")?)?;
    let path = Path::new(req_str(sub, "file")?);
    let meta = std::fs::metadata(path).with_context(|| format!("Read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    let content_type = opt_str(sub, "content-type")
        .map(str::to_string)
        .unwrap_or_else(|| guess_content_type(path).to_string());
    b.files.push(AttachedFile {
        name: name.clone(),
        size_bytes: meta.len(),
        content_type,
        path: path.display().to_string(),
        uploaded_at: Utc::now(),
    });
    desk.ledger
        .update(desk.store.as_ref(), &session, b)
        .context("Update beneficiary")?;
    println!("Attached {} ({} bytes)", name, meta.len());
    Ok(())
}

//! One-shot CLI commands.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing::{info, warn};

use torneo_core::api::{SheetsClient, SubmitOutcome};
use torneo_core::models::{write_csv, ExportRecord};
use torneo_core::poller::{CompetitorPoller, PollResult, Snapshot};
use torneo_core::schema::{self, MigrationNote};
use torneo_core::sound::TracingSounds;
use torneo_core::wizard::RegistrationWizard;
use torneo_core::{classify, parse_birth_date, AgeCategory, Config, SubmissionContext};

pub fn classify_command(birth_date: &str) -> Result<()> {
    let birth = parse_birth_date(birth_date).map_err(|e| anyhow::anyhow!(e.message))?;
    let result = classify(birth, Local::now().date_naive());
    println!("Edad: {}", result.age);
    println!("{}", category_line(result.category));
    Ok(())
}

fn category_line(category: Option<AgeCategory>) -> String {
    match category.map(|c| (c, c.age_range())) {
        Some((c, (min, Some(max)))) => format!("Categoría: {} ({}-{} años)", c, min, max),
        Some((c, (min, None))) => format!("Categoría: {} ({}+ años)", c, min),
        None => "Categoría: (sin categoría)".to_string(),
    }
}

fn describe_note(note: &MigrationNote) -> String {
    match note {
        MigrationNote::CategoryMismatch { participant, declared, derived } => format!(
            "participante {}: categoría declarada '{}' difiere de la calculada '{}'",
            participant,
            declared,
            derived
        ),
        MigrationNote::TeacherNameSplit { original } => {
            format!("nombre del maestro '{}' separado en nombre y apellido", original)
        }
    }
}

/// Write `records` as CSV. A directory target gets the default file name.
fn write_csv_file(target: &Path, records: &[ExportRecord]) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(ExportRecord::csv_file_name(records))
    } else {
        target.to_path_buf()
    };
    let file = File::create(&path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_csv(records, BufWriter::new(file))
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(path)
}

/// Load a registration file, walk it through the wizard and submit it.
pub async fn register_command(
    config: &Config,
    path: &Path,
    dry_run: bool,
    csv: Option<&Path>,
) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read registration file: {}", path.display()))?;
    let migrated = schema::migrate_str(&json)
        .with_context(|| format!("Failed to read registration: {}", path.display()))?;
    if migrated.from_version < schema::CURRENT_VERSION {
        info!(from_version = migrated.from_version, "Migrated registration to current layout");
    }
    for note in &migrated.notes {
        println!("Aviso: {}", describe_note(note));
    }

    let ctx = SubmissionContext::now();
    let mut wizard = RegistrationWizard::with_draft(Arc::new(TracingSounds), ctx.today, migrated.registration);
    wizard.next()?;
    wizard.next()?;
    let registration = wizard.finish()?;

    let records = registration.to_records(&ctx);
    if let Some(target) = csv {
        let written = write_csv_file(target, &records)?;
        println!("CSV guardado en {}", written.display());
    }
    if dry_run {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let client = SheetsClient::from_config(config)?;
    match client.submit(&records).await? {
        SubmitOutcome::Confirmed { message } => {
            println!("Registro {} enviado ({} participantes)", ctx.registration_id, records.len());
            if let Some(message) = message {
                println!("{}", message);
            }
        }
        SubmitOutcome::Assumed => {
            println!(
                "Registro {} enviado ({} participantes, sin confirmación)",
                ctx.registration_id,
                records.len()
            );
        }
    }
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, category: &str) {
    let shown = snapshot.list.filter_by_category(category);
    println!(
        "{} competidores ({} mostrados), actualizado {}",
        snapshot.list.len(),
        shown.len(),
        snapshot.age_display(Utc::now())
    );
    for c in shown {
        println!("  [{}] {:<30} {:<25} {}", c.initial(), c.full_name, c.school, c.category);
    }
    let categories = snapshot.list.categories();
    if !categories.is_empty() {
        println!("Categorías: {}", categories.join(", "));
    }
}

/// Poll the competitor list until Ctrl-C.
pub async fn watch_command(config: &Config, category: &str) -> Result<()> {
    let client = SheetsClient::from_config(config)?;
    let (mut rx, handle) = CompetitorPoller::new(client, config.poll_interval()).spawn();

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Some(PollResult::Competitors(snapshot)) => print_snapshot(&snapshot, category),
                Some(PollResult::Failed(reason)) => eprintln!("Error al actualizar: {}", reason),
                None => {
                    warn!("Poller stopped");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use torneo_core::models::{CombatKind, Grade, Participant, Registration};
    use torneo_core::RegistrationId;

    #[test]
    fn test_category_mismatch_names_the_participant_once() {
        let migrated = schema::migrate(serde_json::json!({
            "school": "Tigre Dorado", "martialArtStyle": "Karate", "teacherName": "Marta",
            "teacherLastName": "Ruiz", "locality": "Adrogué",
            "participants": [{"name": "Leo", "lastName": "Paz", "age": 55, "grade": "Dan",
                              "category": "Senior", "exhibition": true}]
        }))
        .unwrap();
        let lines: Vec<String> = migrated.notes.iter().map(describe_note).collect();
        assert_eq!(
            lines,
            vec!["participante 1: categoría declarada 'Senior' difiere de la calculada 'Senior Senior'"]
        );
    }

    #[test]
    fn test_category_line_shows_band() {
        assert_eq!(category_line(Some(AgeCategory::Juvenil)), "Categoría: Juvenil (13-17 años)");
        assert_eq!(category_line(Some(AgeCategory::SeniorSenior)), "Categoría: Senior Senior (51+ años)");
        assert_eq!(category_line(None), "Categoría: (sin categoría)");
    }

    #[test]
    fn test_teacher_name_split_note() {
        let note = MigrationNote::TeacherNameSplit { original: "Juan Pérez".to_string() };
        assert_eq!(describe_note(&note), "nombre del maestro 'Juan Pérez' separado en nombre y apellido");
    }

    fn records() -> Vec<ExportRecord> {
        let mut ana = Participant::new("Ana", "Gómez", Grade::KyuA);
        ana.modalities.combat = true;
        ana.modalities.combat_kinds = vec![CombatKind::Individual, CombatKind::Kickboxing];
        let registration = Registration {
            participants: vec![ana],
            ..Default::default()
        };
        let mut ctx = SubmissionContext::now();
        ctx.registration_id = RegistrationId::from("REG_TEST".to_string());
        registration.to_records(&ctx)
    }

    #[test]
    fn test_csv_into_directory_uses_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_csv_file(dir.path(), &records()).unwrap();
        assert_eq!(written, dir.path().join("inscripcion_torneo_Ana_Gómez.csv"));

        let contents = std::fs::read_to_string(&written).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("ID_Registro,Numero_Participante,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("REG_TEST,1,"));
        assert!(row.ends_with(",Sí,\"Individual, Kickboxing\""));
    }

    #[test]
    fn test_csv_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("salida.csv");
        let written = write_csv_file(&target, &records()).unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap().lines().count(), 2);
    }
}

//! Snapshot rows to `.xlsx`.

use std::path::Path;

use rust_xlsxwriter::{Format, Url, Workbook, Worksheet};
use tracing::info;

use mastersnap_core::{SearchQuery, SnapshotRow};

use crate::ExportError;

pub const SHEET_NAME: &str = "Formations";

/// Marker the reference export uses for every absent value.
const NOT_AVAILABLE: &str = "N/A";

const HEADERS: [&str; 10] = [
    "Intitulé Mention",
    "Intitulé Parcours",
    "Ville",
    "Alternance",
    "Taux d'Accès",
    "Rang Dernier Appelé",
    "Nombre de Candidatures Confirmées",
    "Capacité",
    "Lien MonMaster",
    "Lien Fiche",
];

const COLUMN_WIDTHS: [f64; 10] = [40.0, 40.0, 18.0, 12.0, 12.0, 18.0, 28.0, 10.0, 48.0, 48.0];

/// `formations_<query_with_underscores>.xlsx`, the name convention of the
/// reference export.
pub fn workbook_file_name(query: &SearchQuery) -> String {
    format!("formations_{}.xlsx", query.file_stem())
}

/// Write one workbook with a single `Formations` sheet, one line per row,
/// in the order given.
pub fn write_snapshot(path: &Path, rows: &[SnapshotRow]) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (index, row) in rows.iter().enumerate() {
        write_row(worksheet, index as u32 + 1, row)?;
    }

    workbook.save(path)?;
    info!(path = %path.display(), rows = rows.len(), "workbook written");
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, line: u32, row: &SnapshotRow) -> Result<(), ExportError> {
    worksheet.write_string(line, 0, row.intitule_mention.as_str())?;
    if let Some(parcours) = &row.intitule_parcours {
        worksheet.write_string(line, 1, parcours.as_str())?;
    }
    worksheet.write_string(line, 2, row.ville.as_deref().unwrap_or(NOT_AVAILABLE))?;
    worksheet.write_string(line, 3, if row.alternance { "Vrai" } else { "Faux" })?;

    match row.taux_acces {
        Some(taux) => worksheet.write_string(line, 4, format!("{taux:.2}%"))?,
        None => worksheet.write_string(line, 4, NOT_AVAILABLE)?,
    };
    write_count(worksheet, line, 5, row.rang_dernier_appele)?;
    write_count(worksheet, line, 6, row.nb_candidatures_confirmees)?;
    write_count(worksheet, line, 7, row.capacite)?;

    write_link(worksheet, line, 8, row.lien_monmaster.as_deref())?;
    write_link(worksheet, line, 9, row.lien_fiche.as_deref())?;
    Ok(())
}

fn write_count(
    worksheet: &mut Worksheet,
    line: u32,
    col: u16,
    value: Option<u32>,
) -> Result<(), ExportError> {
    match value {
        Some(count) => worksheet.write_number(line, col, count)?,
        None => worksheet.write_string(line, col, NOT_AVAILABLE)?,
    };
    Ok(())
}

fn write_link(
    worksheet: &mut Worksheet,
    line: u32,
    col: u16,
    link: Option<&str>,
) -> Result<(), ExportError> {
    match link {
        Some(url) => worksheet.write_url(line, col, Url::new(url))?,
        None => worksheet.write_string(line, col, NOT_AVAILABLE)?,
    };
    Ok(())
}

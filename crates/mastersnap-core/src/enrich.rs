use std::sync::Arc;

use tracing::warn;

use crate::api::SITE_ORIGIN;
use crate::cache::DetailCache;
use crate::domain::{EtablissementDetail, Formation, SnapshotRow};
use crate::error::MergeError;

/// Convert a 0..1 admission-rate fraction into percentage points with
/// two-decimal rounding (0.4567 becomes 45.67).
pub fn normalize_taux_acces(taux: Option<f64>) -> Option<f64> {
    taux.map(|fraction| (fraction * 10_000.0).round() / 100.0)
}

/// Pick the sheet link for a formation: the first sub-program entry whose
/// `inmp` matches and that carries a link, else the institution-level link.
/// Absent on both sides matches, the upstream omits `inmp` for
/// single-track mentions.
pub fn select_lien_fiche(formation: &Formation, detail: &EtablissementDetail) -> Option<String> {
    detail
        .s1_parcours
        .iter()
        .find(|parcours| parcours.inmp == formation.inmp && parcours.lien_fiche.is_some())
        .and_then(|parcours| parcours.lien_fiche.clone())
        .or_else(|| detail.lien_fiche.clone())
}

/// Merge one formation with its (possibly absent) detail into a row.
///
/// Fails only when the formation cannot identify itself: without `ifc`
/// there is no Mon Master detail URL to point the row at.
pub fn merge_row(
    formation: &Formation,
    detail: Option<&EtablissementDetail>,
) -> Result<SnapshotRow, MergeError> {
    let ifc = formation
        .ifc
        .as_deref()
        .filter(|ifc| !ifc.is_empty())
        .ok_or(MergeError::MissingField { field: "ifc" })?;

    let indicateurs = formation.indicateurs.as_ref();

    Ok(SnapshotRow {
        intitule_mention: formation.intitule_mention.clone(),
        intitule_parcours: formation.intitule_parcours.clone(),
        ville: formation.first_ville().map(String::from),
        alternance: formation.alternance,
        taux_acces: normalize_taux_acces(indicateurs.and_then(|i| i.taux_acces)),
        rang_dernier_appele: indicateurs.and_then(|i| i.rang_dernier_appele),
        nb_candidatures_confirmees: indicateurs.and_then(|i| i.nb_candidatures_confirmees),
        capacite: formation.capacite,
        lien_monmaster: Some(format!(
            "{SITE_ORIGIN}/formation/{}/{ifc}/detail",
            formation.uai
        )),
        lien_fiche: detail.and_then(|d| select_lien_fiche(formation, d)),
        incomplete: false,
    })
}

/// Best-effort row for a formation whose merge failed: primary fields
/// carry over, both links stay absent, `incomplete` is set.
pub fn placeholder_row(formation: &Formation) -> SnapshotRow {
    let indicateurs = formation.indicateurs.as_ref();
    SnapshotRow {
        intitule_mention: formation.intitule_mention.clone(),
        intitule_parcours: formation.intitule_parcours.clone(),
        ville: formation.first_ville().map(String::from),
        alternance: formation.alternance,
        taux_acces: normalize_taux_acces(indicateurs.and_then(|i| i.taux_acces)),
        rang_dernier_appele: indicateurs.and_then(|i| i.rang_dernier_appele),
        nb_candidatures_confirmees: indicateurs.and_then(|i| i.nb_candidatures_confirmees),
        capacite: formation.capacite,
        lien_monmaster: None,
        lien_fiche: None,
        incomplete: true,
    }
}

/// Result of the enrichment fan-out.
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    /// One row per input formation, in input order.
    pub rows: Vec<SnapshotRow>,
    pub warnings: Vec<String>,
    pub incomplete_rows: usize,
}

/// Fans one task out per formation and collects rows in input order.
///
/// Fan-out is unbounded; the shared [`DetailCache`] keeps the number of
/// upstream lookups at one per distinct institution, which is the only
/// concurrency limit this pipeline wants.
pub struct Enricher {
    cache: Arc<DetailCache>,
}

impl Enricher {
    pub fn new(cache: Arc<DetailCache>) -> Self {
        Self { cache }
    }

    pub async fn enrich(&self, formations: &[Formation]) -> EnrichOutcome {
        let mut handles = Vec::with_capacity(formations.len());
        for formation in formations {
            let cache = Arc::clone(&self.cache);
            let formation = formation.clone();
            handles.push(tokio::spawn(async move {
                let detail = match cache.get(&formation.uai, &formation.inm).await {
                    Ok(found) => found,
                    Err(error) => {
                        warn!(
                            uai = formation.uai.as_str(),
                            %error,
                            "detail lookup failed, row continues without etablissement data"
                        );
                        None
                    }
                };
                merge_row(&formation, detail.as_deref())
            }));
        }

        let mut rows = Vec::with_capacity(formations.len());
        let mut warnings = Vec::new();
        let mut incomplete_rows = 0;

        // Join in input order; completion order never reorders rows.
        for (formation, handle) in formations.iter().zip(handles) {
            let merged = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(MergeError::TaskFailed(join_error.to_string())),
            };
            match merged {
                Ok(row) => rows.push(row),
                Err(error) => {
                    warn!(
                        uai = formation.uai.as_str(),
                        %error,
                        "formation degraded to a placeholder row"
                    );
                    warnings.push(format!(
                        "formation {} ({}): {error}",
                        formation.uai, formation.intitule_mention
                    ));
                    incomplete_rows += 1;
                    rows.push(placeholder_row(formation));
                }
            }
        }

        EnrichOutcome {
            rows,
            warnings,
            incomplete_rows,
        }
    }
}

use serde::{Deserialize, Deserializer};

/// One formation entry from the `content` array of the search response.
///
/// `uai` and `inm` are required: without them the etablissement lookup has
/// no key, so a payload missing either is treated as malformed. Everything
/// else is optional and defaulted, the upstream omits fields freely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Formation {
    pub uai: String,
    pub inm: String,
    #[serde(default)]
    pub inmp: Option<String>,
    #[serde(default)]
    pub ifc: Option<String>,
    #[serde(rename = "intituleMention", default)]
    pub intitule_mention: String,
    #[serde(rename = "intituleParcours", default)]
    pub intitule_parcours: Option<String>,
    #[serde(default)]
    pub lieux: Vec<Lieu>,
    #[serde(default)]
    pub alternance: bool,
    #[serde(default)]
    pub mixte: bool,
    #[serde(rename = "juryRectoral", default)]
    pub jury_rectoral: bool,
    #[serde(default)]
    pub capacite: Option<u32>,
    #[serde(rename = "indicateursAnneeDerniere", default)]
    pub indicateurs: Option<Indicateurs>,
}

impl Formation {
    /// City of the first listed teaching site, if any.
    pub fn first_ville(&self) -> Option<&str> {
        self.lieux.iter().find_map(|lieu| lieu.ville.as_deref())
    }
}

/// Teaching site attached to a formation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Lieu {
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(rename = "codePostal", default)]
    pub code_postal: Option<String>,
    #[serde(default)]
    pub departement: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub adresse: Option<String>,
}

/// Last-session admission indicators for a formation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Indicateurs {
    /// Admission rate as a 0..1 fraction. The upstream occasionally sends
    /// this as a string or null; anything that is not a JSON number is
    /// read as absent.
    #[serde(rename = "tauxAcces", default, deserialize_with = "numeric_or_none")]
    pub taux_acces: Option<f64>,
    #[serde(rename = "rangDernierAppele", default)]
    pub rang_dernier_appele: Option<u32>,
    #[serde(rename = "nbCandidaturesConfirmees", default)]
    pub nb_candidatures_confirmees: Option<u32>,
}

fn numeric_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number.as_f64(),
        _ => None,
    })
}

/// Detail payload for one etablissement mention.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EtablissementDetail {
    #[serde(rename = "s1Parcours", default)]
    pub s1_parcours: Vec<ParcoursFiche>,
    /// Institution-level sheet link, used when no sub-program entry matches.
    #[serde(rename = "lienFiche", default)]
    pub lien_fiche: Option<String>,
}

/// Sub-program entry of a mention detail.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ParcoursFiche {
    #[serde(default)]
    pub inmp: Option<String>,
    #[serde(rename = "lienFiche", default)]
    pub lien_fiche: Option<String>,
}

/// Fully merged output record, one workbook line.
///
/// `taux_acces` is in percentage points, already rounded to two decimals.
/// `incomplete` marks placeholder rows produced when a merge failed; their
/// remaining fields carry whatever the primary record provided.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub intitule_mention: String,
    pub intitule_parcours: Option<String>,
    pub ville: Option<String>,
    pub alternance: bool,
    pub taux_acces: Option<f64>,
    pub rang_dernier_appele: Option<u32>,
    pub nb_candidatures_confirmees: Option<u32>,
    pub capacite: Option<u32>,
    pub lien_monmaster: Option<String>,
    pub lien_fiche: Option<String>,
    pub incomplete: bool,
}

//! # Domain Models
//!
//! Payload and output types for the Mon Master snapshot pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SearchQuery`] | Validated free-text search query |
//! | [`Formation`] | One search hit (primary record) |
//! | [`Lieu`] | Teaching site of a formation |
//! | [`Indicateurs`] | Last-session admission indicators |
//! | [`EtablissementDetail`] | Mention detail for one etablissement (secondary record) |
//! | [`ParcoursFiche`] | Sub-program sheet link inside a detail payload |
//! | [`SnapshotRow`] | Fully merged record, one workbook line |
//!
//! Payload structs deserialize leniently: unknown fields are ignored and
//! optional fields default, so upstream schema drift degrades instead of
//! failing the run. Only the lookup keys (`uai`, `inm`) are required.

mod query;
mod records;

pub use query::SearchQuery;
pub use records::{
    EtablissementDetail, Formation, Indicateurs, Lieu, ParcoursFiche, SnapshotRow,
};

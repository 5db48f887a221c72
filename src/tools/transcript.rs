//! Ranking of the transcripts an annotator reports for one variant.

use std::fmt;

use crate::config::TranscriptPreferences;

/// Why a transcript ranks where it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionReason {
    ManeSelect,
    ManePlusClinical,
    /// Matched one of the configured accession prefixes.
    PreferredPrefix(String),
    EnsemblCanonical,
    NotPreferred,
}

impl SelectionReason {
    pub fn is_preferred(&self) -> bool {
        !matches!(self, SelectionReason::NotPreferred)
    }
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionReason::ManeSelect => write!(f, "MANE Select"),
            SelectionReason::ManePlusClinical => write!(f, "MANE Plus Clinical"),
            SelectionReason::PreferredPrefix(prefix) => write!(f, "Preferred source ({})", prefix),
            SelectionReason::EnsemblCanonical => write!(f, "Ensembl Canonical"),
            SelectionReason::NotPreferred => write!(f, "Non-preferred transcript"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTranscript {
    pub transcript: String,
    /// Lower is better.
    pub rank: u8,
    pub reason: SelectionReason,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptSelector {
    preferences: TranscriptPreferences,
}

impl TranscriptSelector {
    pub fn new(preferences: TranscriptPreferences) -> Self {
        Self { preferences }
    }

    /// MANE lists first, then accession prefixes, then Ensembl canonical markers.
    pub fn reason(&self, transcript: &str) -> SelectionReason {
        let prefs = &self.preferences;
        if transcript.is_empty() {
            return SelectionReason::NotPreferred;
        }
        if prefs.use_mane_select && prefs.mane_select.iter().any(|t| t == transcript) {
            return SelectionReason::ManeSelect;
        }
        if prefs.use_mane_plus_clinical && prefs.mane_plus_clinical.iter().any(|t| t == transcript) {
            return SelectionReason::ManePlusClinical;
        }
        if let Some(prefix) = prefs
            .preferred_prefixes
            .iter()
            .find(|p| transcript.starts_with(p.as_str()))
        {
            return SelectionReason::PreferredPrefix(prefix.clone());
        }
        if prefs.use_ensembl_canonical && transcript.to_lowercase().contains("canonical") {
            return SelectionReason::EnsemblCanonical;
        }
        SelectionReason::NotPreferred
    }

    pub fn is_preferred(&self, transcript: &str) -> bool {
        self.reason(transcript).is_preferred()
    }

    /// Rank candidates, best first. Equal ranks keep their input order.
    pub fn rank(&self, transcripts: &[String]) -> Vec<RankedTranscript> {
        let mut ranked: Vec<RankedTranscript> = transcripts
            .iter()
            .map(|transcript| {
                let reason = self.reason(transcript);
                let rank = match &reason {
                    SelectionReason::ManeSelect => 1,
                    SelectionReason::ManePlusClinical => 2,
                    _ if transcript.contains("NM_") => 3,
                    _ if transcript.contains("ENST") => 4,
                    reason if reason.is_preferred() => 5,
                    _ => 10,
                };
                RankedTranscript {
                    transcript: transcript.clone(),
                    rank,
                    reason,
                }
            })
            .collect();
        ranked.sort_by_key(|r| r.rank);
        ranked
    }

    /// Best candidate with its reason, `None` when there are no candidates.
    pub fn select_best(&self, transcripts: &[String]) -> Option<RankedTranscript> {
        self.rank(transcripts).into_iter().next()
    }
}

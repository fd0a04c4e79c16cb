use crate::normalize::canonical::canonicalize;
use crate::types::vocabulary::{ColumnRole, Vocabulary};

/// Resolves raw column labels against a [`Vocabulary`].
///
/// Both lookups are two-pass: an exact match on the canonical form first, then a
/// substring match in label order.
#[derive(Debug, Clone)]
pub struct ColumnMatcher<'a> {
    vocabulary: &'a Vocabulary,
}

/// A raw label paired with its canonical form.
struct Canonical<'l> {
    raw: &'l str,
    canonical: String,
}

fn canonical_labels(raw_labels: &[String]) -> Vec<Canonical<'_>> {
    raw_labels
        .iter()
        .map(|raw| Canonical {
            raw: raw.as_str(),
            canonical: canonicalize(raw),
        })
        .collect()
}

impl<'a> ColumnMatcher<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Pairs every desired column found in `raw_labels` with the raw label that
    /// carries it, in vocabulary order. Desired columns without a match are left out.
    ///
    /// A raw label is claimed by at most one desired column. Exact canonical
    /// matches claim first; the remaining names then take unclaimed labels by
    /// substring, most specific (longest) name first, so `Déstockage batterie`
    /// is never taken for `Stockage batterie` nor `Eolien terrestre` for `Eolien`.
    pub fn match_desired_pairs<'l>(&self, raw_labels: &'l [String]) -> Vec<(&'a str, &'l str)> {
        let vocabulary: &'a Vocabulary = self.vocabulary;
        let labels = canonical_labels(raw_labels);
        let keys: Vec<String> = vocabulary
            .desired_columns
            .iter()
            .map(|desired| canonicalize(desired))
            .collect();

        let mut assigned: Vec<Option<usize>> = vec![None; keys.len()];
        let mut claimed = vec![false; labels.len()];

        for (slot, key) in keys.iter().enumerate() {
            let exact = (0..labels.len())
                .find(|&i| !claimed[i] && !key.is_empty() && &labels[i].canonical == key);
            if let Some(i) = exact {
                assigned[slot] = Some(i);
                claimed[i] = true;
            }
        }

        let mut by_specificity: Vec<usize> = (0..keys.len())
            .filter(|&slot| assigned[slot].is_none() && !keys[slot].is_empty())
            .collect();
        by_specificity.sort_by_key(|&slot| std::cmp::Reverse(keys[slot].len()));
        for slot in by_specificity {
            let key = &keys[slot];
            let fuzzy = (0..labels.len()).find(|&i| {
                let label = &labels[i].canonical;
                !claimed[i]
                    && !label.is_empty()
                    && (label.contains(key.as_str()) || key.contains(label.as_str()))
            });
            if let Some(i) = fuzzy {
                assigned[slot] = Some(i);
                claimed[i] = true;
            }
        }

        vocabulary
            .desired_columns
            .iter()
            .zip(assigned)
            .filter_map(|(desired, index)| index.map(|i| (desired.as_str(), labels[i].raw)))
            .collect()
    }

    /// The raw labels of the desired columns present in `raw_labels`, in vocabulary order.
    pub fn match_desired_columns<'l>(&self, raw_labels: &'l [String]) -> Vec<&'l str> {
        self.match_desired_pairs(raw_labels)
            .into_iter()
            .map(|(_, raw)| raw)
            .collect()
    }

    /// The raw label playing `role`, if any.
    ///
    /// Candidate names from the vocabulary are tried in priority order, then the
    /// first label whose canonical form contains the role keyword.
    pub fn find<'l>(&self, raw_labels: &'l [String], role: ColumnRole) -> Option<&'l str> {
        let labels = canonical_labels(raw_labels);
        self.vocabulary
            .candidates(role)
            .iter()
            .find_map(|candidate| labels.iter().find(|l| &l.canonical == candidate))
            .or_else(|| labels.iter().find(|l| l.canonical.contains(role.keyword())))
            .map(|l| l.raw)
    }
}

//! Approximate byte-signature matching.
//!
//! A position is a candidate when its first byte equals a candidate's lead
//! byte; the candidate then matches when the number of differing bytes over
//! its full length is at most the pattern's tolerance. Mismatches are counted
//! afresh for every attempt. Wildcard bytes never mismatch.

use memchr::{memchr, memchr2, memchr3, memrchr, memrchr2, memrchr3};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    candidates: Vec<Vec<Option<u8>>>,
    tolerance: usize,
}

impl Pattern {
    pub fn new(candidates: Vec<Vec<Option<u8>>>, tolerance: usize) -> Result<Self> {
        if candidates.is_empty() || candidates.iter().any(|c| c.is_empty()) {
            return Err(Error::InvalidSignature(
                "Pattern needs at least one non-empty candidate".to_string(),
            ));
        }
        if candidates.iter().any(|c| tolerance >= c.len()) {
            return Err(Error::InvalidSignature(format!(
                "Tolerance {} would accept any position",
                tolerance
            )));
        }
        Ok(Self {
            candidates,
            tolerance,
        })
    }

    /// Single candidate that must match byte for byte.
    pub fn exact(bytes: &[u8]) -> Self {
        Self {
            candidates: vec![bytes.iter().copied().map(Some).collect()],
            tolerance: 0,
        }
    }

    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    pub fn candidates(&self) -> &[Vec<Option<u8>>] {
        &self.candidates
    }

    /// Length of the longest candidate.
    pub fn len(&self) -> usize {
        self.candidates.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first candidate accepted at `pos`, if any.
    pub fn match_at(&self, haystack: &[u8], pos: usize) -> Option<usize> {
        self.candidates
            .iter()
            .position(|candidate| self.candidate_matches(candidate, haystack, pos))
    }

    pub fn matches_at(&self, haystack: &[u8], pos: usize) -> bool {
        self.match_at(haystack, pos).is_some()
    }

    fn candidate_matches(&self, candidate: &[Option<u8>], haystack: &[u8], pos: usize) -> bool {
        let Some(window) = pos
            .checked_add(candidate.len())
            .and_then(|end| haystack.get(pos..end))
        else {
            return false;
        };

        if let Some(lead) = candidate[0]
            && window[0] != lead
        {
            return false;
        }

        let mut mismatches = 0;
        for (expected, actual) in candidate.iter().zip(window) {
            if let Some(value) = expected
                && value != actual
            {
                mismatches += 1;
                if mismatches > self.tolerance {
                    return false;
                }
            }
        }
        true
    }

    /// Distinct lead bytes, or `None` when some candidate leads with a wildcard.
    fn lead_bytes(&self) -> Option<Vec<u8>> {
        let mut leads = Vec::new();
        for candidate in &self.candidates {
            let lead = candidate[0]?;
            if !leads.contains(&lead) {
                leads.push(lead);
            }
        }
        Some(leads)
    }

    fn next_lead(&self, haystack: &[u8], from: usize) -> Option<usize> {
        let tail = haystack.get(from..)?;
        let found = match self.lead_bytes().as_deref() {
            None => (!tail.is_empty()).then_some(0),
            Some([a]) => memchr(*a, tail),
            Some([a, b]) => memchr2(*a, *b, tail),
            Some([a, b, c]) => memchr3(*a, *b, *c, tail),
            Some(leads) => tail.iter().position(|b| leads.contains(b)),
        };
        found.map(|i| from + i)
    }

    /// Last lead position within `haystack[low..=high]`.
    fn prev_lead(&self, haystack: &[u8], low: usize, high: usize) -> Option<usize> {
        let window = haystack.get(low..=high)?;
        let found = match self.lead_bytes().as_deref() {
            None => Some(window.len() - 1),
            Some([a]) => memrchr(*a, window),
            Some([a, b]) => memrchr2(*a, *b, window),
            Some([a, b, c]) => memrchr3(*a, *b, *c, window),
            Some(leads) => window.iter().rposition(|b| leads.contains(b)),
        };
        found.map(|i| low + i)
    }
}

/// Scan upward from `start` for the first accepted position.
pub fn find_forward(haystack: &[u8], pattern: &Pattern, start: usize) -> Option<usize> {
    let mut from = start;
    while let Some(pos) = pattern.next_lead(haystack, from) {
        if pattern.matches_at(haystack, pos) {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Scan downward from just below `start`, covering positions
/// `start - max_distance < pos < start`.
pub fn find_backward(
    haystack: &[u8],
    pattern: &Pattern,
    start: usize,
    max_distance: usize,
) -> Option<usize> {
    if start == 0 || haystack.is_empty() {
        return None;
    }
    let low = (start + 1).saturating_sub(max_distance);
    let mut high = (start - 1).min(haystack.len() - 1);
    if low > high {
        return None;
    }

    loop {
        let pos = pattern.prev_lead(haystack, low, high)?;
        if pattern.matches_at(haystack, pos) {
            return Some(pos);
        }
        if pos == low {
            return None;
        }
        high = pos - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{SELECT_SONG, builtin_signatures, parse_pattern};

    fn fuzzy(text: &str, tolerance: usize) -> Pattern {
        Pattern::new(vec![parse_pattern(text).unwrap()], tolerance).unwrap()
    }

    #[test]
    fn test_exact_pattern_forward() {
        let hay = [0x00, 0x11, 0x4A, 0x03, 0x68, 0x9B, 0x1A, 0x4A];
        let pattern = Pattern::exact(&[0x4A, 0x03, 0x68, 0x9B, 0x1A]);
        assert_eq!(find_forward(&hay, &pattern, 0), Some(2));
        assert_eq!(find_forward(&hay, &pattern, 3), None);
    }

    #[test]
    fn test_tolerance_boundary() {
        let select = builtin_signatures().pattern(SELECT_SONG).unwrap();
        let exact: Vec<u8> = select.candidates()[0]
            .iter()
            .map(|b| b.unwrap())
            .collect();
        let tolerance = select.tolerance();

        let mut hay = vec![0xEE; 0x10];
        hay.extend_from_slice(&exact);
        hay.extend_from_slice(&[0xEE; 0x10]);
        assert_eq!(find_forward(&hay, &select, 0), Some(0x10));

        // Corrupt bytes after the lead one at a time.
        let mut within = hay.clone();
        for i in 1..=tolerance {
            within[0x10 + i] ^= 0xFF;
        }
        assert_eq!(find_forward(&within, &select, 0), Some(0x10));

        let mut beyond = within.clone();
        beyond[0x10 + tolerance + 1] ^= 0xFF;
        assert_eq!(find_forward(&beyond, &select, 0), None);
    }

    #[test]
    fn test_lead_byte_must_match() {
        let pattern = fuzzy("AA BB CC DD", 2);
        let hay = [0x00, 0xBB, 0xCC, 0xDD];
        assert_eq!(find_forward(&hay, &pattern, 0), None);
    }

    #[test]
    fn test_wildcards_never_mismatch() {
        let pattern = fuzzy("AA ?? CC", 0);
        let hay = [0xAA, 0x42, 0xCC];
        assert_eq!(find_forward(&hay, &pattern, 0), Some(0));
    }

    #[test]
    fn test_pattern_must_fit() {
        let pattern = Pattern::exact(&[0xAA, 0xBB]);
        assert_eq!(find_forward(&[0x00, 0xAA], &pattern, 0), None);
        assert_eq!(find_forward(&[0xAA, 0xBB], &pattern, 5), None);
    }

    #[test]
    fn test_multi_candidate_tries_each() {
        let pattern = Pattern::new(
            vec![parse_pattern("70 B5").unwrap(), parse_pattern("F0 B5").unwrap()],
            0,
        )
        .unwrap();
        let hay = [0x00, 0xF0, 0xB5, 0x70, 0xB5];
        assert_eq!(find_forward(&hay, &pattern, 0), Some(1));
        assert_eq!(pattern.match_at(&hay, 1), Some(1));
        assert_eq!(pattern.match_at(&hay, 3), Some(0));
        assert_eq!(find_backward(&hay, &pattern, 5, 0x100), Some(3));
    }

    #[test]
    fn test_backward_window() {
        let pattern = Pattern::exact(&[0x00, 0xB5]);
        let mut hay = vec![0xFF; 0x100];
        hay[0x80] = 0x00;
        hay[0x81] = 0xB5;

        // Nearest match below start wins.
        hay[0x90] = 0x00;
        hay[0x91] = 0xB5;
        assert_eq!(find_backward(&hay, &pattern, 0xA0, 0x20), Some(0x90));

        // Start position itself is excluded.
        assert_eq!(find_backward(&hay, &pattern, 0x90, 0x20), Some(0x80));

        // Lower bound is exclusive: start - max_distance is not examined.
        assert_eq!(find_backward(&hay, &pattern, 0xA0, 0x10), None);
        assert_eq!(find_backward(&hay, &pattern, 0xAF, 0x20), Some(0x90));
        assert_eq!(find_backward(&hay, &pattern, 0xB0, 0x20), None);
    }

    #[test]
    fn test_backward_edges() {
        let pattern = Pattern::exact(&[0xAA]);
        assert_eq!(find_backward(&[0xAA, 0x00], &pattern, 0, 0x10), None);
        assert_eq!(find_backward(&[0xAA, 0x00], &pattern, 2, 0x10), Some(0));
        assert_eq!(find_backward(&[0xAA, 0x00], &pattern, 2, 0), None);
        assert_eq!(find_backward(&[0xAA, 0x00], &pattern, 100, 0x1000), Some(0));
    }

    #[test]
    fn test_rejects_degenerate_patterns() {
        assert!(Pattern::new(vec![], 0).is_err());
        assert!(Pattern::new(vec![vec![]], 0).is_err());
        assert!(Pattern::new(vec![vec![Some(1), Some(2)]], 2).is_err());
    }
}

use std::collections::HashMap;

use crate::text::fold_upper;

/// Header names keyed by their folded form (upper-case, no accents,
/// collapsed whitespace), remembering the original spelling and position.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveSet {
    map: HashMap<String, (usize, String)>,
}

fn fold_key(name: &str) -> String {
    let folded = fold_upper(name.trim().trim_matches('\u{feff}'));
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (idx, name) in names.into_iter().enumerate() {
            let name = name.as_ref();
            map.entry(fold_key(name))
                .or_insert_with(|| (idx, name.to_string()));
        }
        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&fold_key(name))
            .map(|(_, value)| value.as_str())
    }

    /// Position of the first header matching `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.map.get(&fold_key(name)).map(|(idx, _)| *idx)
    }

    /// Position of the first alias that is present, in alias order.
    pub fn position_of_any(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.position(alias))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&fold_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_regardless_of_case_accents_and_spacing() {
        let set = CaseInsensitiveSet::new(["RUT PACIENTE", "Dígito", " Rut "]);
        assert_eq!(set.position("rut  paciente"), Some(0));
        assert_eq!(set.position("DIGITO"), Some(1));
        assert_eq!(set.get("rut"), Some(" Rut "));
        assert_eq!(set.position_of_any(&["DV", "Digito"]), Some(1));
        assert!(!set.contains("FECHA"));
    }
}

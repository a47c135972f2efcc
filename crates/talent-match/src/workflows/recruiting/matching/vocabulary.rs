use serde::{Deserialize, Serialize};

/// Skills recognised out of the box, in extraction order.
pub const DEFAULT_SKILLS: [&str; 9] = [
    "React",
    "TypeScript",
    "JavaScript",
    "Node",
    "Python",
    "Django",
    "SQL",
    "AWS",
    "Docker",
];

/// Ordered controlled vocabulary of skill names.
///
/// Extraction is plain case-insensitive substring containment: an entry that occurs
/// inside an unrelated word ("Node" in "Nodes") still matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillVocabulary {
    entries: Vec<String>,
    lowered: Vec<String>,
}

impl SkillVocabulary {
    /// Builds a vocabulary, dropping blank entries and case-insensitive duplicates.
    /// The first spelling of a duplicated entry is kept.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self {
            entries: Vec::new(),
            lowered: Vec::new(),
        };

        for entry in entries {
            let entry = entry.into();
            let trimmed = entry.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            if vocabulary.lowered.contains(&lowered) {
                continue;
            }
            vocabulary.entries.push(trimmed.to_string());
            vocabulary.lowered.push(lowered);
        }

        vocabulary
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        let lowered = skill.trim().to_lowercase();
        self.lowered.contains(&lowered)
    }

    /// Entries found anywhere in `text`, in vocabulary order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lowered)| haystack.contains(lowered.as_str()))
            .map(|(entry, _)| entry.clone())
            .collect()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS)
    }
}

impl From<Vec<String>> for SkillVocabulary {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}

impl From<SkillVocabulary> for Vec<String> {
    fn from(vocabulary: SkillVocabulary) -> Self {
        vocabulary.entries
    }
}

//! Observation records and rated-observable interchange
//!
//! The form layer hands ratings over as flat strings of the shape
//! `"[Subject: ]<level phrase> - <label>"`. They are decoded into
//! [`RatedObservable`] here and only turned back into strings at that boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical subject for ratings that apply to the whole class.
pub const CLASS_SUBJECT: &str = "Classe";

const CLASS_ALIASES: [&str; 3] = ["Classe", "Class", "Toute la classe"];

/// One recorded assessment event, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Observation {
    #[serde(alias = "Domaine")]
    pub domain: String,
    #[serde(alias = "Composante")]
    pub component: String,
    #[serde(alias = "Critère", alias = "learning_title")]
    pub learning_title: String,
    #[serde(alias = "Activités")]
    pub activities: Vec<String>,
    #[serde(alias = "transversal_skills_mobilized")]
    pub transversal_skills_mobilized: Vec<String>,
    #[serde(alias = "cognitive_processes_mobilized")]
    pub cognitive_processes_mobilized: Vec<String>,
    #[serde(alias = "Observables", alias = "rated_observables")]
    pub rated_observables: Vec<String>,
    #[serde(alias = "Commentaire")]
    pub comment: String,
    #[serde(alias = "highlighted_skill")]
    pub highlighted_skill: Option<String>,
    #[serde(alias = "highlighted_process")]
    pub highlighted_process: Option<String>,
}

impl Observation {
    /// Parse a JSON array of observations.
    pub fn list_from_json(json: &str) -> anyhow::Result<Vec<Observation>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Grouped rating rows for this observation.
    pub fn observable_rows(&self) -> Vec<ObservableRow> {
        group_observables(&self.rated_observables)
    }

    /// Highlighted skill, ignoring blank values.
    pub fn highlighted_skill(&self) -> Option<&str> {
        non_blank(self.highlighted_skill.as_deref())
    }

    /// Highlighted process, ignoring blank values.
    pub fn highlighted_process(&self) -> Option<&str> {
        non_blank(self.highlighted_process.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The 3-point maturity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Seed = 0,
    Sprout = 1,
    Bloom = 2,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Seed, Level::Sprout, Level::Bloom];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Level> {
        Self::ALL.get(index).copied()
    }

    /// Full phrase used in the interchange strings.
    pub fn phrase(self) -> &'static str {
        match self {
            Level::Seed => "🌰 Petite graine",
            Level::Sprout => "🌱 En train de grandir",
            Level::Bloom => "🌸 Épanoui(e)",
        }
    }

    /// Part of the phrase that identifies the level; the emoji is optional.
    fn keyword(self) -> &'static str {
        match self {
            Level::Seed => "Petite graine",
            Level::Sprout => "En train de grandir",
            Level::Bloom => "Épanoui",
        }
    }

    /// Level whose keyword appears in `text`, when exactly one does.
    fn find_in(text: &str) -> Option<Level> {
        let mut found = Level::ALL.iter().copied().filter(|l| text.contains(l.keyword()));
        match (found.next(), found.next()) {
            (Some(level), None) => Some(level),
            _ => None,
        }
    }
}

/// A skill indicator rated for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedObservable {
    pub subject: String,
    pub level: Level,
    pub label: String,
}

impl RatedObservable {
    pub fn new(subject: impl Into<String>, level: Level, label: impl Into<String>) -> Self {
        Self {
            subject: canonical_subject(&subject.into()),
            level,
            label: label.into(),
        }
    }

    /// Decode an interchange string. Never fails: without a recognisable level
    /// phrase the rating defaults to [`Level::Sprout`] and the whole remainder
    /// becomes the label.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        let (subject, rest) = match raw.split_once(':') {
            Some((head, tail)) if Level::find_in(head).is_none() && !head.contains(" - ") => {
                (canonical_subject(head), tail.trim())
            }
            _ => (CLASS_SUBJECT.to_string(), raw),
        };

        // the level phrase sits before the first " - "; the label may itself
        // contain a level keyword or another " - "
        let found = match rest.split_once(" - ") {
            Some((head, label)) => Level::find_in(head).map(|level| (level, label.trim())),
            None => Level::find_in(rest).map(|level| (level, rest)),
        };
        let (level, label) = match found {
            Some(found) => found,
            None => {
                log::warn!(
                    "Rated observable without a level phrase, assuming middle level: {raw:?}"
                );
                (Level::Sprout, rest)
            }
        };

        Self {
            subject,
            level,
            label: label.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn is_class(&self) -> bool {
        self.subject == CLASS_SUBJECT
    }
}

impl fmt::Display for RatedObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.subject, self.level.phrase(), self.label)
    }
}

/// Map every spelling of "whole class" to [`CLASS_SUBJECT`].
pub fn canonical_subject(subject: &str) -> String {
    let subject = subject.trim();
    if subject.is_empty() || CLASS_ALIASES.iter().any(|a| a.eq_ignore_ascii_case(subject)) {
        CLASS_SUBJECT.to_string()
    } else {
        subject.to_string()
    }
}

/// One visual row: a `(label, level)` pair and every subject rated so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableRow {
    pub label: String,
    pub level: Level,
    pub subjects: Vec<String>,
}

impl ObservableRow {
    pub fn subjects_text(&self) -> String {
        self.subjects.join(", ")
    }
}

/// Group raw rating strings by `(label, level)` in first-appearance order.
/// Subjects are deduplicated and the class, when present, is listed first.
pub fn group_observables<S: AsRef<str>>(raw: &[S]) -> Vec<ObservableRow> {
    let mut rows: Vec<ObservableRow> = Vec::new();

    for entry in raw {
        let rated = RatedObservable::parse(entry.as_ref());
        let index = match rows
            .iter()
            .position(|r| r.label == rated.label && r.level == rated.level)
        {
            Some(index) => index,
            None => {
                rows.push(ObservableRow {
                    label: rated.label.clone(),
                    level: rated.level,
                    subjects: Vec::new(),
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[index];
        if !row.subjects.contains(&rated.subject) {
            row.subjects.push(rated.subject);
        }
    }

    for row in &mut rows {
        if let Some(index) = row.subjects.iter().position(|s| s == CLASS_SUBJECT) {
            let class = row.subjects.remove(index);
            row.subjects.insert(0, class);
        }
    }

    rows
}

/// Free-text comment split into class-level and per-student parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSections {
    pub class: Vec<String>,
    pub students: Vec<(String, Vec<String>)>,
}

impl CommentSections {
    pub fn is_empty(&self) -> bool {
        self.class.is_empty() && self.students.is_empty()
    }
}

/// Split a comment into class and per-student fragments.
///
/// Lines that look like a leaked rating string (`:` and `" - "`) are dropped.
/// `Name: text` is attributed to `Name` only when it is one of `known_subjects`.
pub fn partition_comment<S: AsRef<str>>(comment: &str, known_subjects: &[S]) -> CommentSections {
    let mut sections = CommentSections::default();

    for line in comment.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains(':') && line.contains(" - ") {
            log::debug!("Dropping rating-like comment line: {line:?}");
            continue;
        }

        let Some((head, tail)) = line.split_once(':') else {
            sections.class.push(line.to_string());
            continue;
        };
        let head = head.trim();
        let tail = tail.trim();

        if canonical_subject(head) == CLASS_SUBJECT {
            if !tail.is_empty() {
                sections.class.push(tail.to_string());
            }
        } else if known_subjects.iter().any(|s| s.as_ref() == head) {
            if tail.is_empty() {
                continue;
            }
            match sections.students.iter_mut().find(|(name, _)| name == head) {
                Some((_, fragments)) => fragments.push(tail.to_string()),
                None => sections.students.push((head.to_string(), vec![tail.to_string()])),
            }
        } else {
            sections.class.push(line.to_string());
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_parse_recovers_every_triple() {
        for subject in ["Classe", "Alice", "Classe sauf Bob, Carla"] {
            for level in Level::ALL {
                let original = RatedObservable::new(subject, level, "Tient l'équilibre");
                let decoded = RatedObservable::parse(&original.encode());
                assert_eq!(decoded, original, "round trip failed for {}", original);
            }
        }
    }

    #[test]
    fn subject_defaults_to_class() {
        let rated = RatedObservable::parse("🌱 En train de grandir - Tient l'équilibre ≥ 3 sec");
        assert_eq!(rated.subject, CLASS_SUBJECT);
        assert_eq!(rated.level, Level::Sprout);
        assert_eq!(rated.label, "Tient l'équilibre ≥ 3 sec");
    }

    #[test]
    fn level_matches_without_emoji() {
        let rated = RatedObservable::parse("Léo: Épanoui(e) - Ne tombe pas");
        assert_eq!(rated.subject, "Léo");
        assert_eq!(rated.level, Level::Bloom);
        assert_eq!(rated.label, "Ne tombe pas");
    }

    #[test]
    fn malformed_rating_defaults_to_middle_level() {
        // early application versions wrote "Name: label" without a level
        let rated = RatedObservable::parse("Léo: Change de pied spontanément");
        assert_eq!(rated.subject, "Léo");
        assert_eq!(rated.level, Level::Sprout);
        assert_eq!(rated.label, "Change de pied spontanément");

        let bare = RatedObservable::parse("Ne tombe pas");
        assert_eq!(bare.subject, CLASS_SUBJECT);
        assert_eq!(bare.label, "Ne tombe pas");
    }

    #[test]
    fn legacy_whole_class_subject_is_canonicalised() {
        let rated = RatedObservable::parse("Toute la classe: 🌸 Épanoui(e) - Attend son tour");
        assert!(rated.is_class());
    }

    #[test]
    fn label_keeps_inner_separators() {
        let rated = RatedObservable::parse("Alice: 🌰 Petite graine - Course - arrêt");
        assert_eq!(rated.level, Level::Seed);
        assert_eq!(rated.label, "Course - arrêt");
    }

    #[test]
    fn level_keywords_inside_the_label_are_ignored() {
        for label in ["Petite graine plantée", "Reste épanoui - En train de grandir"] {
            for level in Level::ALL {
                let original = RatedObservable::new("Alice", level, label);
                assert_eq!(RatedObservable::parse(&original.encode()), original);
            }
        }
    }

    #[test]
    fn grouping_merges_subjects_with_class_first() {
        let rows = group_observables(&[
            "Classe: 🌸 Épanoui(e) - Tient l'équilibre",
            "Léo: 🌸 Épanoui(e) - Tient l'équilibre",
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Tient l'équilibre");
        assert_eq!(rows[0].level, Level::Bloom);
        assert_eq!(rows[0].subjects, vec!["Classe", "Léo"]);
    }

    #[test]
    fn grouping_surfaces_class_first_and_deduplicates() {
        let rows = group_observables(&[
            "Léo: 🌱 En train de grandir - Ne tombe pas",
            "Léo: 🌱 En train de grandir - Ne tombe pas",
            "🌱 En train de grandir - Ne tombe pas",
            "Emma: 🌰 Petite graine - Ne tombe pas",
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subjects, vec!["Classe", "Léo"]);
        assert_eq!(rows[1].level, Level::Seed);
        assert_eq!(rows[1].subjects_text(), "Emma");
    }

    #[test]
    fn comment_partition() {
        let comment = "Très bonne séance\n\
                       Classe: groupe calme\n\
                       Léo: a persévéré\n\
                       Léo: a aidé Emma\n\
                       Emma: 🌸 Épanoui(e) - Ne tombe pas\n\
                       Rappel: prévoir des cerceaux\n";
        let sections = partition_comment(comment, &["Classe", "Léo", "Emma"]);
        assert_eq!(
            sections.class,
            vec!["Très bonne séance", "groupe calme", "Rappel: prévoir des cerceaux"]
        );
        assert_eq!(
            sections.students,
            vec![(
                "Léo".to_string(),
                vec!["a persévéré".to_string(), "a aidé Emma".to_string()]
            )]
        );
    }

    #[test]
    fn observation_accepts_camel_case_and_legacy_keys() {
        let json = r#"[
            {"domain": "Corps et motricité", "component": "Motricité globale",
             "learningTitle": "Sauter sur un pied",
             "ratedObservables": ["🌱 En train de grandir - Ne tombe pas"],
             "highlightedSkill": "Persévérance"},
            {"Domaine": "Affectivité", "Composante": "Gestion des émotions",
             "Critère": "Identifier ses émotions", "Mode": "Toute la classe",
             "Observables": ["Nomme l’émotion ressentie"], "Commentaire": ""}
        ]"#;
        let observations = Observation::list_from_json(json).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].learning_title, "Sauter sur un pied");
        assert_eq!(observations[0].highlighted_skill(), Some("Persévérance"));
        assert_eq!(observations[1].domain, "Affectivité");
        assert_eq!(observations[1].learning_title, "Identifier ses émotions");
        assert_eq!(observations[1].observable_rows()[0].level, Level::Sprout);
    }
}

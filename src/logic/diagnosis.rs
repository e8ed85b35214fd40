/// Returned when there is nothing to diagnose. Also accepted as an input
/// marker meaning "healthy".
pub const NO_SYMPTOMS: &str = "No signs of disease detected";

const UNRECOGNIZED_PREFIX: &str = "Unrecognized symptom";

/// Symptom substring to likely cause. Order decides output order only; every
/// matching key contributes its cause.
const SYMPTOM_CAUSES: &[(&str, &str)] = &[
    ("yellow leaves", "Nitrogen deficiency or natural leaf aging"),
    ("yellowing leaves", "Nitrogen deficiency or natural leaf aging"),
    ("brown tips", "Underwatering or dry air"),
    ("dry leaves", "Underwatering or air that is too hot"),
    ("wilted leaves", "Lack of water"),
    ("white coating", "Powdery mildew (fungal disease)"),
    ("black spots", "Black spot (fungal disease)"),
    ("leaves falling", "Stress: changed conditions, drafts or too little light"),
    ("webbing", "Spider mites"),
    ("sticky leaves", "Aphids or scale insects"),
    ("holes in leaves", "Chewing insect pests"),
    ("rot", "Root rot from overwatering"),
    ("buds dropping", "Too little light or nutrients"),
    ("pale veins", "Chlorosis: iron or magnesium deficiency"),
];

fn is_blank_or_sentinel(symptom: &str) -> bool {
    let trimmed = symptom.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_SYMPTOMS)
}

/// Maps free-text symptoms to known causes.
///
/// Each symptom is trimmed, lowercased and tested for containment against
/// every dictionary key. Symptoms matching no key are reported back verbatim
/// as unrecognized. Causes are de-duplicated in first-seen order and joined
/// with `"; "`.
pub fn diagnose<S: AsRef<str>>(symptoms: &[S]) -> String {
    if symptoms.iter().all(|s| is_blank_or_sentinel(s.as_ref())) {
        return NO_SYMPTOMS.to_string();
    }

    let mut findings: Vec<String> = Vec::new();
    let mut push_unique = |finding: String| {
        if !findings.contains(&finding) {
            findings.push(finding);
        }
    };

    for raw in symptoms.iter().map(AsRef::as_ref) {
        if is_blank_or_sentinel(raw) {
            continue;
        }
        let symptom = raw.trim().to_lowercase();

        let mut matched = false;
        for (key, cause) in SYMPTOM_CAUSES {
            if symptom.contains(key) {
                push_unique((*cause).to_string());
                matched = true;
            }
        }
        if !matched {
            push_unique(format!("{}: \"{}\"", UNRECOGNIZED_PREFIX, raw.trim()));
        }
    }

    if findings.is_empty() {
        NO_SYMPTOMS.to_string()
    } else {
        findings.join("; ")
    }
}

//! Princeton WordNet `dict/` directory reader
//!
//! Parses the `index.<pos>` and optional `<pos>.exc` files up front and keeps
//! the `data.<pos>` files in memory, resolving synset offsets on lookup. Only
//! the fields needed to list a synset's lemmas are read; pointers, frames and
//! glosses are skipped.
//!
//! Inflected terms are reduced to base forms before lookup, using the
//! exception lists first and the suffix detachment rules otherwise.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::{Lexicon, LexiconError, Sense};

/// Parts of speech in the order senses are returned
const PARTS_OF_SPEECH: [PartOfSpeech; 4] = [
    PartOfSpeech::Noun,
    PartOfSpeech::Verb,
    PartOfSpeech::Adjective,
    PartOfSpeech::Adverb,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// Suffix of the index/data file names
    fn file_suffix(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    /// Inflectional endings and their replacements, tried in order
    fn detachment_rules(self) -> &'static [(&'static str, &'static str)] {
        match self {
            PartOfSpeech::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("ves", "f"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            PartOfSpeech::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            PartOfSpeech::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
            PartOfSpeech::Adverb => &[],
        }
    }
}

/// Lemma -> synset offsets for one part of speech
type LemmaIndex = HashMap<String, Vec<usize>>;

/// Inflected form -> base forms for one part of speech
type ExceptionList = HashMap<String, Vec<String>>;

/// WordNet lexicon backed by a `dict/` directory
#[derive(Debug, Clone)]
pub struct WordNetLexicon {
    index: HashMap<PartOfSpeech, LemmaIndex>,
    exceptions: HashMap<PartOfSpeech, ExceptionList>,
    /// Raw contents of each data file
    data: HashMap<PartOfSpeech, Vec<u8>>,
}

impl WordNetLexicon {
    /// Loads every index/data pair present in `dir`, plus any exception lists
    ///
    /// Parts of speech whose files are missing are skipped. Fails if none are present.
    pub fn open(dir: &Path) -> Result<Self, LexiconError> {
        let mut index = HashMap::new();
        let mut exceptions = HashMap::new();
        let mut data = HashMap::new();

        for pos in PARTS_OF_SPEECH {
            let index_path = dir.join(format!("index.{}", pos.file_suffix()));
            let data_path = dir.join(format!("data.{}", pos.file_suffix()));
            if !index_path.is_file() || !data_path.is_file() {
                log::debug!("Skipping WordNet {} files: not present", pos.file_suffix());
                continue;
            }

            let file_name = format!("index.{}", pos.file_suffix());
            let mut lemmas = LemmaIndex::new();
            for (lemma, offsets) in parse_index(&read_file(&index_path)?, &file_name)? {
                lemmas.entry(lemma).or_default().extend(offsets);
            }
            index.insert(pos, lemmas);

            let exc_path = dir.join(format!("{}.exc", pos.file_suffix()));
            if exc_path.is_file() {
                exceptions.insert(pos, parse_exceptions(&read_file(&exc_path)?));
            }

            let data_content = fs::read(&data_path).map_err(|source| LexiconError::Io {
                path: data_path.clone(),
                source,
            })?;
            data.insert(pos, data_content);
        }

        if data.is_empty() {
            return Err(LexiconError::NoWordNetFiles(dir.to_path_buf()));
        }

        Ok(Self {
            index,
            exceptions,
            data,
        })
    }

    /// Number of distinct lemmas in the index
    pub fn index_len(&self) -> usize {
        self.index
            .values()
            .flat_map(HashMap::keys)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Indexed lemmas `form` reduces to under `pos`
    ///
    /// An exception list entry wins outright. Otherwise the form itself and
    /// one round of detachment are checked together, then the rules are
    /// reapplied until something matches or no candidates remain.
    fn base_forms(&self, form: &str, pos: PartOfSpeech) -> Vec<String> {
        let Some(lemmas) = self.index.get(&pos) else {
            return Vec::new();
        };

        if let Some(bases) = self.exceptions.get(&pos).and_then(|exc| exc.get(form)) {
            let candidates = std::iter::once(form.to_string()).chain(bases.iter().cloned());
            return known_forms(lemmas, candidates);
        }

        let rules = pos.detachment_rules();
        let mut forms = detach_suffixes(&[form.to_string()], rules);
        let found = known_forms(
            lemmas,
            std::iter::once(form.to_string()).chain(forms.iter().cloned()),
        );
        if !found.is_empty() {
            return found;
        }

        while !forms.is_empty() {
            forms = detach_suffixes(&forms, rules);
            let found = known_forms(lemmas, forms.iter().cloned());
            if !found.is_empty() {
                return found;
            }
        }

        Vec::new()
    }

    /// Reads the synset stored at `offset` in the data file for `pos`
    fn read_synset(&self, pos: PartOfSpeech, offset: usize) -> Result<Sense, LexiconError> {
        let file = format!("data.{}", pos.file_suffix());
        let malformed = |reason: String| LexiconError::MalformedEntry {
            file: file.clone(),
            reason,
        };

        let bytes = self
            .data
            .get(&pos)
            .ok_or_else(|| malformed("data file not loaded".to_string()))?;
        let rest = bytes
            .get(offset..)
            .ok_or_else(|| malformed(format!("offset {} past end of file", offset)))?;
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        let line = String::from_utf8_lossy(&rest[..end]);

        parse_data_line(&line, offset).map_err(malformed)
    }
}

impl Lexicon for WordNetLexicon {
    fn senses(&self, term: &str) -> Vec<Sense> {
        let key = normalize_lookup(term);
        let mut seen = HashSet::new();
        let mut senses = Vec::new();

        for pos in PARTS_OF_SPEECH {
            let Some(lemmas) = self.index.get(&pos) else {
                continue;
            };

            for form in self.base_forms(&key, pos) {
                if form != key {
                    log::debug!("'{}' reduced to {} '{}'", key, pos.file_suffix(), form);
                }

                let offsets = lemmas.get(&form).map(Vec::as_slice).unwrap_or_default();
                for &offset in offsets {
                    if !seen.insert((pos, offset)) {
                        continue;
                    }
                    match self.read_synset(pos, offset) {
                        Ok(sense) => senses.push(sense),
                        Err(e) => log::warn!("Skipping unreadable synset for '{}': {}", key, e),
                    }
                }
            }
        }

        senses
    }
}

/// WordNet stores lemmas lowercased with words joined by underscores
fn normalize_lookup(term: &str) -> String {
    term.to_lowercase().replace(' ', "_")
}

/// Applies every matching detachment rule to every form, dropping repeats
fn detach_suffixes(forms: &[String], rules: &[(&str, &str)]) -> Vec<String> {
    let mut seen = HashSet::new();
    forms
        .iter()
        .flat_map(|form| {
            rules.iter().filter_map(move |(suffix, replacement)| {
                form.strip_suffix(suffix)
                    .map(|stem| format!("{}{}", stem, replacement))
            })
        })
        .filter(|candidate| !candidate.is_empty() && seen.insert(candidate.clone()))
        .collect()
}

/// Keeps the candidates present in the index, in order and without repeats
fn known_forms(lemmas: &LemmaIndex, candidates: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for candidate in candidates {
        if lemmas.contains_key(&candidate) && !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

fn read_file(path: &Path) -> Result<String, LexiconError> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses an index file into (lemma, synset offsets) pairs
///
/// Line format: `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt offset...`.
/// Lines starting with a space belong to the license header.
fn parse_index(content: &str, file: &str) -> Result<Vec<(String, Vec<usize>)>, LexiconError> {
    let mut entries = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.is_empty() || line.starts_with(' ') {
            continue;
        }

        let malformed = |reason: &str| LexiconError::MalformedEntry {
            file: file.to_string(),
            reason: format!("line {}: {}", line_no + 1, reason),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(malformed("too few fields"));
        }

        let synset_cnt: usize = tokens[2]
            .parse()
            .map_err(|_| malformed("invalid synset_cnt"))?;
        let p_cnt: usize = tokens[3].parse().map_err(|_| malformed("invalid p_cnt"))?;

        // Skip pointer symbols, sense_cnt and tagsense_cnt
        let offsets_start = p_cnt
            .checked_add(6)
            .ok_or_else(|| malformed("invalid p_cnt"))?;
        let offsets_end = offsets_start
            .checked_add(synset_cnt)
            .ok_or_else(|| malformed("invalid synset_cnt"))?;
        let offsets = tokens
            .get(offsets_start..offsets_end)
            .ok_or_else(|| malformed("synset offsets missing"))?
            .iter()
            .map(|t| t.parse::<usize>().map_err(|_| malformed("invalid offset")))
            .collect::<Result<Vec<_>, _>>()?;

        entries.push((tokens[0].to_string(), offsets));
    }

    Ok(entries)
}

/// Parses an exception list: `inflected_form base_form [base_form...]` per line
///
/// Lines without a base form are ignored.
fn parse_exceptions(content: &str) -> ExceptionList {
    content
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let inflected = tokens.next()?;
            let bases: Vec<String> = tokens.map(str::to_string).collect();
            (!bases.is_empty()).then(|| (inflected.to_string(), bases))
        })
        .collect()
}

/// Parses the lemma list out of a data file line
///
/// Line format: `offset lex_filenum ss_type w_cnt word lex_id [word lex_id...] p_cnt ...`,
/// where `w_cnt` is two hexadecimal digits.
fn parse_data_line(line: &str, expected_offset: usize) -> Result<Sense, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(format!("offset {}: too few fields", expected_offset));
    }

    let offset: usize = tokens[0]
        .parse()
        .map_err(|_| format!("offset {}: invalid offset field", expected_offset))?;
    if offset != expected_offset {
        return Err(format!(
            "offset {}: line starts with offset {}",
            expected_offset, offset
        ));
    }

    let ss_type = tokens[2];
    let w_cnt = usize::from_str_radix(tokens[3], 16)
        .map_err(|_| format!("offset {}: invalid w_cnt", expected_offset))?;

    let lemmas = (0..w_cnt)
        .map(|i| {
            tokens
                .get(4 + 2 * i)
                .map(|word| strip_syntactic_marker(word).to_string())
                .ok_or_else(|| format!("offset {}: expected {} words", expected_offset, w_cnt))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sense {
        name: format!("{:08}-{}", offset, ss_type),
        lemmas,
    })
}

/// Removes adjective position markers such as `(a)`, `(p)` or `(ip)`
fn strip_syntactic_marker(word: &str) -> &str {
    match word.find('(') {
        Some(idx) if word.ends_with(')') => &word[..idx],
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LICENSE_HEADER: &str =
        "  1 This software and database is being provided to you, the LICENSEE\n";

    /// Builds a data file from synset bodies, returning its contents and the offset of each line
    fn build_data_file(bodies: &[&str]) -> (String, Vec<usize>) {
        let mut content = LICENSE_HEADER.to_string();
        let mut offsets = Vec::new();
        for body in bodies {
            let offset = content.len();
            offsets.push(offset);
            content.push_str(&format!("{:08} {}\n", offset, body));
        }
        (content, offsets)
    }

    /// Writes a tiny noun + adjective WordNet into a temp dir
    fn create_test_dict() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let (noun_data, noun_offsets) = build_data_file(&[
            "18 n 02 depository_financial_institution 0 bank 0 000 | a financial institution",
            "17 n 01 bank 0 000 | sloping land beside a body of water",
            "06 n 02 riverbank 0 riverside 0 000 | the bank of a river",
        ]);
        let noun_index = format!(
            "{}bank n 2 0 2 0 {:08} {:08}\nriverbank n 1 0 1 0 {:08}\n",
            LICENSE_HEADER, noun_offsets[0], noun_offsets[1], noun_offsets[2]
        );

        let (adj_data, adj_offsets) =
            build_data_file(&["00 s 02 galore(ip) 0 in_abundance(ip) 0 000 | in plenty"]);
        let adj_index = format!("{}galore a 1 0 1 0 {:08}\n", LICENSE_HEADER, adj_offsets[0]);

        let (verb_data, verb_offsets) =
            build_data_file(&["38 v 01 run 0 000 | move fast by using one's feet"]);
        let verb_index = format!("{}run v 1 0 1 0 {:08}\n", LICENSE_HEADER, verb_offsets[0]);

        let dir = temp_dir.path();
        fs::write(dir.join("data.noun"), noun_data).expect("write data.noun");
        fs::write(dir.join("index.noun"), noun_index).expect("write index.noun");
        fs::write(dir.join("data.adj"), adj_data).expect("write data.adj");
        fs::write(dir.join("index.adj"), adj_index).expect("write index.adj");
        fs::write(dir.join("data.verb"), verb_data).expect("write data.verb");
        fs::write(dir.join("index.verb"), verb_index).expect("write index.verb");
        fs::write(dir.join("verb.exc"), "ran run\nrunning run\n").expect("write verb.exc");

        temp_dir
    }

    #[test]
    fn test_open_and_lookup_senses() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        let senses = lexicon.senses("bank");
        assert_eq!(senses.len(), 2);
        assert_eq!(
            senses[0].lemmas,
            vec!["depository_financial_institution", "bank"]
        );
        assert_eq!(senses[1].lemmas, vec!["bank"]);
        assert!(senses[0].name.ends_with("-n"));
    }

    #[test]
    fn test_lookup_lowercases_and_joins_words() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        assert_eq!(lexicon.senses("BANK").len(), 2);
        assert!(lexicon.senses("river bank").is_empty());
        assert_eq!(lexicon.senses("Riverbank").len(), 1);
    }

    #[test]
    fn test_unknown_term_has_no_senses() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        assert!(lexicon.senses("xyzzy").is_empty());
    }

    #[test]
    fn test_adjective_markers_are_stripped() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        let senses = lexicon.senses("galore");
        assert_eq!(senses.len(), 1);
        assert_eq!(senses[0].lemmas, vec!["galore", "in_abundance"]);
        assert!(senses[0].name.ends_with("-s"));
    }

    #[test]
    fn test_index_len_counts_lemmas_across_pos() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        assert_eq!(lexicon.index_len(), 4);
    }

    #[test]
    fn test_plural_reduces_to_base_form() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        assert_eq!(lexicon.senses("banks"), lexicon.senses("bank"));
        assert_eq!(lexicon.senses("banks").len(), 2);
        assert_eq!(lexicon.senses("Riverbanks").len(), 1);
    }

    #[test]
    fn test_exception_list_maps_irregular_forms() {
        let temp_dir = create_test_dict();
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        for inflected in ["ran", "running"] {
            let senses = lexicon.senses(inflected);
            assert_eq!(senses.len(), 1, "No senses for {}", inflected);
            assert_eq!(senses[0].lemmas, vec!["run"]);
            assert!(senses[0].name.ends_with("-v"));
        }
    }

    #[test]
    fn test_missing_exception_list_falls_back_to_rules() {
        let temp_dir = create_test_dict();
        fs::remove_file(temp_dir.path().join("verb.exc")).expect("remove verb.exc");
        let lexicon = WordNetLexicon::open(temp_dir.path()).expect("Should open dict");

        assert!(lexicon.senses("ran").is_empty());
        assert_eq!(lexicon.senses("runs").len(), 1);
    }

    #[test]
    fn test_detach_suffixes_applies_every_matching_rule() {
        let noun_rules = PartOfSpeech::Noun.detachment_rules();
        let verb_rules = PartOfSpeech::Verb.detachment_rules();
        let adverb_rules = PartOfSpeech::Adverb.detachment_rules();

        assert_eq!(detach_suffixes(&["boxes".to_string()], noun_rules), vec!["boxe", "box"]);
        assert_eq!(detach_suffixes(&["hoped".to_string()], verb_rules), vec!["hope", "hop"]);
        assert!(detach_suffixes(&["fast".to_string()], adverb_rules).is_empty());
    }

    #[test]
    fn test_parse_exceptions_ignores_lines_without_base() {
        let exceptions = parse_exceptions("geese goose\nalone\nbits bit bite\n");
        assert_eq!(exceptions.len(), 2);
        assert_eq!(exceptions["geese"], vec!["goose"]);
        assert_eq!(exceptions["bits"], vec!["bit", "bite"]);
    }

    #[test]
    fn test_open_empty_dir_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = WordNetLexicon::open(temp_dir.path());
        assert!(matches!(result, Err(LexiconError::NoWordNetFiles(_))));
    }

    #[test]
    fn test_parse_index_rejects_truncated_offsets() {
        let result = parse_index("bank n 3 0 3 0 00000001\n", "index.noun");
        match result {
            Err(LexiconError::MalformedEntry { file, reason }) => {
                assert_eq!(file, "index.noun");
                assert!(reason.contains("line 1"));
            }
            _ => panic!("Expected MalformedEntry error"),
        }
    }

    #[test]
    fn test_parse_index_rejects_overflowing_counts() {
        for line in [
            "bank n 1 18446744073709551615 1 0 00000001\n",
            "bank n 18446744073709551615 0 1 0 00000001\n",
        ] {
            let result = parse_index(line, "index.noun");
            assert!(
                matches!(result, Err(LexiconError::MalformedEntry { .. })),
                "Expected MalformedEntry for {:?}",
                line
            );
        }
    }

    #[test]
    fn test_parse_index_skips_pointer_symbols() {
        let entries = parse_index("run v 2 3 @ ~ + 2 1 00000010 00000020\n", "index.verb")
            .expect("Should parse");
        assert_eq!(entries, vec![("run".to_string(), vec![10, 20])]);
    }

    #[test]
    fn test_parse_data_line_hex_word_count() {
        let words: Vec<String> = (0..10).map(|i| format!("w{} 0", i)).collect();
        let line = format!("00000042 03 n 0a {} 000 | gloss", words.join(" "));

        let sense = parse_data_line(&line, 42).expect("Should parse");
        assert_eq!(sense.lemmas.len(), 10);
        assert_eq!(sense.lemmas[9], "w9");
        assert_eq!(sense.name, "00000042-n");
    }

    #[test]
    fn test_parse_data_line_offset_mismatch() {
        let result = parse_data_line("00000099 03 n 01 word 0 000 | gloss", 42);
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_syntactic_marker() {
        assert_eq!(strip_syntactic_marker("galore(ip)"), "galore");
        assert_eq!(strip_syntactic_marker("elect(p)"), "elect");
        assert_eq!(strip_syntactic_marker("bank"), "bank");
    }
}

//! Content catalog: jokes, trivia questions and daily messages read from JSON files.
//!
//! Nothing is cached. Every query goes back to disk so edited files take
//! effect on the next request. Read and parse problems never reach the
//! caller of the `load_*` methods; they are logged and the category comes
//! back empty. The `read_*` functions expose the underlying errors for the
//! content validator.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::bot::callback::{Action, MAX_TOKEN_BYTES};
use crate::bot::markup::sanitize;
use crate::config::ContentPaths;

/// Field holding the list when a joke file is an object.
pub const JOKES_FIELD: &str = "chistes";

/// Why a content source yielded nothing.
#[derive(Debug)]
pub enum ContentError {
    /// File missing or unreadable.
    Read { path: PathBuf, source: std::io::Error },
    /// Not valid JSON.
    Parse { path: PathBuf, source: serde_json::Error },
    /// Valid JSON, unrecognized layout.
    Shape { path: PathBuf, detail: String },
    /// Category name that cannot map to a file.
    InvalidCategory(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "failed to read '{}': {}", path.display(), source),
            Self::Parse { path, source } => write!(f, "failed to parse '{}': {}", path.display(), source),
            Self::Shape { path, detail } => write!(f, "'{}' has no valid format: {}", path.display(), detail),
            Self::InvalidCategory(name) => write!(f, "invalid category name '{}'", name),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Shape { .. } | Self::InvalidCategory(_) => None,
        }
    }
}

/// A multiple-choice question. The answer is always one of the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaQuestion {
    pub category: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl TriviaQuestion {
    pub fn new(
        category: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, String> {
        let answer = answer.into();
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err("empty question".to_string());
        }
        if !options.contains(&answer) {
            return Err(format!("answer '{}' is not among the options", answer));
        }
        if let Some(long) = options.iter().find(|o| !fits_button(&Action::TriviaAnswer(o.to_string()))) {
            return Err(format!(
                "option '{}' is too long for a button ({} bytes max)",
                long,
                MAX_TOKEN_BYTES - Action::TriviaAnswer(String::new()).token().len()
            ));
        }
        Ok(Self {
            category: category.into(),
            prompt,
            options,
            answer,
        })
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }
}

/// Entries of a joke or message list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Items {
    pub items: Vec<String>,
    /// Entries that were neither text nor a scalar.
    pub non_text: usize,
}

/// Parsed trivia file.
#[derive(Debug, Default)]
pub struct TriviaLoad {
    pub by_category: BTreeMap<String, Vec<TriviaQuestion>>,
    /// Human-readable reasons for questions that were dropped.
    pub rejected: Vec<String>,
}

/// A joke file is either a bare list or `{"chistes": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JokeSource {
    List(Vec<Value>),
    Wrapped { chistes: Vec<Value> },
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(alias = "question", alias = "prompt")]
    pregunta: String,
    #[serde(alias = "options")]
    opciones: Vec<String>,
    #[serde(alias = "answer", alias = "correct")]
    respuesta: String,
}

/// Reads categories and their content from a [`ContentPaths`] layout.
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    paths: ContentPaths,
}

impl ContentCatalog {
    pub fn new(paths: ContentPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ContentPaths {
        &self.paths
    }

    /// Joke categories (file stems of `*.json`), sorted alphabetically.
    pub fn list_categories(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.paths.jokes_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("⚠ Cannot list {}: {}", self.paths.jokes_dir.display(), e);
                return Vec::new();
            }
        };

        let mut categories: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        categories.retain(|category| {
            let fits = fits_button(&Action::JokeCategory(category.clone()));
            if !fits {
                warn!("⚠ Skipping joke category '{}': name too long for a button", category);
            }
            fits
        });
        categories.sort();
        categories.dedup();
        categories
    }

    /// Jokes of one category; empty when the source is missing or malformed.
    pub fn load_items(&self, category: &str) -> Vec<String> {
        let path = match self.category_path(category) {
            Ok(path) => path,
            Err(e) => {
                warn!("⚠ {}", e);
                return Vec::new();
            }
        };
        match read_items(&path) {
            Ok(loaded) => {
                if loaded.non_text > 0 {
                    warn!("⚠ {} has {} entries that are not text", path.display(), loaded.non_text);
                }
                debug!("Loaded {} jokes from {}", loaded.items.len(), path.display());
                loaded.items
            }
            Err(e) => {
                warn!("❌ Error loading {}", e);
                Vec::new()
            }
        }
    }

    /// All trivia questions by category. Invalid questions are dropped.
    pub fn load_trivia(&self) -> BTreeMap<String, Vec<TriviaQuestion>> {
        match read_trivia(&self.paths.trivia_file) {
            Ok(load) => {
                for reason in &load.rejected {
                    warn!("⚠ Skipping trivia question: {}", reason);
                }
                load.by_category
            }
            Err(e) => {
                warn!("❌ Error loading trivia: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Trivia category names, sorted, skipping categories without questions.
    pub fn trivia_categories(&self) -> Vec<String> {
        self.load_trivia()
            .into_iter()
            .filter(|(_, questions)| !questions.is_empty())
            .map(|(category, _)| category)
            .collect()
    }

    /// Messages of the day by category.
    pub fn load_daily_messages(&self) -> BTreeMap<String, Vec<String>> {
        match read_daily_messages(&self.paths.daily_messages_file) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("❌ Error loading daily messages: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn category_path(&self, category: &str) -> Result<PathBuf, ContentError> {
        let valid = !category.is_empty()
            && !category.contains(['/', '\\'])
            && category != "."
            && category != "..";
        if !valid {
            return Err(ContentError::InvalidCategory(category.to_string()));
        }
        Ok(self.paths.jokes_dir.join(format!("{category}.json")))
    }
}

/// Whether `action` can travel as callback data.
pub fn fits_button(action: &Action) -> bool {
    action.token().len() <= MAX_TOKEN_BYTES
}

fn read_json(path: &Path) -> Result<Value, ContentError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ContentError::Read { path: path.to_path_buf(), source: e })?;
    serde_json::from_str(&content).map_err(|e| ContentError::Parse { path: path.to_path_buf(), source: e })
}

/// Read a joke file: a bare list, or an object with a `chistes` list.
pub fn read_items(path: &Path) -> Result<Items, ContentError> {
    let value = read_json(path)?;
    let source: JokeSource = serde_json::from_value(value).map_err(|_| ContentError::Shape {
        path: path.to_path_buf(),
        detail: format!("expected a list or an object with \"{JOKES_FIELD}\""),
    })?;
    let entries = match source {
        JokeSource::List(entries) => entries,
        JokeSource::Wrapped { chistes } => chistes,
    };
    Ok(normalize(entries))
}

/// Read the trivia file: `{category: [{pregunta, opciones, respuesta}]}`.
pub fn read_trivia(path: &Path) -> Result<TriviaLoad, ContentError> {
    let value = read_json(path)?;
    let raw: BTreeMap<String, Vec<Value>> = serde_json::from_value(value).map_err(|e| ContentError::Shape {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut load = TriviaLoad::default();
    for (category, entries) in raw {
        if !fits_button(&Action::TriviaCategory(category.clone())) {
            load.rejected
                .push(format!("{category}: category name too long for a button ({} questions skipped)", entries.len()));
            continue;
        }
        let mut questions = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let parsed = serde_json::from_value::<RawQuestion>(entry)
                .map_err(|e| e.to_string())
                .and_then(|q| {
                    let options = q.opciones.iter().map(|o| o.trim().to_string()).collect();
                    TriviaQuestion::new(&category, sanitize(&q.pregunta), options, q.respuesta.trim())
                });
            match parsed {
                Ok(question) => questions.push(question),
                Err(reason) => load.rejected.push(format!("{category}[{index}]: {reason}")),
            }
        }
        load.by_category.insert(category, questions);
    }
    Ok(load)
}

/// Read the daily-message file: `{category: [message, ...]}`.
pub fn read_daily_messages(path: &Path) -> Result<BTreeMap<String, Vec<String>>, ContentError> {
    let value = read_json(path)?;
    let raw: BTreeMap<String, Vec<Value>> = serde_json::from_value(value).map_err(|e| ContentError::Shape {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(raw
        .into_iter()
        .map(|(category, entries)| (category, normalize(entries).items))
        .collect())
}

fn normalize(entries: Vec<Value>) -> Items {
    let mut out = Items::default();
    for entry in entries {
        let text = match entry {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                out.non_text += 1;
                continue;
            }
        };
        let cleaned = sanitize(&text);
        if !cleaned.is_empty() {
            out.items.push(cleaned);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_with(files: &[(&str, &str)]) -> (TempDir, ContentCatalog) {
        let dir = TempDir::new().unwrap();
        let paths = ContentPaths::under(dir.path());
        std::fs::create_dir_all(&paths.jokes_dir).unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        (dir, ContentCatalog::new(paths))
    }

    #[test]
    fn test_categories_sorted_and_json_only() {
        let (_dir, catalog) = catalog_with(&[
            ("chistes/zoo.json", "[]"),
            ("chistes/animales.json", "[]"),
            ("chistes/notas.txt", "x"),
            ("chistes/mama_y_papa.json", "[]"),
        ]);
        assert_eq!(catalog.list_categories(), vec!["animales", "mama_y_papa", "zoo"]);
    }

    #[test]
    fn test_missing_jokes_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = ContentCatalog::new(ContentPaths::under(dir.path()));
        assert!(catalog.list_categories().is_empty());
    }

    #[test]
    fn test_bare_list_order_stable() {
        let (_dir, catalog) = catalog_with(&[("chistes/animales.json", r#"["A", "B"]"#)]);
        assert_eq!(catalog.load_items("animales"), vec!["A", "B"]);
        assert_eq!(catalog.load_items("animales"), vec!["A", "B"]);
    }

    #[test]
    fn test_wrapped_list_same_as_bare() {
        let (_dir, catalog) = catalog_with(&[
            ("chistes/a.json", r#"["uno", "dos"]"#),
            ("chistes/b.json", r#"{"chistes": ["uno", "dos"]}"#),
        ]);
        assert_eq!(catalog.load_items("a"), catalog.load_items("b"));
    }

    #[test]
    fn test_malformed_object_is_empty() {
        let (dir, catalog) = catalog_with(&[("chistes/roto.json", r#"{"otra_cosa": ["x"]}"#)]);
        assert!(catalog.load_items("roto").is_empty());
        let err = read_items(&dir.path().join("chistes/roto.json")).unwrap_err();
        assert!(matches!(err, ContentError::Shape { .. }));
    }

    #[test]
    fn test_invalid_json_is_empty() {
        let (_dir, catalog) = catalog_with(&[("chistes/roto.json", "[\"sin cerrar\"")]);
        assert!(catalog.load_items("roto").is_empty());
    }

    #[test]
    fn test_missing_category_is_empty() {
        let (_dir, catalog) = catalog_with(&[]);
        assert!(catalog.load_items("nada").is_empty());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (_dir, catalog) = catalog_with(&[("trivia.json", "{}")]);
        assert!(catalog.load_items("../trivia").is_empty());
        assert!(catalog.load_items("").is_empty());
    }

    #[test]
    fn test_entries_sanitized_and_scalars_kept() {
        let (dir, catalog) = catalog_with(&[(
            "chistes/mix.json",
            r#"["<p>hola<br>mundo</p>", 42, true, {"x": 1}, null, "<div></div>"]"#,
        )]);
        assert_eq!(catalog.load_items("mix"), vec!["hola\nmundo", "42", "true"]);
        let loaded = read_items(&dir.path().join("chistes/mix.json")).unwrap();
        assert_eq!(loaded.non_text, 2);
    }

    #[test]
    fn test_trivia_loads_and_rejects_bad_questions() {
        let (_dir, catalog) = catalog_with(&[(
            "trivia.json",
            r#"{
                "ciencia": [
                    {"pregunta": "¿Fórmula del agua?", "opciones": ["H2O", "CO2"], "respuesta": "H2O"},
                    {"pregunta": "Mala", "opciones": ["a", "b"], "respuesta": "c"},
                    {"sin": "campos"}
                ],
                "historia": [
                    {"question": "¿Año?", "options": ["1810", "1910"], "answer": "1810"}
                ]
            }"#,
        )]);
        let trivia = catalog.load_trivia();
        assert_eq!(trivia["ciencia"].len(), 1);
        assert_eq!(trivia["ciencia"][0].answer, "H2O");
        assert_eq!(trivia["ciencia"][0].category, "ciencia");
        assert_eq!(trivia["historia"][0].options, vec!["1810", "1910"]);
        assert_eq!(catalog.trivia_categories(), vec!["ciencia", "historia"]);
    }

    #[test]
    fn test_trivia_categories_skip_empty() {
        let (_dir, catalog) = catalog_with(&[("trivia.json", r#"{"vacia": [], "arte": [
            {"pregunta": "¿?", "opciones": ["x", "y"], "respuesta": "y"}
        ]}"#)]);
        assert_eq!(catalog.trivia_categories(), vec!["arte"]);
    }

    #[test]
    fn test_trivia_wrong_shape_is_empty() {
        let (_dir, catalog) = catalog_with(&[("trivia.json", "[1, 2, 3]")]);
        assert!(catalog.load_trivia().is_empty());
    }

    #[test]
    fn test_daily_messages() {
        let (_dir, catalog) = catalog_with(&[(
            "mensajes.json",
            r#"{"motivacion": ["<b>Tú puedes</b>", "Ánimo"], "humor": []}"#,
        )]);
        let messages = catalog.load_daily_messages();
        assert_eq!(messages["motivacion"], vec!["<b>Tú puedes</b>", "Ánimo"]);
        assert!(messages["humor"].is_empty());
    }

    #[test]
    fn test_plain_text_escaped_for_html() {
        let (_dir, catalog) = catalog_with(&[
            ("chistes/signos.json", r#"["Tom & Jerry", "si 2 < 3"]"#),
            (
                "trivia.json",
                r#"{"mate": [{"pregunta": "¿1 < 2 & 3 > 2?", "opciones": ["Sí", "No"], "respuesta": "Sí"}]}"#,
            ),
        ]);
        assert_eq!(catalog.load_items("signos"), vec!["Tom &amp; Jerry", "si 2 &lt; 3"]);
        assert_eq!(catalog.load_trivia()["mate"][0].prompt, "¿1 &lt; 2 &amp; 3 &gt; 2?");
    }

    #[test]
    fn test_question_with_oversized_option_rejected() {
        let long = "x".repeat(60);
        let body = format!(
            r#"{{"historia": [
                {{"pregunta": "¿Larga?", "opciones": ["corta", "{long}"], "respuesta": "{long}"}},
                {{"pregunta": "¿Corta?", "opciones": ["a", "b"], "respuesta": "a"}}
            ]}}"#
        );
        let (dir, catalog) = catalog_with(&[("trivia.json", body.as_str())]);

        let load = read_trivia(&dir.path().join("trivia.json")).unwrap();
        assert_eq!(load.rejected.len(), 1);
        assert!(load.rejected[0].contains("too long"), "{}", load.rejected[0]);
        assert_eq!(catalog.load_trivia()["historia"].len(), 1);
    }

    #[test]
    fn test_option_at_the_limit_accepted() {
        // "trivia_resp_" is 12 bytes; 52 more is exactly 64
        let option = "x".repeat(52);
        assert!(TriviaQuestion::new("c", "p", vec![option.clone(), "y".into()], option.as_str()).is_ok());
        let option = "x".repeat(53);
        assert!(TriviaQuestion::new("c", "p", vec![option.clone(), "y".into()], "y").is_err());
    }

    #[test]
    fn test_oversized_category_names_skipped() {
        let long = "c".repeat(70);
        let jokes = format!("chistes/{long}.json");
        let trivia = format!(r#"{{"{long}": [{{"pregunta": "¿?", "opciones": ["x", "y"], "respuesta": "x"}}]}}"#);
        let (dir, catalog) = catalog_with(&[
            (jokes.as_str(), r#"["A"]"#),
            ("chistes/animales.json", r#"["B"]"#),
            ("trivia.json", trivia.as_str()),
        ]);
        assert_eq!(catalog.list_categories(), vec!["animales"]);
        assert!(catalog.trivia_categories().is_empty());
        let load = read_trivia(&dir.path().join("trivia.json")).unwrap();
        assert_eq!(load.rejected.len(), 1);
    }

    #[test]
    fn test_question_requires_answer_in_options() {
        assert!(TriviaQuestion::new("c", "p", vec!["a".into()], "b").is_err());
        assert!(TriviaQuestion::new("c", " ", vec!["a".into()], "a").is_err());
        let q = TriviaQuestion::new("c", "p", vec!["a".into(), "b".into()], "b").unwrap();
        assert!(q.is_correct("b"));
        assert!(!q.is_correct("a"));
    }
}

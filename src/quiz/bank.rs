use std::path::{Path, PathBuf};

use url::Url;

use crate::quiz::{DataLoadError, LogoRecord};

/// Parses a bank file: a JSON array of `{ "src": ..., "odpowiedz": ... }` objects.
pub fn parse_bank(json: &str) -> Result<Vec<LogoRecord>, DataLoadError> {
    let records: Vec<LogoRecord> = serde_json::from_str(json)?;
    if records.is_empty() {
        return Err(DataLoadError::Empty);
    }
    Ok(records)
}

pub async fn load_bank(path: &Path) -> Result<Vec<LogoRecord>, DataLoadError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_bank(&json)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(Url),
    File(PathBuf),
}

/// Web images are fetched by URL; anything else is relative to the bank file.
pub fn resolve_image(bank_dir: &Path, image_ref: &str) -> ImageSource {
    match Url::parse(image_ref) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => ImageSource::Url(url),
        _ => ImageSource::File(bank_dir.join(image_ref)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bank_file_fields() {
        let bank = parse_bank(r#"[{"src": "img/audi.png", "odpowiedz": "Audi"}]"#).unwrap();
        assert_eq!(
            bank,
            vec![LogoRecord {
                image_ref: "img/audi.png".to_string(),
                answer: "Audi".to_string(),
            }]
        );
    }

    #[test]
    fn accepts_answer_alias() {
        let bank = parse_bank(r#"[{"src": "img/bmw.png", "answer": "BMW"}]"#).unwrap();
        assert_eq!(bank[0].answer, "BMW");
    }

    #[test]
    fn rejects_empty_and_malformed_banks() {
        assert!(matches!(parse_bank("[]"), Err(DataLoadError::Empty)));
        assert!(matches!(parse_bank(r#"[{"src": "a.png"}]"#), Err(DataLoadError::Parse(_))));
        assert!(matches!(parse_bank("not json"), Err(DataLoadError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("logo-quiz-bot-missing-bank.json");
        match load_bank(&path).await {
            Err(DataLoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn loads_bank_from_disk() {
        let path = std::env::temp_dir().join(format!("logo-quiz-bot-bank-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"[{"src": "a.png", "odpowiedz": "Audi"}, {"src": "b.png", "odpowiedz": "BMW"}]"#)
            .await
            .unwrap();

        let bank = load_bank(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank[1].image_ref, "b.png");
        assert_eq!(bank[1].answer, "BMW");
    }

    #[test]
    fn resolves_urls_and_relative_paths() {
        let dir = Path::new("data");
        assert_eq!(
            resolve_image(dir, "https://example.com/audi.png"),
            ImageSource::Url(Url::parse("https://example.com/audi.png").unwrap())
        );
        assert_eq!(
            resolve_image(dir, "img/audi.png"),
            ImageSource::File(PathBuf::from("data/img/audi.png"))
        );
    }
}

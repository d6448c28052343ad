//! Ground-truth annotations and dataset hygiene checks.
//!
//! Annotations live in a CSV with `filename` and `solution` columns; keys
//! are matched to images by file stem, so `rebus_001.png` and a row for
//! `rebus_001.jpg` refer to the same puzzle.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use super::loader::LoadError;

/// Image extensions considered part of the dataset.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Load the `filename -> solution` annotation table from a CSV file.
///
/// Header lookup is case-insensitive. Rows with a blank filename or
/// solution are skipped, and a duplicate filename keeps the last row.
pub fn load_annotations(path: &Path) -> Result<IndexMap<String, String>, LoadError> {
    let file = fs::File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Parse(format!("{}: {}", path.display(), e)))?
        .clone();
    let filename_col = find_column(&headers, "filename")
        .ok_or_else(|| LoadError::MissingField("filename".into()))?;
    let solution_col = find_column(&headers, "solution")
        .ok_or_else(|| LoadError::MissingField("solution".into()))?;

    let mut table = IndexMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| LoadError::Parse(format!("{} row {}: {}", path.display(), row + 2, e)))?;
        let filename = record.get(filename_col).unwrap_or("").trim();
        let solution = record.get(solution_col).unwrap_or("").trim();
        if filename.is_empty() || solution.is_empty() {
            tracing::debug!("skipping blank annotation row {}", row + 2);
            continue;
        }

        let key = stem_of(filename);
        if table.insert(key.clone(), solution.to_string()).is_some() {
            tracing::warn!("duplicate annotation for {}; keeping the last row", key);
        }
    }

    tracing::info!("loaded {} annotations from {}", table.len(), path.display());
    Ok(table)
}

/// Dataset hygiene summary: images on disk versus annotation rows.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    /// Image stems found on disk, sorted.
    pub images: Vec<String>,
    /// How many of those images have an annotation.
    pub annotated: usize,
    /// Image stems with no annotation row.
    pub missing_annotation: Vec<String>,
    /// Annotation keys with no image on disk.
    pub orphan_annotations: Vec<String>,
}

/// Cross-check the image directory against the annotation table.
pub fn check_dataset(
    images_dir: &Path,
    annotations_path: &Path,
) -> Result<DatasetReport, LoadError> {
    let annotations = load_annotations(annotations_path)?;

    let mut images = Vec::new();
    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            images.push(stem.to_string_lossy().into_owned());
        }
    }
    images.sort();

    let missing_annotation: Vec<String> = images
        .iter()
        .filter(|stem| !annotations.contains_key(*stem))
        .cloned()
        .collect();
    let orphan_annotations: Vec<String> = annotations
        .keys()
        .filter(|key| images.binary_search(key).is_err())
        .cloned()
        .collect();

    for stem in &missing_annotation {
        tracing::warn!("image {} has no annotation", stem);
    }

    let annotated = images.len() - missing_annotation.len();
    Ok(DatasetReport {
        images,
        annotated,
        missing_annotation,
        orphan_annotations,
    })
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn stem_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_annotations() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("annotations.csv");
        fs::write(
            &path,
            "Filename,Solution\nrebus_001.png,break the ice\nrebus_002.jpg,spill the beans\n,\n",
        )
        .unwrap();

        let table = load_annotations(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("rebus_001").map(String::as_str),
            Some("break the ice")
        );
        assert_eq!(
            table.get("rebus_002").map(String::as_str),
            Some("spill the beans")
        );
    }

    #[test]
    fn test_load_annotations_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_annotations(&tmp.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_annotations_missing_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("annotations.csv");
        fs::write(&path, "image,answer\nrebus_001.png,break the ice\n").unwrap();

        let err = load_annotations(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingField(f) if f == "filename"));
    }

    #[test]
    fn test_load_annotations_duplicate_keeps_last() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("annotations.csv");
        fs::write(
            &path,
            "filename,solution\nrebus_001.png,first answer\nrebus_001.png,second answer\n",
        )
        .unwrap();

        let table = load_annotations(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("rebus_001").map(String::as_str),
            Some("second answer")
        );
    }

    #[test]
    fn test_check_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        let img_dir = tmp.path().join("img");
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("rebus_001.png"), b"").unwrap();
        fs::write(img_dir.join("rebus_002.JPG"), b"").unwrap();
        fs::write(img_dir.join("notes.txt"), b"").unwrap();

        let csv_path = tmp.path().join("annotations.csv");
        fs::write(
            &csv_path,
            "filename,solution\nrebus_001.png,break the ice\nrebus_999.png,orphan row\n",
        )
        .unwrap();

        let report = check_dataset(&img_dir, &csv_path).unwrap();
        assert_eq!(report.images, vec!["rebus_001", "rebus_002"]);
        assert_eq!(report.annotated, 1);
        assert_eq!(report.missing_annotation, vec!["rebus_002"]);
        assert_eq!(report.orphan_annotations, vec!["rebus_999"]);
    }
}

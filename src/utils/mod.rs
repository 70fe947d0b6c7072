use std::ffi::OsString;
use std::path::{Path, PathBuf};

use url::Url;

/// Last non-empty path segment of `url`, kept exactly as it appears in the URL.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// File name with `suffix` and the separating dot removed:
/// `g_patent.tsv.zip` with suffix `tsv.zip` becomes `g_patent`.
pub fn strip_suffix_stem<'a>(file_name: &'a str, suffix: &str) -> &'a str {
    file_name
        .strip_suffix(suffix)
        .map(|stem| stem.trim_end_matches('.'))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
}

/// Sibling path the fetcher streams into before renaming into place.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// Percentage of `total` that `done` represents; zero when `total` is unknown.
pub fn percent_of(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        let url = Url::parse("https://x.org/files/g_patent.tsv.zip").unwrap();
        assert_eq!(file_name_from_url(&url).as_deref(), Some("g_patent.tsv.zip"));

        let url = Url::parse("https://x.org/files/a%20b.tsv.zip?x=1").unwrap();
        assert_eq!(file_name_from_url(&url).as_deref(), Some("a%20b.tsv.zip"));

        let url = Url::parse("https://x.org/").unwrap();
        assert_eq!(file_name_from_url(&url), None);
    }

    #[test]
    fn test_strip_suffix_stem() {
        assert_eq!(strip_suffix_stem("g_patent.tsv.zip", "tsv.zip"), "g_patent");
        assert_eq!(strip_suffix_stem("g_patent.tsv.zip", ".tsv.zip"), "g_patent");
        assert_eq!(strip_suffix_stem("readme.txt", "tsv.zip"), "readme.txt");
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("out/a.tsv.zip")),
            PathBuf::from("out/a.tsv.zip.part")
        );
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(5, 0), 0.0);
    }
}
